//! The chart construction engine: predictor, scanner and completer driven to
//! a fixed point, one column per input position.

use crate::rules::RuleSet;
use crate::state::{Charts, State};
use crate::tracing;

/// The synthetic outermost category. Every parse recognizes the pseudo-rule
/// `γ → start_symbol`; a completed γ state covering the whole sentence is
/// what makes the parse a success.
pub const GAMMA: &str = "γ";

/// The start symbol assumed when the caller does not name one.
pub const DEFAULT_START: &str = "S";

/// Split a sentence into its whitespace-separated tokens.
#[must_use]
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Build the full chart array for `sentence` against `rules`, starting from
/// `start_symbol`.
///
/// The parse never fails: a sentence the grammar does not accept simply
/// yields charts without a spanning γ completion, which [`chart_recognize`]
/// reports as `false`. Enable the `tracing` feature for a step-by-step
/// account of predictions, scans and completions.
///
/// # Example
///
/// ```rust
/// use psg::{chart_recognize, parse_earley, read_rules, tokenize};
///
/// let rules = read_rules(
///     "S  -> NP VP
///      NP -> D N
///      VP -> V
///      D  : the
///      N  : dog
///      V  : runs",
/// )
/// .unwrap();
///
/// let sentence = tokenize("the dog runs");
/// let charts = parse_earley(&rules, &sentence, "S");
/// assert!(chart_recognize(&charts));
/// ```
#[must_use]
pub fn parse_earley(rules: &RuleSet, sentence: &[String], start_symbol: &str) -> Charts {
    let _span = tracing::span!(tracing::Level::TRACE, "parse_earley").entered();

    let sentence_len = sentence.len();
    let mut charts = Charts::with_sentence_len(sentence_len);
    let parts_of_speech = rules.parts_of_speech();

    let seed = State::new(GAMMA, vec![start_symbol.to_string()], 0, 0, 0)
        .expect("seed dot 0 fits any right-hand side");
    charts.insert(seed);

    for column in 0..=sentence_len {
        // Index loop: states appended to this column during the pass are
        // themselves processed before the column is left behind.
        let mut position = 0;
        while position < charts.column_len(column) {
            let state = charts.column_state(column, position).clone();
            position += 1;

            if state.is_complete() {
                complete(&mut charts, column, &state);
                continue;
            }

            let next = state
                .next_category()
                .expect("incomplete state has a next category")
                .to_string();

            if !parts_of_speech.contains(next.as_str()) {
                predict(rules, &mut charts, column, &next);
            } else if column < sentence_len {
                scan(rules, &mut charts, column, &sentence[column], &next);
            }
        }
    }

    charts
}

/// Hypothesise every alternative of `category` starting at `column`.
fn predict(rules: &RuleSet, charts: &mut Charts, column: usize, category: &str) {
    let _span = tracing::span!(tracing::Level::TRACE, "predict").entered();
    for alternative in rules.alternatives(category) {
        let state = State::new(category, alternative.to_vec(), 0, column, column)
            .expect("predicted dot 0 fits any right-hand side");
        tracing::event!(tracing::Level::TRACE, "predicted {state}");
        charts.insert(state);
    }
}

/// Consume the token at `column` if the lexicon tags it with `category`,
/// writing the recognized pre-terminal into the next column.
fn scan(rules: &RuleSet, charts: &mut Charts, column: usize, word: &str, category: &str) {
    let _span = tracing::span!(tracing::Level::TRACE, "scan").entered();
    if rules.categories_of(word).any(|tag| tag == category) {
        let state = State::new(category, vec![word.to_string()], 1, column, column + 1)
            .expect("scanned dot 1 fits a one-symbol right-hand side");
        tracing::event!(tracing::Level::TRACE, "scanned {state}");
        charts.insert(state);
    }
}

/// Advance every state waiting for `state`'s category at its start position.
fn complete(charts: &mut Charts, column: usize, state: &State) {
    let _span = tracing::span!(tracing::Level::TRACE, "complete").entered();
    let advanced: Vec<State> = charts
        .column(state.start_index())
        .filter(|waiting| {
            waiting.is_incomplete() && waiting.next_category() == Some(state.left_hand())
        })
        .map(|waiting| waiting.advanced(column, state.num()))
        .collect();

    for state in advanced {
        tracing::event!(tracing::Level::TRACE, "completed into {state}");
        charts.insert(state);
    }
}

/// True when the charts contain a completed γ state covering the whole
/// sentence.
#[must_use]
pub fn chart_recognize(charts: &Charts) -> bool {
    let sentence_len = charts.sentence_len();
    charts
        .column(sentence_len)
        .any(|state| state.is_spanning(sentence_len))
}
