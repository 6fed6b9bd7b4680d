use crate::earley::{parse_earley, tokenize, DEFAULT_START};
use crate::error::Error;
use crate::parsers;
use crate::tracing;
use crate::tree::{chart_to_tree, ParseTree};
use std::str::FromStr;

/// Upper bound on `X+` expansion: `X+` becomes the alternatives with
/// 1..=`MAX_REPEAT` copies of `X` in place.
pub const MAX_REPEAT: usize = 6;

/// A right-hand-side symbol as written, before sugar expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Symbol {
    /// `X` — always present.
    Required(String),
    /// `(X)` — present or absent.
    Optional(String),
    /// `X+` — 1..=[`MAX_REPEAT`] copies.
    Repeated(String),
}

/// The two grammar tables read from rule text: `productions` maps each
/// category to its ordered right-hand-side alternatives, `lexicon` maps each
/// word to the pre-terminal categories that may tag it.
///
/// Alternatives keep their insertion order and are not de-duplicated;
/// categories per word are a set.
///
/// # Example
///
/// ```rust
/// use psg::RuleSet;
///
/// let rules: RuleSet = "
/// NP -> (D) N
/// D  : the
/// N  : {dog, cat}
/// "
/// .parse()
/// .unwrap();
///
/// assert_eq!(rules.alternatives("NP").count(), 2);
/// assert_eq!(rules.categories_of("dog").collect::<Vec<_>>(), vec!["N"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    productions: crate::HashMap<String, Vec<Vec<String>>>,
    lexicon: crate::HashMap<String, Vec<String>>,
}

impl RuleSet {
    /// Construct an empty `RuleSet`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when neither table has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.productions.is_empty() && self.lexicon.is_empty()
    }

    /// Append one (already expanded) alternative to `lhs`'s productions.
    pub fn add_production(&mut self, lhs: &str, alternative: Vec<String>) {
        self.productions
            .entry(lhs.to_string())
            .or_default()
            .push(alternative);
    }

    /// Tag `token` with `category` in the lexicon. Repeated tags are kept
    /// once.
    pub fn add_lexical(&mut self, token: &str, category: &str) {
        let categories = self.lexicon.entry(token.to_string()).or_default();
        if !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }

    /// The right-hand-side alternatives of `category`, in insertion order.
    pub fn alternatives(&self, category: &str) -> impl Iterator<Item = &[String]> {
        self.productions
            .get(category)
            .into_iter()
            .flatten()
            .map(Vec::as_slice)
    }

    /// True when `category` rewrites via at least one production.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.productions.contains_key(category)
    }

    /// The pre-terminal categories that may tag `token`.
    pub fn categories_of(&self, token: &str) -> impl Iterator<Item = &str> {
        self.lexicon
            .get(token)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// The union of all lexicon categories: the symbols the scanner owns.
    #[must_use]
    pub fn parts_of_speech(&self) -> crate::HashSet<&str> {
        self.lexicon
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Iterate the production table: `(category, alternatives)`.
    pub fn productions_iter(&self) -> impl Iterator<Item = (&str, &[Vec<String>])> {
        self.productions
            .iter()
            .map(|(lhs, alternatives)| (lhs.as_str(), alternatives.as_slice()))
    }

    /// Iterate the lexicon: `(token, categories)`.
    pub fn lexicon_iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.lexicon
            .iter()
            .map(|(token, categories)| (token.as_str(), categories.as_slice()))
    }

    /// Tokenize `input` on whitespace and parse it from the default start
    /// symbol, returning every parse tree the grammar admits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use psg::RuleSet;
    ///
    /// let rules: RuleSet = "
    /// S  -> NP VP
    /// NP -> D N
    /// VP -> V
    /// D  : the
    /// N  : dog
    /// V  : runs
    /// "
    /// .parse()
    /// .unwrap();
    ///
    /// let trees = rules.parse_input("the dog runs");
    /// assert_eq!(trees.len(), 1);
    /// ```
    #[must_use]
    pub fn parse_input(&self, input: &str) -> Vec<ParseTree> {
        self.parse_input_starting_with(input, DEFAULT_START)
    }

    /// Like [`RuleSet::parse_input`], but from the given start symbol.
    #[must_use]
    pub fn parse_input_starting_with(&self, input: &str, start_symbol: &str) -> Vec<ParseTree> {
        let tokens = tokenize(input);
        let charts = parse_earley(self, &tokens, start_symbol);
        chart_to_tree(&charts, &tokens)
    }

    fn read_line(&mut self, line: &str) -> Result<(), Error> {
        let arrows = line.matches("->").count();
        let colons = line.matches(':').count();

        if arrows > 1 {
            return Err(Error::MalformedRule(format!(
                "more than one \"->\" in: {line}"
            )));
        }
        if arrows == 1 {
            let (_, (lhs, alternatives)) = parsers::syntactic_complete(line)
                .map_err(|_| Error::MalformedRule(format!("unreadable syntactic rule: {line}")))?;
            for symbols in &alternatives {
                for alternative in expand_alternative(symbols) {
                    self.add_production(&lhs, alternative);
                }
            }
            return Ok(());
        }
        if colons > 1 {
            return Err(Error::MalformedRule(format!(
                "more than one \":\" in: {line}"
            )));
        }
        if colons == 1 {
            let (_, (category, tokens)) = parsers::lexical_complete(line)
                .map_err(|_| Error::MalformedRule(format!("unreadable lexical rule: {line}")))?;
            for token in &tokens {
                self.add_lexical(token, &category);
            }
            return Ok(());
        }

        Err(Error::MalformedRule(format!(
            "neither \"->\" nor \":\" in: {line}"
        )))
    }
}

impl FromStr for RuleSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        read_rules(s)
    }
}

/// Read a grammar text, one rule per non-empty line, into a [`RuleSet`].
///
/// Lines are trimmed; blank lines are skipped. The first malformed line
/// aborts the read.
///
/// # Errors
///
/// [`Error::MalformedRule`] when a line has neither `->` nor `:`, more than
/// one of the relevant separator, or an unparsable rule body.
pub fn read_rules(text: &str) -> Result<RuleSet, Error> {
    let _span = tracing::span!(tracing::Level::TRACE, "read_rules").entered();
    let mut rules = RuleSet::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rules.read_line(line)?;
    }
    Ok(rules)
}

/// Expand one surface alternative: repetition first, then the optionality
/// cartesian product.
fn expand_alternative(symbols: &[Symbol]) -> Vec<Vec<String>> {
    expand_repeats(symbols)
        .iter()
        .flat_map(|repeat_free| expand_optionals(repeat_free))
        .collect()
}

/// Replace every `X+` with 1..=[`MAX_REPEAT`] copies of `X` in place,
/// fanning out over all counts.
fn expand_repeats(symbols: &[Symbol]) -> Vec<Vec<Symbol>> {
    let mut sequences: Vec<Vec<Symbol>> = vec![vec![]];
    for symbol in symbols {
        match symbol {
            Symbol::Repeated(name) => {
                let mut grown = Vec::with_capacity(sequences.len() * MAX_REPEAT);
                for sequence in &sequences {
                    for copies in 1..=MAX_REPEAT {
                        let mut with_copies = sequence.clone();
                        with_copies.extend(
                            std::iter::repeat_with(|| Symbol::Required(name.clone())).take(copies),
                        );
                        grown.push(with_copies);
                    }
                }
                sequences = grown;
            }
            other => {
                for sequence in &mut sequences {
                    sequence.push(other.clone());
                }
            }
        }
    }
    sequences
}

/// The cartesian product over `(X)` inclusion choices. Dropping every
/// optional at once may leave an empty sequence; that is a legal
/// ε-alternative.
fn expand_optionals(symbols: &[Symbol]) -> Vec<Vec<String>> {
    let mut sequences: Vec<Vec<String>> = vec![vec![]];
    for symbol in symbols {
        match symbol {
            Symbol::Required(name) => {
                for sequence in &mut sequences {
                    sequence.push(name.clone());
                }
            }
            Symbol::Optional(name) => {
                let mut grown = Vec::with_capacity(sequences.len() * 2);
                for sequence in &sequences {
                    grown.push(sequence.clone());
                    let mut with = sequence.clone();
                    with.push(name.clone());
                    grown.push(with);
                }
                sequences = grown;
            }
            Symbol::Repeated(_) => unreachable!("repeats are expanded before optionals"),
        }
    }
    sequences
}

/// Expand a sequence whose parenthesised members are optional, e.g.
/// `["(D)", "Adj", "(PP)"]`, into every inclusion variant.
///
/// This is the optionality expander the Rule Reader uses, exposed directly so
/// its cover set can be checked in isolation.
#[must_use]
pub fn gen_opt_poss(symbols: &[&str]) -> Vec<Vec<String>> {
    let parsed: Vec<Symbol> = symbols
        .iter()
        .map(|surface| {
            match surface
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
            {
                Some(name) => Symbol::Optional(name.to_string()),
                None => Symbol::Required(surface.to_string()),
            }
        })
        .collect();
    expand_optionals(&parsed)
}
