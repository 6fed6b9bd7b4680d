//! The Earley state record and the chart collection.
//!
//! Positions are 0-based and count consumed tokens: a state spans
//! `[start_index, end_index)`, and column `k` of the charts holds every state
//! whose `end_index` is `k`. The dot is the number of right-hand symbols
//! already recognized, so a state is complete when the dot reaches the length
//! of its right-hand side.

use crate::append_vec::{append_only_vec_id, AppendOnlyVec};
use crate::earley::GAMMA;
use crate::error::Error;
use std::collections::BTreeSet;
use std::fmt;

append_only_vec_id!(
    /// A state number: the dense arena id a state receives on insertion,
    /// monotone across the whole parse run.
    pub StateNum
);

/// One Earley item: a production with a dot, a span, and the set of state
/// numbers whose completions advanced the dot (the backpointers the tree
/// reconstructor walks).
///
/// States are created by the predictor, scanner and completer and never
/// mutated after insertion, except that inserting a duplicate unions the
/// origin sets on the state already in the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    num: StateNum,
    left_hand: String,
    right_hand: Vec<String>,
    dot_index: usize,
    start_index: usize,
    end_index: usize,
    originating_states: BTreeSet<StateNum>,
}

/// The fields that make a state *the same state* within one column. `end` is
/// the column itself, so it is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct StateKey {
    left_hand: String,
    right_hand: Vec<String>,
    dot_index: usize,
    start_index: usize,
}

impl State {
    /// Construct a state with no origins. The number is assigned when the
    /// state is inserted into a chart.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDotIndex`] when `dot_index` lies past the end of
    /// `right_hand`.
    pub fn new(
        left_hand: impl Into<String>,
        right_hand: Vec<String>,
        dot_index: usize,
        start_index: usize,
        end_index: usize,
    ) -> Result<Self, Error> {
        if dot_index > right_hand.len() {
            return Err(Error::InvalidDotIndex {
                dot: dot_index,
                len: right_hand.len(),
            });
        }
        debug_assert!(start_index <= end_index);
        Ok(Self {
            num: StateNum::default(),
            left_hand: left_hand.into(),
            right_hand,
            dot_index,
            start_index,
            end_index,
            originating_states: BTreeSet::new(),
        })
    }

    /// The state number: dense, monotone in insertion order across the whole
    /// parse.
    #[must_use]
    pub fn num(&self) -> StateNum {
        self.num
    }

    /// The category this state is recognizing.
    #[must_use]
    pub fn left_hand(&self) -> &str {
        &self.left_hand
    }

    /// The right-hand side this state is matching against.
    #[must_use]
    pub fn right_hand(&self) -> &[String] {
        &self.right_hand
    }

    /// How many right-hand symbols have been recognized.
    #[must_use]
    pub fn dot_index(&self) -> usize {
        self.dot_index
    }

    /// First token position covered by this state.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// One past the last token position covered by this state.
    #[must_use]
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// Numbers of the completed states that advanced this state's dot.
    pub fn originating_states(&self) -> impl Iterator<Item = StateNum> + '_ {
        self.originating_states.iter().copied()
    }

    /// True while right-hand symbols remain unrecognized.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.dot_index < self.right_hand.len()
    }

    /// True when every right-hand symbol has been recognized.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.is_incomplete()
    }

    /// The category after the dot, or `None` when the state is complete.
    #[must_use]
    pub fn next_category(&self) -> Option<&str> {
        self.right_hand.get(self.dot_index).map(String::as_str)
    }

    /// True for the completed γ pseudo-state covering the whole sentence:
    /// the mark of a successful parse.
    #[must_use]
    pub fn is_spanning(&self, sentence_len: usize) -> bool {
        self.is_complete()
            && self.start_index == 0
            && self.end_index == sentence_len
            && self.left_hand == GAMMA
    }

    /// The completer's step: this state with the dot moved over one symbol,
    /// ending at `end_index`, recording `origin` as the completion that moved
    /// it.
    pub(crate) fn advanced(&self, end_index: usize, origin: StateNum) -> Self {
        debug_assert!(self.is_incomplete());
        let mut advanced = self.clone();
        advanced.num = StateNum::default();
        advanced.dot_index += 1;
        advanced.end_index = end_index;
        advanced.originating_states.insert(origin);
        advanced
    }

    pub(crate) fn identity(&self) -> StateKey {
        StateKey {
            left_hand: self.left_hand.clone(),
            right_hand: self.right_hand.clone(),
            dot_index: self.dot_index,
            start_index: self.start_index,
        }
    }
}

/// Renders like `NP -> D • N [0, 1)`.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.left_hand)?;
        for (index, symbol) in self.right_hand.iter().enumerate() {
            if index == self.dot_index {
                write!(f, " •")?;
            }
            write!(f, " {symbol}")?;
        }
        if self.is_complete() {
            write!(f, " •")?;
        }
        write!(f, " [{}, {})", self.start_index, self.end_index)
    }
}

/// Every state of one parse run: an arena in insertion order, plus one column
/// per input position holding the states that end there.
///
/// Insertion de-duplicates on the identity tuple within a column; a duplicate
/// merges by unioning origin sets instead of appending, which is what keeps
/// highly ambiguous grammars from blowing the chart up.
#[derive(Debug, Clone, Default)]
pub struct Charts {
    states: AppendOnlyVec<State, StateNum>,
    columns: Vec<Vec<StateNum>>,
    seen: Vec<crate::HashMap<StateKey, StateNum>>,
}

impl Charts {
    pub(crate) fn with_sentence_len(sentence_len: usize) -> Self {
        Self {
            states: AppendOnlyVec::new(),
            columns: vec![Vec::new(); sentence_len + 1],
            seen: vec![crate::HashMap::new(); sentence_len + 1],
        }
    }

    /// The sentence length this chart set was built for.
    #[must_use]
    pub fn sentence_len(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// Total number of states across all columns.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Look a state up by number.
    #[must_use]
    pub fn state(&self, num: StateNum) -> Option<&State> {
        self.states.get(num)
    }

    /// All states, in insertion order across columns.
    pub fn states_iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    /// The states ending at position `index`, in insertion order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &State> {
        self.columns
            .get(index)
            .into_iter()
            .flatten()
            .map(|num| self.states.get(*num).expect("column ids must resolve"))
    }

    pub(crate) fn column_len(&self, index: usize) -> usize {
        self.columns[index].len()
    }

    pub(crate) fn column_state(&self, index: usize, position: usize) -> &State {
        let num = self.columns[index][position];
        self.states.get(num).expect("column ids must resolve")
    }

    /// Insert into the column named by the state's `end_index`. A state with
    /// the same identity tuple already in that column absorbs the new origin
    /// set instead; either way the number of the surviving state is returned.
    pub(crate) fn insert(&mut self, state: State) -> StateNum {
        let column = state.end_index;
        let key = state.identity();

        if let Some(&existing) = self.seen[column].get(&key) {
            let origins: Vec<StateNum> = state.originating_states().collect();
            let merged = self
                .states
                .get_mut(existing)
                .expect("deduplicated ids must resolve");
            merged.originating_states.extend(origins);
            return existing;
        }

        let num = self.states.push_with_id(|num| State { num, ..state }).num;
        self.columns[column].push(num);
        self.seen[column].insert(key, num);
        num
    }
}
