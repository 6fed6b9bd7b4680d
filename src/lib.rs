//! psg, a library for parsing natural-language sentences against
//! phrase-structure grammars with an Earley chart parser.
//!
//! A grammar is written one rule per line. Syntactic rules rewrite a category
//! into a sequence of categories, with optionality `(X)`, repetition `X+` and
//! alternation `|` sugar; lexical rules tag words with pre-terminal
//! categories, either one at a time or as a braced set:
//!
//! ```text
//! S  -> NP VP
//! NP -> (D) N
//! VP -> V | V NP
//! D  : the
//! N  : {dog, cat}
//! V  : chased
//! ```
//!
//! Reading that text yields a [`RuleSet`]; parsing a sentence against it
//! yields every parse tree the grammar admits:
//!
//! ```rust
//! use psg::RuleSet;
//!
//! let rules: RuleSet = "
//! S  -> NP VP
//! NP -> (D) N
//! VP -> V | V NP
//! D  : the
//! N  : {dog, cat}
//! V  : chased
//! "
//! .parse()
//! .unwrap();
//!
//! let trees = rules.parse_input("the dog chased the cat");
//! assert_eq!(trees.len(), 1);
//! assert_eq!(
//!     trees[0].bracketed(),
//!     "(S (NP (D the) (N dog)) (VP (V chased) (NP (D the) (N cat))))"
//! );
//! ```
//!
//! The lower-level surface mirrors the pipeline: [`read_rules`] →
//! [`verify_productions`] / [`verify_lexicon`] → [`parse_earley`] →
//! [`chart_recognize`] / [`chart_to_tree`]. The returned [`Charts`] expose
//! every Earley state, so callers can inspect a failed parse as well as a
//! successful one.

#![warn(missing_docs)]

mod append_vec;
mod earley;
mod error;
mod parsers;
mod rules;
mod state;
pub(crate) mod tracing;
mod tree;
mod validation;

pub(crate) use hashbrown::{HashMap, HashSet};

pub use crate::earley::{chart_recognize, parse_earley, tokenize, DEFAULT_START, GAMMA};
pub use crate::error::Error;
pub use crate::rules::{gen_opt_poss, read_rules, RuleSet, MAX_REPEAT};
pub use crate::state::{Charts, State, StateNum};
pub use crate::tree::{chart_to_tree, ParseTree, ParseTreeNode};
pub use crate::validation::{verify_lexicon, verify_productions};
