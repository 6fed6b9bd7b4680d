//! Advisory grammar consistency checks: collecting defined and referenced
//! symbols and reporting gaps as booleans, never as errors.

use crate::rules::RuleSet;
use crate::tracing;

/// Records symbols that are defined (a production left-hand side or a lexicon
/// category) or referenced (used on a right-hand side); supports iterating
/// over the undefined remainder (referenced − defined).
#[derive(Debug, Default)]
pub(crate) struct SymbolSets<'a> {
    defined: crate::HashSet<&'a str>,
    referenced: crate::HashSet<&'a str>,
}

impl<'a> SymbolSets<'a> {
    pub(crate) fn new() -> Self {
        Self {
            defined: crate::HashSet::new(),
            referenced: crate::HashSet::new(),
        }
    }

    pub(crate) fn record_defined(&mut self, symbol: &'a str) {
        self.defined.insert(symbol);
    }

    pub(crate) fn record_referenced(&mut self, symbol: &'a str) {
        self.referenced.insert(symbol);
    }

    /// Iterator over symbols that are referenced but never defined.
    pub(crate) fn undefined(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.referenced.difference(&self.defined).copied()
    }
}

/// True iff every category on a right-hand side is itself a production
/// left-hand side or appears somewhere as a lexicon category.
///
/// A `false` result is advisory: the caller may still attempt a parse, which
/// will simply fail to recognize anything needing the missing symbol.
#[must_use]
pub fn verify_productions(rules: &RuleSet) -> bool {
    let mut sets = SymbolSets::new();

    for (left_hand, alternatives) in rules.productions_iter() {
        sets.record_defined(left_hand);
        for alternative in alternatives {
            for symbol in alternative {
                sets.record_referenced(symbol);
            }
        }
    }
    for (_, categories) in rules.lexicon_iter() {
        for category in categories {
            sets.record_defined(category);
        }
    }

    let undefined: Vec<&str> = sets.undefined().collect();
    if !undefined.is_empty() {
        tracing::event!(
            tracing::Level::DEBUG,
            "right-hand symbols without a definition: {:?}",
            undefined
        );
    }
    undefined.is_empty()
}

/// True iff every token of `sentence` has at least one lexicon entry.
#[must_use]
pub fn verify_lexicon(rules: &RuleSet, sentence: &[String]) -> bool {
    sentence
        .iter()
        .all(|token| rules.categories_of(token).next().is_some())
}
