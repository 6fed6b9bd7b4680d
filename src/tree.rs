//! Recovering explicit derivations from a finished chart.

use crate::state::{Charts, State, StateNum};
use crate::tracing;
use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A parse tree: a category together with the matched right-hand side, each
/// member either a surface token or a subtree. A pre-terminal subtree has
/// exactly one child, the token it tagged.
///
/// This nested shape is the contract consumed by renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ParseTree {
    /// The category this tree derives.
    pub lhs: String,
    rhs: Vec<ParseTreeNode>,
}

/// One matched member of a [`ParseTree`] right-hand side.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ParseTreeNode {
    /// A surface token.
    Terminal(String),
    /// A derived constituent.
    Nonterminal(ParseTree),
}

impl ParseTree {
    /// Construct a `ParseTree` from its parts.
    #[must_use]
    pub fn from_parts(lhs: impl Into<String>, rhs: Vec<ParseTreeNode>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs,
        }
    }

    /// Iterate the matched right-hand-side members.
    pub fn rhs_iter(&self) -> impl Iterator<Item = &ParseTreeNode> {
        self.rhs.iter()
    }

    /// The surface tokens at the leaves, left to right.
    #[must_use]
    pub fn tokens(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        self.collect_tokens(&mut leaves);
        leaves
    }

    fn collect_tokens<'tree>(&'tree self, leaves: &mut Vec<&'tree str>) {
        for node in &self.rhs {
            match node {
                ParseTreeNode::Terminal(token) => leaves.push(token),
                ParseTreeNode::Nonterminal(subtree) => subtree.collect_tokens(leaves),
            }
        }
    }

    /// The compact labelled-bracketing form, e.g.
    /// `(S (NP (D the) (N dog)) (VP (V runs)))`.
    #[must_use]
    pub fn bracketed(&self) -> String {
        let mut out = String::new();
        self.write_bracketed(&mut out);
        out
    }

    fn write_bracketed(&self, out: &mut String) {
        out.push('(');
        out.push_str(&self.lhs);
        for node in &self.rhs {
            out.push(' ');
            match node {
                ParseTreeNode::Terminal(token) => out.push_str(token),
                ParseTreeNode::Nonterminal(subtree) => subtree.write_bracketed(out),
            }
        }
        out.push(')');
    }

    fn header(&self) -> String {
        let mut header = self.lhs.clone();
        header.push_str(" ->");
        for node in &self.rhs {
            header.push(' ');
            match node {
                ParseTreeNode::Terminal(token) => header.push_str(token),
                ParseTreeNode::Nonterminal(subtree) => header.push_str(&subtree.lhs),
            }
        }
        header
    }

    fn fmt_children(&self, f: &mut fmt::Formatter, prefix: &str) -> fmt::Result {
        let count = self.rhs.len();
        for (index, node) in self.rhs.iter().enumerate() {
            let last = index + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            match node {
                ParseTreeNode::Terminal(token) => writeln!(f, "{prefix}{connector}{token}")?,
                ParseTreeNode::Nonterminal(subtree) => {
                    writeln!(f, "{prefix}{connector}{}", subtree.header())?;
                    let child_prefix = if last {
                        format!("{prefix}    ")
                    } else {
                        format!("{prefix}│   ")
                    };
                    subtree.fmt_children(f, &child_prefix)?;
                }
            }
        }
        Ok(())
    }
}

/// Renders with box-drawing branches:
///
/// ```text
/// NP -> D N
/// ├── D -> the
/// │   └── the
/// └── N -> dog
///     └── dog
/// ```
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        self.fmt_children(f, "")
    }
}

/// Walk the backpointers of the finished `charts` and return every successful
/// derivation of the top symbol, in insertion order of the top-level
/// completions. A sentence the grammar does not accept yields an empty
/// forest, as does an empty sentence.
#[must_use]
pub fn chart_to_tree(charts: &Charts, sentence: &[String]) -> Vec<ParseTree> {
    let _span = tracing::span!(tracing::Level::TRACE, "chart_to_tree").entered();

    if sentence.is_empty() {
        return vec![];
    }

    let sentence_len = sentence.len();
    let mut forest = Vec::new();

    for top in charts
        .column(sentence_len)
        .filter(|state| state.is_spanning(sentence_len))
    {
        let start_category = &top.right_hand()[0];
        let allowed = origin_closure(charts, top);
        let mut path = Vec::new();

        for num in &allowed {
            let Some(candidate) = charts.state(*num) else {
                continue;
            };
            if candidate.is_complete()
                && candidate.left_hand() == start_category.as_str()
                && candidate.start_index() == 0
                && candidate.end_index() == sentence_len
            {
                forest.extend(derive(charts, sentence, candidate, &mut path));
            }
        }
    }

    forest
}

/// The origin set of `state`, expanded transitively through unit-completion
/// spines so children recorded one hop down are still reachable.
fn origin_closure(charts: &Charts, state: &State) -> BTreeSet<StateNum> {
    let mut closure: BTreeSet<StateNum> = state.originating_states().collect();
    let mut pending: Vec<StateNum> = closure.iter().copied().collect();

    while let Some(num) = pending.pop() {
        let Some(origin) = charts.state(num) else {
            continue;
        };
        if origin.right_hand().len() == 1 {
            for transitive in origin.originating_states() {
                if closure.insert(transitive) {
                    pending.push(transitive);
                }
            }
        }
    }

    closure
}

/// A scanner-built state: one right-hand symbol, the token at its start, no
/// origins. Everything else in a chart holds categories on its right-hand
/// side.
fn is_leaf(state: &State, sentence: &[String]) -> bool {
    state.right_hand().len() == 1
        && state.end_index() == state.start_index() + 1
        && state.originating_states().next().is_none()
        && sentence.get(state.start_index()).map(String::as_str)
            == Some(state.right_hand()[0].as_str())
}

/// Every derivation of one completed state, as parse trees. `path` carries
/// the state numbers currently being derived, so unit-production cycles
/// terminate instead of recursing forever.
fn derive(
    charts: &Charts,
    sentence: &[String],
    state: &State,
    path: &mut Vec<StateNum>,
) -> Vec<ParseTree> {
    if is_leaf(state, sentence) {
        let token = state.right_hand()[0].clone();
        return vec![ParseTree::from_parts(
            state.left_hand(),
            vec![ParseTreeNode::Terminal(token)],
        )];
    }

    if path.contains(&state.num()) {
        return vec![];
    }
    path.push(state.num());

    let allowed = origin_closure(charts, state);
    let mut selections = Vec::new();
    select_children(
        charts,
        state,
        &allowed,
        state.start_index(),
        0,
        &mut Vec::new(),
        &mut selections,
    );

    let mut derivations = Vec::new();
    for selection in selections {
        let mut partials: Vec<Vec<ParseTreeNode>> = vec![Vec::new()];
        for child_num in &selection {
            let child = charts
                .state(*child_num)
                .expect("selected children must resolve");
            let subtrees = stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
                derive(charts, sentence, child, path)
            });
            if subtrees.is_empty() {
                partials.clear();
                break;
            }
            partials = partials
                .into_iter()
                .flat_map(|partial| {
                    subtrees.iter().map(move |subtree| {
                        let mut grown = partial.clone();
                        grown.push(ParseTreeNode::Nonterminal(subtree.clone()));
                        grown
                    })
                })
                .collect();
        }
        for rhs in partials {
            derivations.push(ParseTree::from_parts(state.left_hand(), rhs));
        }
    }

    path.pop();
    derivations
}

/// Depth-first search for ordered sequences of completed child states that
/// tile `state`'s span: positional category match, contiguous spans, drawn
/// from the allowed origin set.
fn select_children(
    charts: &Charts,
    state: &State,
    allowed: &BTreeSet<StateNum>,
    position: usize,
    symbol_index: usize,
    current: &mut Vec<StateNum>,
    out: &mut Vec<Vec<StateNum>>,
) {
    let right_hand = state.right_hand();
    if symbol_index == right_hand.len() {
        if position == state.end_index() {
            out.push(current.clone());
        }
        return;
    }

    let category = &right_hand[symbol_index];
    for num in allowed {
        let Some(candidate) = charts.state(*num) else {
            continue;
        };
        if candidate.is_complete()
            && candidate.left_hand() == category.as_str()
            && candidate.start_index() == position
            && candidate.end_index() <= state.end_index()
        {
            current.push(*num);
            select_children(
                charts,
                state,
                allowed,
                candidate.end_index(),
                symbol_index + 1,
                current,
                out,
            );
            current.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earley::{parse_earley, tokenize};
    use crate::read_rules;
    use crate::rules::RuleSet;

    fn toy_grammar() -> RuleSet {
        read_rules(
            "S  -> NP VP | VP
             NP -> D N | N
             VP -> V | V NP
             D  : the
             N  : {dog, runs}
             V  : {dog, runs}",
        )
        .unwrap()
    }

    fn parse(rules: &RuleSet, input: &str) -> Vec<ParseTree> {
        let sentence = tokenize(input);
        let charts = parse_earley(rules, &sentence, "S");
        chart_to_tree(&charts, &sentence)
    }

    #[test]
    fn simple_sentence_has_the_expected_first_tree() {
        let trees = parse(&toy_grammar(), "the dog runs");
        assert!(!trees.is_empty());
        assert_eq!(
            trees[0].bracketed(),
            "(S (NP (D the) (N dog)) (VP (V runs)))"
        );
    }

    #[test]
    fn prepositional_phrase_attaches() {
        let rules = read_rules(
            "S  -> NP VP
             NP -> D N | N
             VP -> V NP PP
             PP -> P NP
             N  : {I, fireworks, Pennsylvania}
             V  : bought
             P  : in",
        )
        .unwrap();

        let trees = parse(&rules, "I bought fireworks in Pennsylvania");
        assert_eq!(trees.len(), 1);
        assert_eq!(
            trees[0].bracketed(),
            "(S (NP (N I)) (VP (V bought) (NP (N fireworks)) (PP (P in) (NP (N Pennsylvania)))))"
        );
    }

    #[test]
    fn attachment_ambiguity_yields_two_trees() {
        let rules = read_rules(
            "S  -> NP VP
             NP -> D N | N | NP PP
             VP -> V NP | V NP PP
             PP -> P NP
             N  : {I, fireworks, Pennsylvania}
             V  : bought
             P  : in",
        )
        .unwrap();

        let trees = parse(&rules, "I bought fireworks in Pennsylvania");
        assert_eq!(trees.len(), 2);

        let brackets: Vec<String> = trees.iter().map(ParseTree::bracketed).collect();
        assert!(brackets.contains(
            &"(S (NP (N I)) (VP (V bought) (NP (N fireworks)) (PP (P in) (NP (N Pennsylvania)))))"
                .to_string()
        ));
        assert!(brackets.contains(
            &"(S (NP (N I)) (VP (V bought) (NP (NP (N fireworks)) (PP (P in) (NP (N Pennsylvania))))))"
                .to_string()
        ));
    }

    #[test]
    fn leaves_recover_the_sentence() {
        let trees = parse(&toy_grammar(), "the dog runs");
        for tree in &trees {
            assert_eq!(tree.tokens(), vec!["the", "dog", "runs"]);
        }
    }

    #[test]
    fn unparsable_sentence_yields_an_empty_forest() {
        let trees = parse(&toy_grammar(), "dog the the");
        assert!(trees.is_empty());
    }

    #[test]
    fn empty_sentence_yields_an_empty_forest() {
        let rules = toy_grammar();
        let charts = parse_earley(&rules, &[], "S");
        assert!(chart_to_tree(&charts, &[]).is_empty());
    }

    #[test]
    fn unit_production_chain_is_recovered() {
        let rules = read_rules(
            "S -> A
             A -> B
             B -> C
             C : x",
        )
        .unwrap();

        let trees = parse(&rules, "x");
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].bracketed(), "(S (A (B (C x))))");
    }

    #[test]
    fn ambiguous_pos_tags_give_distinct_trees() {
        let rules = read_rules(
            "S -> A | B
             A : x
             B : x",
        )
        .unwrap();

        let trees = parse(&rules, "x");
        let brackets: Vec<String> = trees.iter().map(ParseTree::bracketed).collect();
        assert_eq!(brackets.len(), 2);
        assert!(brackets.contains(&"(S (A x))".to_string()));
        assert!(brackets.contains(&"(S (B x))".to_string()));
    }

    #[test]
    fn display_draws_branches() {
        let trees = parse(&toy_grammar(), "the dog runs");
        let rendered = trees[0].to_string();
        let expected = "\
S -> NP VP
├── NP -> D N
│   ├── D -> the
│   │   └── the
│   └── N -> dog
│       └── dog
└── VP -> V
    └── V -> runs
        └── runs
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn bracketed_nests_categories_and_tokens() {
        let tree = ParseTree::from_parts(
            "NP",
            vec![
                ParseTreeNode::Nonterminal(ParseTree::from_parts(
                    "D",
                    vec![ParseTreeNode::Terminal("the".to_string())],
                )),
                ParseTreeNode::Nonterminal(ParseTree::from_parts(
                    "N",
                    vec![ParseTreeNode::Terminal("dog".to_string())],
                )),
            ],
        );
        assert_eq!(tree.bracketed(), "(NP (D the) (N dog))");
        assert_eq!(tree.tokens(), vec!["the", "dog"]);
    }
}
