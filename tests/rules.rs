//! Reader integration: sugar expansion properties over random rule shapes.

use psg::{gen_opt_poss, read_rules, MAX_REPEAT};
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use std::collections::HashSet;

/// A right-hand side of distinct symbols, each independently optional.
#[derive(Debug, Clone)]
struct OptionalPattern {
    names: Vec<String>,
    optional: Vec<bool>,
}

impl Arbitrary for OptionalPattern {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = *g.choose(&[1usize, 2, 3, 4, 5, 6]).unwrap();
        let names = (0..len).map(|i| format!("X{i}")).collect();
        let optional = (0..len).map(|_| bool::arbitrary(g)).collect();
        Self { names, optional }
    }
}

impl OptionalPattern {
    fn surface(&self) -> Vec<String> {
        self.names
            .iter()
            .zip(&self.optional)
            .map(|(name, optional)| {
                if *optional {
                    format!("({name})")
                } else {
                    name.clone()
                }
            })
            .collect()
    }

    /// Every subset of the optional positions, merged with the required ones.
    fn expected_variants(&self) -> HashSet<Vec<String>> {
        let optional_positions: Vec<usize> = (0..self.names.len())
            .filter(|&i| self.optional[i])
            .collect();
        let mut variants = HashSet::new();
        for mask in 0..(1usize << optional_positions.len()) {
            let kept: Vec<String> = (0..self.names.len())
                .filter(|i| match optional_positions.iter().position(|p| p == i) {
                    Some(bit) => mask & (1 << bit) != 0,
                    None => true,
                })
                .map(|i| self.names[i].clone())
                .collect();
            variants.insert(kept);
        }
        variants
    }
}

fn prop_optionality_covers_exactly_the_choices(pattern: OptionalPattern) -> TestResult {
    let surface = pattern.surface();
    let surface_refs: Vec<&str> = surface.iter().map(String::as_str).collect();
    let variants = gen_opt_poss(&surface_refs);

    let optionals = pattern.optional.iter().filter(|o| **o).count();
    if variants.len() != 1 << optionals {
        return TestResult::error(format!(
            "expected {} variants, got {}",
            1 << optionals,
            variants.len()
        ));
    }

    let produced: HashSet<Vec<String>> = variants.into_iter().collect();
    TestResult::from_bool(produced == pattern.expected_variants())
}

#[test]
fn optionality_covers_exactly_the_choices() {
    QuickCheck::new()
        .tests(500)
        .quickcheck(prop_optionality_covers_exactly_the_choices as fn(OptionalPattern) -> TestResult)
}

/// A `R+` symbol flanked by fixed neighbours at a random position.
#[derive(Debug, Clone)]
struct RepeatPattern {
    before: usize,
    after: usize,
}

impl Arbitrary for RepeatPattern {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            before: *g.choose(&[0usize, 1, 2, 3]).unwrap(),
            after: *g.choose(&[0usize, 1, 2, 3]).unwrap(),
        }
    }
}

fn prop_repetition_expands_in_place(pattern: RepeatPattern) -> TestResult {
    let mut symbols: Vec<String> = (0..pattern.before).map(|i| format!("A{i}")).collect();
    symbols.push("R+".to_string());
    symbols.extend((0..pattern.after).map(|i| format!("B{i}")));

    let rule = format!("S -> {}", symbols.join(" "));
    let rules = match read_rules(&rule) {
        Ok(rules) => rules,
        Err(e) => return TestResult::error(e.to_string()),
    };

    let alternatives: Vec<&[String]> = rules.alternatives("S").collect();
    if alternatives.len() != MAX_REPEAT {
        return TestResult::error(format!("{} alternatives", alternatives.len()));
    }

    for (index, alternative) in alternatives.iter().enumerate() {
        let copies = index + 1;
        if alternative.len() != pattern.before + copies + pattern.after {
            return TestResult::failed();
        }
        let (prefix, rest) = alternative.split_at(pattern.before);
        let (repeated, suffix) = rest.split_at(copies);
        if !prefix.iter().enumerate().all(|(i, s)| s == &format!("A{i}"))
            || !repeated.iter().all(|s| s == "R")
            || !suffix.iter().enumerate().all(|(i, s)| s == &format!("B{i}"))
        {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[test]
fn repetition_expands_in_place() {
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop_repetition_expands_in_place as fn(RepeatPattern) -> TestResult)
}

#[test]
fn sugar_composes_across_alternatives() {
    let rules = read_rules("VP -> V (NP) | V PP+").unwrap();
    // 2 from the optional, MAX_REPEAT from the repetition
    assert_eq!(rules.alternatives("VP").count(), 2 + MAX_REPEAT);
}

#[test]
fn reader_errors_name_the_line() {
    for bad in ["NP D N", "A -> B -> C", "D : the : a"] {
        let error = read_rules(bad).unwrap_err();
        assert!(
            error.to_string().contains(bad.split(' ').next().unwrap()),
            "error for {bad:?} should mention the line: {error}"
        );
    }
}
