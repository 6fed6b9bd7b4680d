//! nom parsers for the two grammar-rule forms.
//!
//! Lines are classified and trimmed by [`crate::rules`] before they reach the
//! parsers here, so every parser in this module runs over a single rule with
//! no surrounding whitespace.

use crate::rules::Symbol;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map},
    multi::separated_list1,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

/// A category name: letters, digits and dots, e.g. `NP` or `V.intrans`.
pub(crate) fn category(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '.').parse(input)
}

/// One right-hand-side symbol with its surface sugar: `(X)`, `X+` or plain `X`.
fn symbol(input: &str) -> IResult<&str, Symbol> {
    alt((
        map(delimited(char('('), category, char(')')), |name: &str| {
            Symbol::Optional(name.to_string())
        }),
        map(terminated(category, char('+')), |name: &str| {
            Symbol::Repeated(name.to_string())
        }),
        map(category, |name: &str| Symbol::Required(name.to_string())),
    ))
    .parse(input)
}

fn symbol_sequence(input: &str) -> IResult<&str, Vec<Symbol>> {
    separated_list1(space1, symbol).parse(input)
}

/// `LHS -> S1 S2 … | T1 T2 …` with any number of top-level alternatives.
pub(crate) fn syntactic(input: &str) -> IResult<&str, (String, Vec<Vec<Symbol>>)> {
    let (input, lhs) = category(input)?;
    let (input, _) = delimited(space0, tag("->"), space0).parse(input)?;
    let (input, alternatives) =
        separated_list1(delimited(space0, char('|'), space0), symbol_sequence).parse(input)?;
    Ok((input, (lhs.to_string(), alternatives)))
}

pub(crate) fn syntactic_complete(input: &str) -> IResult<&str, (String, Vec<Vec<Symbol>>)> {
    all_consuming(syntactic).parse(input)
}

/// A lexicon word: anything without whitespace, braces or commas.
fn token(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && c != '{' && c != '}' && c != ','),
        |t: &str| t.to_string(),
    )
    .parse(input)
}

fn braced_tokens(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        terminated(char('{'), space0),
        separated_list1(delimited(space0, char(','), space0), token),
        preceded(space0, char('}')),
    )
    .parse(input)
}

/// `CAT : token` or `CAT : {tok1, tok2, …}`.
pub(crate) fn lexical(input: &str) -> IResult<&str, (String, Vec<String>)> {
    let (input, lhs) = category(input)?;
    let (input, _) = delimited(space0, char(':'), space0).parse(input)?;
    let (input, tokens) = alt((braced_tokens, map(token, |t| vec![t]))).parse(input)?;
    Ok((input, (lhs.to_string(), tokens)))
}

pub(crate) fn lexical_complete(input: &str) -> IResult<&str, (String, Vec<String>)> {
    all_consuming(lexical).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_with_dots() {
        let (rest, name) = category("V.intrans rest").unwrap();
        assert_eq!(name, "V.intrans");
        assert_eq!(rest, " rest");
    }

    #[test]
    fn symbol_plain() {
        let (_, sym) = symbol("NP").unwrap();
        assert_eq!(sym, Symbol::Required("NP".to_string()));
    }

    #[test]
    fn symbol_optional() {
        let (_, sym) = symbol("(Det)").unwrap();
        assert_eq!(sym, Symbol::Optional("Det".to_string()));
    }

    #[test]
    fn symbol_repeated() {
        let (_, sym) = symbol("Adj+").unwrap();
        assert_eq!(sym, Symbol::Repeated("Adj".to_string()));
    }

    #[test]
    fn syntactic_single_alternative() {
        let (_, (lhs, alternatives)) = syntactic_complete("NP -> D N").unwrap();
        assert_eq!(lhs, "NP");
        assert_eq!(
            alternatives,
            vec![vec![
                Symbol::Required("D".to_string()),
                Symbol::Required("N".to_string())
            ]]
        );
    }

    #[test]
    fn syntactic_alternatives_and_sugar() {
        let (_, (lhs, alternatives)) = syntactic_complete("VP -> V | V (NP) PP+").unwrap();
        assert_eq!(lhs, "VP");
        assert_eq!(alternatives.len(), 2);
        assert_eq!(
            alternatives[1],
            vec![
                Symbol::Required("V".to_string()),
                Symbol::Optional("NP".to_string()),
                Symbol::Repeated("PP".to_string()),
            ]
        );
    }

    #[test]
    fn syntactic_rejects_trailing_garbage() {
        assert!(syntactic_complete("NP -> D N $").is_err());
    }

    #[test]
    fn lexical_single_token() {
        let (_, (lhs, tokens)) = lexical_complete("D : the").unwrap();
        assert_eq!(lhs, "D");
        assert_eq!(tokens, vec!["the".to_string()]);
    }

    #[test]
    fn lexical_braced_tokens() {
        let (_, (lhs, tokens)) = lexical_complete("D : {dog, cat, mouse}").unwrap();
        assert_eq!(lhs, "D");
        assert_eq!(
            tokens,
            vec!["dog".to_string(), "cat".to_string(), "mouse".to_string()]
        );
    }

    #[test]
    fn lexical_token_with_punctuation() {
        let (_, (_, tokens)) = lexical_complete("V : doesn't").unwrap();
        assert_eq!(tokens, vec!["doesn't".to_string()]);
    }

    #[test]
    fn lexical_rejects_empty_braces() {
        assert!(lexical_complete("D : {}").is_err());
    }
}
