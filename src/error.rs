use std::error;
use std::fmt;

/// Structural faults raised while building grammars and Earley states.
///
/// The grammar verifier never raises; it reports inconsistencies as plain
/// booleans. Likewise a sentence the grammar does not accept is not an error:
/// the recognizer returns `false` and the tree extractor returns an empty
/// forest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A grammar line that cannot be read as a syntactic or lexical rule.
    MalformedRule(String),
    /// A dot position past the end of a state's right-hand side.
    InvalidDotIndex {
        /// The rejected dot position (count of recognized symbols).
        dot: usize,
        /// Length of the right-hand side the dot was aimed at.
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedRule(s) => write!(f, "MalformedRule: {s}"),
            Error::InvalidDotIndex { dot, len } => write!(
                f,
                "InvalidDotIndex: dot {dot} outside 0..={len} for a right-hand side of {len} symbols"
            ),
        }
    }
}

impl error::Error for Error {}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&'a str>>) -> Self {
        let string = match err {
            nom::Err::Incomplete(_) => String::from("rule ended before a complete parse"),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                format!("unparsable at: {}", e.input)
            }
        };

        Error::MalformedRule(string)
    }
}
