use thiserror::Error;

pub type SlotmlResult<T> = Result<T, ParseError>;

/// A grammar violation found while parsing markup.
///
/// Parsing is all-or-nothing: the first violation aborts the parse and is
/// returned to the caller; there is no partial tree. Every variant carries a
/// human-readable description through its `Display` impl.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of input while parsing {context}")]
    UnexpectedEnd { context: String },

    #[error("Mismatched closing tag: expected </{expected}>, found </{found}>")]
    TagMismatch { expected: String, found: String },

    #[error("Element <{name}> is missing its closing tag </{name}>")]
    MissingClosingTag { name: String },

    #[error("Malformed numeric character reference '&#{digits};': {reason}")]
    BadNumericReference { digits: String, reason: String },

    #[error("Expected {expected} at line {line}, column {column}")]
    Expected {
        expected: String,
        line: usize,
        column: usize,
    },

    #[error("Unterminated comment")]
    UnterminatedComment,

    #[error("Unterminated {quote}-quoted attribute value")]
    UnterminatedAttributeValue { quote: char },
}
