//! Error types for schema registration, saving and loading.
//!
//! ## Error Categories
//!
//! - **Schema Errors**: invalid or duplicate tag names, unbalanced blocks. These are
//!   recorded in the schema's sticky failure slot (see [`Schema::check`](crate::Schema::check))
//!   and never abort the process.
//! - **I/O Errors**: the document file could not be opened, read or written.
//! - **Malformed Input**: truncated tags, mismatched or unbalanced end tags, end of
//!   input while an element is still open. Carry line and column information.
//!
//! Unknown elements are never an error: they are skipped so that older schemas can
//! read documents written by newer ones.
//!
//! ## Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::{Error, Schema};
//!
//! let name = RefCell::new(String::new());
//! let mut schema = Schema::new("Root").unwrap();
//! schema.register_string("Name", &name);
//!
//! let err = schema.load_str("<Root><Name>x</Root>").unwrap_err();
//! assert!(matches!(err, Error::MismatchedTag { .. }));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents every failure the engine can report.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A tag name uses characters outside `[A-Za-z0-9_]` or is empty
    #[error("Invalid tag name {name:?}: only A-Z, a-z, 0-9 and '_' are allowed")]
    InvalidName { name: String },

    /// A block already holds a field or child block with this name
    #[error("Duplicate name {name:?} in block <{block}>")]
    DuplicateName { name: String, block: String },

    /// Misuse of the registration API
    #[error("Schema error: {0}")]
    Schema(String),

    /// The document is larger than the caller's limit
    #[error("Document is {size} bytes, limit is {limit} bytes")]
    DocumentTooLarge { size: u64, limit: u64 },

    /// Syntax error with position
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// Input ended while an element was still open
    #[error("Unexpected end of input at line {line}, column {col}\nExpected: {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
    },

    /// An end tag does not close the element that is open
    #[error("Mismatched end tag at line {line}, column {col}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        line: usize,
        col: usize,
        expected: String,
        found: String,
    },

    /// An end tag appeared with no element open
    #[error("Unbalanced end tag </{found}> at line {line}, column {col}")]
    UnbalancedEnd {
        line: usize,
        col: usize,
        found: String,
    },

    /// The document never opened the schema's root element
    #[error("Root element <{root}> not found in document")]
    RootNotFound { root: String },

    /// Custom error raised by a caller-supplied binding
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcfg::Error;
    ///
    /// let err = Error::syntax(10, 5, "unterminated tag");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(line: usize, col: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            expected: expected.to_string(),
        }
    }

    /// Creates a mismatched end tag error.
    pub fn mismatched_tag(line: usize, col: usize, expected: &str, found: &str) -> Self {
        Error::MismatchedTag {
            line,
            col,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an error for an end tag that closes nothing.
    pub fn unbalanced_end(line: usize, col: usize, found: &str) -> Self {
        Error::UnbalancedEnd {
            line,
            col,
            found: found.to_string(),
        }
    }

    /// Creates an invalid tag name error.
    pub fn invalid_name(name: &str) -> Self {
        Error::InvalidName {
            name: name.to_string(),
        }
    }

    /// Creates a duplicate name error for `name` inside `block`.
    pub fn duplicate_name(name: &str, block: &str) -> Self {
        Error::DuplicateName {
            name: name.to_string(),
            block: block.to_string(),
        }
    }

    /// Creates a schema misuse error.
    pub fn schema(msg: &str) -> Self {
        Error::Schema(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// Intended for [`Scalar`](crate::Scalar) and [`Aggregate`](crate::Aggregate)
    /// implementations that reject their input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcfg::Error;
    ///
    /// let err = Error::custom("key must not be empty");
    /// assert!(err.to_string().contains("key must not be empty"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors raised while building a schema.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidName { .. } | Error::DuplicateName { .. } | Error::Schema(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Converts a byte offset in `doc` into a 1-based line and column.
pub(crate) fn position(doc: &[u8], offset: usize) -> (usize, usize) {
    let upto = &doc[..offset.min(doc.len())];
    let line = upto.iter().filter(|&&b| b == b'\n').count() + 1;
    let col = match upto.iter().rposition(|&b| b == b'\n') {
        Some(nl) => offset - nl,
        None => offset + 1,
    };
    (line, col)
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_line() {
        assert_eq!(position(b"<Root>", 0), (1, 1));
        assert_eq!(position(b"<Root>", 3), (1, 4));
    }

    #[test]
    fn test_position_after_newline() {
        let doc = b"<Root>\n    <A>";
        assert_eq!(position(doc, 7), (2, 1));
        assert_eq!(position(doc, 11), (2, 5));
    }

    #[test]
    fn test_schema_error_classification() {
        assert!(Error::invalid_name("a-b").is_schema_error());
        assert!(Error::duplicate_name("A", "Root").is_schema_error());
        assert!(!Error::io("denied").is_schema_error());
    }
}
