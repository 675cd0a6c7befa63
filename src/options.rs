//! Configuration options for writing and loading documents.
//!
//! - [`WriteOptions`]: layout of saved documents (compact or indented, declaration line)
//! - [`DEFAULT_MAX_DOCUMENT_SIZE`]: size cap used by [`Schema::load_file`](crate::Schema::load_file)
//!
//! ## Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::{Schema, WriteOptions};
//!
//! let count = RefCell::new(3i32);
//! let mut schema = Schema::new("Root").unwrap();
//! schema.register_int("Count", &count);
//!
//! let compact = schema.to_string().unwrap();
//! assert_eq!(compact, "<Root><Count>3</Count></Root>");
//!
//! let options = WriteOptions::pretty().with_indent(2).with_declaration(false);
//! let pretty = schema.to_string_with_options(&options).unwrap();
//! assert_eq!(pretty, "<Root>\n  <Count>3</Count>\n</Root>\n");
//! ```

/// Size cap applied by [`Schema::load_file`](crate::Schema::load_file), in bytes.
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 1_000_000;

/// Declaration line written at the top of pretty documents.
pub const DECLARATION: &str = "<?xml version=\"1.0\" standalone=\"no\" ?>";

/// Configuration options for the write engine.
///
/// Indentation is purely cosmetic: the reader never depends on it.
///
/// # Examples
///
/// ```rust
/// use tagcfg::WriteOptions;
///
/// // Compact, no declaration
/// let options = WriteOptions::new();
/// assert!(!options.pretty);
///
/// // One element per line, 4-space indentation, declaration first
/// let options = WriteOptions::pretty();
/// assert_eq!(options.indent, 4);
/// assert!(options.declaration);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    pub indent: usize,
    pub pretty: bool,
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: 4,
            pretty: false,
            declaration: false,
        }
    }
}

impl WriteOptions {
    /// Creates default options (compact output, no declaration).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for indented output with a leading declaration.
    ///
    /// This is the layout used by [`Schema::save_file`](crate::Schema::save_file).
    #[must_use]
    pub fn pretty() -> Self {
        WriteOptions {
            pretty: true,
            declaration: true,
            ..Default::default()
        }
    }

    /// Sets the number of spaces per nesting level. Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Switches between compact and indented output.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Controls whether the `<?xml ... ?>` declaration is written first.
    #[must_use]
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}
