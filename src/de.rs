//! The read engine.
//!
//! Loading is a single forward pass over an immutable byte buffer. The scanner
//! produces open and close tags; comments and declarations are consumed silently.
//! Tags are matched against the schema node the scan is currently inside:
//!
//! - a **field** name captures everything up to its matching close tag and
//!   dispatches it: scalars get the unescaped text, aggregates get a
//!   [`DataWindow`] over the raw content;
//! - a **child block** name descends into that block;
//! - **anything else** is skipped together with its whole subtree, however deeply
//!   nested, so unknown elements never desynchronise the scan.
//!
//! Values loaded before a malformed-input fault stay loaded.
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::Schema;
//!
//! let name = RefCell::new(String::new());
//! let port = RefCell::new(0u16);
//!
//! let mut schema = Schema::new("Connection").unwrap();
//! schema.register_string("Name", &name).register_int("Port", &port);
//!
//! schema
//!     .load_str("<?xml version=\"1.0\" ?>\n<Connection>\n  <!-- added later -->\n  <Timeout>30</Timeout>\n  <Port>8080</Port>\n  <Name>lab &amp; bench</Name>\n</Connection>\n")
//!     .unwrap();
//!
//! assert_eq!(*name.borrow(), "lab & bench");
//! assert_eq!(*port.borrow(), 8080);
//! ```

use crate::binding::Binding;
use crate::error::position;
use crate::escape::{unescape, unescape_to_string};
use crate::options::DEFAULT_MAX_DOCUMENT_SIZE;
use crate::schema::{Node, NodeId, Schema, ROOT};
use crate::{Error, Result};
use log::{debug, info, trace};
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::Path;

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";

/// A tag produced by the [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'d> {
    /// `<name>`; `content_start` is the offset just past the `>`.
    Open { name: &'d [u8], content_start: usize },
    /// `</name>`; `tag_start` is the offset of the `<`.
    Close { name: &'d [u8], tag_start: usize },
}

/// Forward-only tokenizer over `doc[pos..end]`.
///
/// All offsets are absolute offsets into `doc`, so errors raised while scanning
/// a captured window still report positions in the whole document.
#[derive(Debug, Clone)]
pub(crate) struct Scanner<'d> {
    doc: &'d [u8],
    pos: usize,
    end: usize,
}

impl<'d> Scanner<'d> {
    pub(crate) fn new(doc: &'d [u8], range: Range<usize>) -> Self {
        Scanner {
            doc,
            pos: range.start,
            end: range.end.min(doc.len()),
        }
    }

    pub(crate) fn doc(&self) -> &'d [u8] {
        self.doc
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Returns the next tag, or `None` once the range is exhausted.
    pub(crate) fn next_token(&mut self) -> Result<Option<Token<'d>>> {
        loop {
            let lt = match find_byte(self.doc, b'<', self.pos..self.end) {
                Some(lt) => lt,
                None => {
                    self.pos = self.end;
                    return Ok(None);
                }
            };

            if self.doc[lt..self.end].starts_with(COMMENT_START) {
                let body = lt + COMMENT_START.len();
                match find_seq(self.doc, COMMENT_END, body..self.end) {
                    Some(close) => {
                        self.pos = close + COMMENT_END.len();
                        continue;
                    }
                    None => return Err(self.eof(lt, "-->")),
                }
            }

            let gt = match find_byte(self.doc, b'>', lt + 1..self.end) {
                Some(gt) => gt,
                None => return Err(self.syntax(lt, "unterminated tag")),
            };
            self.pos = gt + 1;

            let body = &self.doc[lt + 1..gt];
            // Declarations and other directives carry no data.
            if body.starts_with(b"?") || body.starts_with(b"!") {
                continue;
            }

            let (closing, body) = match body.strip_prefix(b"/") {
                Some(rest) => (true, rest),
                None => (false, body),
            };
            let name_len = body
                .iter()
                .position(|b| b.is_ascii_whitespace())
                .unwrap_or(body.len());
            let name = &body[..name_len];
            if name.is_empty() {
                return Err(self.syntax(lt, "empty tag name"));
            }

            return Ok(Some(if closing {
                Token::Close {
                    name,
                    tag_start: lt,
                }
            } else {
                Token::Open {
                    name,
                    content_start: gt + 1,
                }
            }));
        }
    }

    /// Advances past the close tag matching an already consumed `<name>` and
    /// returns the content range between the two tags.
    ///
    /// Nested elements are balanced by count only; their names are not checked.
    pub(crate) fn skip_element(&mut self, name: &[u8], content_start: usize) -> Result<Range<usize>> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                None => return Err(self.eof(self.end, &format!("</{}>", lossy(name)))),
                Some(Token::Open { .. }) => depth += 1,
                Some(Token::Close {
                    name: found,
                    tag_start,
                }) => {
                    if depth == 0 {
                        if found != name {
                            let (line, col) = position(self.doc, tag_start);
                            return Err(Error::mismatched_tag(line, col, &lossy(name), &lossy(found)));
                        }
                        return Ok(content_start..tag_start);
                    }
                    depth -= 1;
                }
            }
        }
    }

    pub(crate) fn eof(&self, offset: usize, expected: &str) -> Error {
        let (line, col) = position(self.doc, offset);
        Error::unexpected_eof(line, col, expected)
    }

    fn syntax(&self, offset: usize, msg: &str) -> Error {
        let (line, col) = position(self.doc, offset);
        Error::syntax(line, col, msg)
    }
}

fn find_byte(doc: &[u8], needle: u8, range: Range<usize>) -> Option<usize> {
    let start = range.start;
    doc.get(range)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| start + i)
}

fn find_seq(doc: &[u8], needle: &[u8], range: Range<usize>) -> Option<usize> {
    let start = range.start;
    doc.get(range)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| start + i)
}

pub(crate) fn lossy(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// Runs the read engine for one occurrence of the schema's root block.
///
/// Elements before the root that do not match it are skipped. Returns `Ok(true)`
/// once the root block has been read and closed, `Ok(false)` if the range ends
/// before any root block opens.
pub(crate) fn read_record(schema: &Schema<'_>, scanner: &mut Scanner<'_>) -> Result<bool> {
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        let token = match scanner.next_token()? {
            Some(token) => token,
            None => {
                return match stack.last() {
                    None => Ok(false),
                    Some(&open) => {
                        let expected = format!("</{}>", schema.node(open).name);
                        Err(scanner.eof(scanner.position(), &expected))
                    }
                };
            }
        };

        match token {
            Token::Open {
                name,
                content_start,
            } => {
                let current = match stack.last() {
                    Some(&current) => schema.node(current),
                    None => {
                        if schema.root_name().as_bytes() == name {
                            stack.push(ROOT);
                        } else {
                            debug!("Skipping <{}> outside <{}>", lossy(name), schema.root_name());
                            scanner.skip_element(name, content_start)?;
                        }
                        continue;
                    }
                };

                if let Some(binding) = current.field(name) {
                    let content = scanner.skip_element(name, content_start)?;
                    trace!("Loading <{}> in <{}>", lossy(name), current.name);
                    dispatch(binding, scanner.doc(), content)?;
                } else if let Some(child) = current.child(name) {
                    stack.push(child);
                } else {
                    skip_unknown(current, name, content_start, scanner)?;
                }
            }
            Token::Close { name, tag_start } => {
                let open = match stack.pop() {
                    Some(open) => open,
                    None => {
                        let (line, col) = position(scanner.doc(), tag_start);
                        return Err(Error::unbalanced_end(line, col, &lossy(name)));
                    }
                };
                let expected = &schema.node(open).name;
                if expected.as_bytes() != name {
                    let (line, col) = position(scanner.doc(), tag_start);
                    return Err(Error::mismatched_tag(line, col, expected, &lossy(name)));
                }
                if stack.is_empty() {
                    return Ok(true);
                }
            }
        }
    }
}

fn skip_unknown(
    current: &Node<'_>,
    name: &[u8],
    content_start: usize,
    scanner: &mut Scanner<'_>,
) -> Result<()> {
    debug!("Skipping unknown element <{}> in <{}>", lossy(name), current.name);
    scanner.skip_element(name, content_start).map(|_| ())
}

fn dispatch(binding: &Binding<'_>, doc: &[u8], content: Range<usize>) -> Result<()> {
    match binding {
        Binding::Scalar(scalar) => scalar.from_bytes(&unescape(&doc[content])),
        Binding::Aggregate(aggregate) => aggregate.read(&mut DataWindow::new(doc, content)),
    }
}

/// The raw content captured between an element's open and close tags.
///
/// Handed to [`Aggregate::read`](crate::Aggregate::read). Provides ad-hoc
/// lookups of direct child elements through an internal cursor, and can be
/// connected to a record schema with [`Schema::connect`] to stream repeated
/// records.
///
/// All lookups return owned strings.
#[derive(Debug, Clone)]
pub struct DataWindow<'d> {
    doc: &'d [u8],
    start: usize,
    end: usize,
    cursor: usize,
}

impl<'d> DataWindow<'d> {
    pub(crate) fn new(doc: &'d [u8], content: Range<usize>) -> Self {
        DataWindow {
            doc,
            start: content.start,
            end: content.end,
            cursor: content.start,
        }
    }

    pub(crate) fn doc(&self) -> &'d [u8] {
        self.doc
    }

    pub(crate) fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The raw, still escaped content of the window.
    #[must_use]
    pub fn raw(&self) -> &'d [u8] {
        &self.doc[self.start..self.end]
    }

    /// The whole content of the window, unescaped.
    #[must_use]
    pub fn text(&self) -> String {
        unescape_to_string(self.raw())
    }

    /// Moves the cursor back to the start of the window.
    pub fn rewind(&mut self) {
        self.cursor = self.start;
    }

    /// Finds the first direct child element called `name` and returns its
    /// unescaped content.
    ///
    /// # Errors
    ///
    /// Returns an error if the window content is malformed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use tagcfg::{Aggregate, DataWindow, Emitter, Result, Schema};
    ///
    /// struct Palette<'a>(&'a RefCell<(String, String)>);
    ///
    /// impl Aggregate for Palette<'_> {
    ///     fn write(&self, out: &mut Emitter<'_>) -> Result<()> {
    ///         let colours = self.0.borrow();
    ///         out.write_data_element("Fore", &colours.0)?;
    ///         out.write_data_element("Back", &colours.1)
    ///     }
    ///
    ///     fn read(&self, window: &mut DataWindow<'_>) -> Result<()> {
    ///         let mut colours = self.0.borrow_mut();
    ///         if let Some(back) = window.read_data("Back")? {
    ///             colours.1 = back;
    ///         }
    ///         if let Some(fore) = window.read_data("Fore")? {
    ///             colours.0 = fore;
    ///         }
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let colours = RefCell::new((String::new(), String::new()));
    /// let mut schema = Schema::new("Theme").unwrap();
    /// schema.register_aggregate("Colours", Palette(&colours));
    ///
    /// schema
    ///     .load_str("<Theme><Colours><Fore>FFFFFF</Fore><Back>000000</Back></Colours></Theme>")
    ///     .unwrap();
    /// assert_eq!(*colours.borrow(), ("FFFFFF".to_string(), "000000".to_string()));
    /// ```
    pub fn read_data(&mut self, name: &str) -> Result<Option<String>> {
        self.rewind();
        self.read_next_data(name)
    }

    /// Finds the next direct child element called `name` after the cursor and
    /// returns its unescaped content. Other elements are stepped over.
    ///
    /// # Errors
    ///
    /// Returns an error if the window content is malformed.
    pub fn read_next_data(&mut self, name: &str) -> Result<Option<String>> {
        while let Some((found, content)) = self.next_child()? {
            if found == name.as_bytes() {
                return Ok(Some(unescape_to_string(&self.doc[content])));
            }
        }
        Ok(None)
    }

    /// Returns the name and unescaped content of the first direct child element.
    ///
    /// # Errors
    ///
    /// Returns an error if the window content is malformed.
    pub fn read_first_tag(&mut self) -> Result<Option<(String, String)>> {
        self.rewind();
        self.read_next_tag()
    }

    /// Returns the name and unescaped content of the next direct child element.
    ///
    /// # Errors
    ///
    /// Returns an error if the window content is malformed.
    pub fn read_next_tag(&mut self) -> Result<Option<(String, String)>> {
        Ok(self
            .next_child()?
            .map(|(name, content)| (lossy(name), unescape_to_string(&self.doc[content]))))
    }

    fn next_child(&mut self) -> Result<Option<(&'d [u8], Range<usize>)>> {
        let mut scanner = Scanner::new(self.doc, self.cursor..self.end);
        let found = match scanner.next_token()? {
            None => None,
            Some(Token::Open {
                name,
                content_start,
            }) => {
                let content = scanner.skip_element(name, content_start)?;
                Some((name, content))
            }
            Some(Token::Close { name, tag_start }) => {
                let (line, col) = position(self.doc, tag_start);
                return Err(Error::unbalanced_end(line, col, &lossy(name)));
            }
        };
        self.cursor = scanner.position();
        Ok(found)
    }
}

impl<'a> Schema<'a> {
    /// Loads a document from a string into the bound values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootNotFound`] if the root element never opens, or a
    /// malformed-input error. Values loaded before the fault keep their new values.
    pub fn load_str(&self, doc: &str) -> Result<()> {
        self.load_slice(doc.as_bytes())
    }

    /// Loads a document from raw bytes into the bound values.
    ///
    /// # Errors
    ///
    /// Same as [`Schema::load_str`].
    pub fn load_slice(&self, doc: &[u8]) -> Result<()> {
        debug!("Loading <{}> from {} bytes", self.root_name(), doc.len());
        let mut scanner = Scanner::new(doc, 0..doc.len());
        if read_record(self, &mut scanner)? {
            Ok(())
        } else {
            Err(Error::RootNotFound {
                root: self.root_name().to_string(),
            })
        }
    }

    /// Reads at most `limit` bytes from `reader` and loads them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentTooLarge`] if the reader holds more than `limit`
    /// bytes, [`Error::Io`] if reading fails, or any error of [`Schema::load_slice`].
    pub fn load_reader<R: Read>(&self, reader: R, limit: u64) -> Result<()> {
        let mut doc = Vec::new();
        reader.take(limit.saturating_add(1)).read_to_end(&mut doc)?;
        let size = doc.len() as u64;
        if size > limit {
            return Err(Error::DocumentTooLarge { size, limit });
        }
        self.load_slice(&doc)
    }

    /// Loads a file of at most [`DEFAULT_MAX_DOCUMENT_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Schema::load_file_with_limit`].
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.load_file_with_limit(path, DEFAULT_MAX_DOCUMENT_SIZE)
    }

    /// Loads a file, failing before any scanning if it is larger than `limit` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened or read,
    /// [`Error::DocumentTooLarge`] if it exceeds `limit`, or any error of
    /// [`Schema::load_slice`].
    pub fn load_file_with_limit<P: AsRef<Path>>(&self, path: P, limit: u64) -> Result<()> {
        let path = path.as_ref();
        info!("Loading document <{}> from {}", self.root_name(), path.display());
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        if size > limit {
            return Err(Error::DocumentTooLarge { size, limit });
        }
        self.load_reader(file, limit)
    }
}
