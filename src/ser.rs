//! The write engine.
//!
//! Saving walks the schema tree depth first. Each block becomes an open tag, its
//! fields in declaration order, its child blocks, and a close tag. Scalar fields
//! become `<Name>escaped text</Name>`; aggregate fields get their own open and
//! close tags around whatever their [`Aggregate::write`](crate::Aggregate::write)
//! emits.
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::Schema;
//!
//! let name = RefCell::new("A&B".to_string());
//! let count = RefCell::new(-5i32);
//! let tags = RefCell::new(vec!["x".to_string(), "y".to_string()]);
//!
//! let mut schema = Schema::new("Root").unwrap();
//! schema
//!     .register_string("Name", &name)
//!     .register_int("Count", &count)
//!     .register_string_list("Tags", &tags);
//!
//! assert_eq!(
//!     schema.to_string().unwrap(),
//!     "<Root><Name>A&amp;B</Name><Count>-5</Count><Tags><Data>x</Data><Data>y</Data></Tags></Root>"
//! );
//! ```
//!
//! ## Repeated records
//!
//! An [`Aggregate`](crate::Aggregate) that owns a list of records builds a small
//! schema for one record, copies each element into that schema's bound scratch
//! values and calls [`Schema::write_using_parent`] once per element. Every call
//! appends one complete block at the parent's current depth, so N elements produce
//! N sibling blocks with no wrapper and no stored count.

use crate::binding::Binding;
use crate::escape::escape_into;
use crate::options::{WriteOptions, DECLARATION};
use crate::schema::{is_valid_name, NodeId, Schema, ROOT};
use crate::{Error, Result};
use log::{debug, info, trace};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// Output is handed to the underlying writer in windows of roughly this size.
const CHUNK_SIZE: usize = 4096;

/// Write handle for the write engine and for [`Aggregate`](crate::Aggregate) bindings.
///
/// Tracks the nesting depth for indentation and buffers output in fixed-size
/// chunks before handing it to the underlying writer.
pub struct Emitter<'w> {
    out: &'w mut dyn Write,
    options: WriteOptions,
    depth: usize,
    buffer: String,
}

impl<'w> Emitter<'w> {
    pub(crate) fn new(out: &'w mut dyn Write, options: WriteOptions) -> Self {
        Emitter {
            out,
            options,
            depth: 0,
            buffer: String::with_capacity(CHUNK_SIZE + 256),
        }
    }

    /// Current nesting depth (0 outside the root element).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The options this document is written with.
    #[must_use]
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Writes `<name>` and enters a new nesting level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for an ill-formed tag name, or an I/O error.
    pub fn open_block(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        self.push_indent();
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.buffer.push('>');
        self.push_newline();
        self.depth += 1;
        self.maybe_flush()
    }

    /// Leaves the current nesting level and writes `</name>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for an ill-formed tag name, or an I/O error.
    pub fn close_block(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        self.depth = self.depth.saturating_sub(1);
        self.push_indent();
        self.buffer.push_str("</");
        self.buffer.push_str(name);
        self.buffer.push('>');
        self.push_newline();
        self.maybe_flush()
    }

    /// Writes `<name>value</name>` with `value` escaped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for an ill-formed tag name, or an I/O error.
    pub fn write_data_element(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_data_bytes(name, value.as_bytes())
    }

    /// Writes `<name>raw</name>` with arbitrary bytes escaped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for an ill-formed tag name, or an I/O error.
    pub fn write_data_bytes(&mut self, name: &str, raw: &[u8]) -> Result<()> {
        check_name(name)?;
        self.push_indent();
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.buffer.push('>');
        escape_into(raw, &mut self.buffer);
        self.buffer.push_str("</");
        self.buffer.push_str(name);
        self.buffer.push('>');
        self.push_newline();
        self.maybe_flush()
    }

    fn write_declaration(&mut self) -> Result<()> {
        self.buffer.push_str(DECLARATION);
        self.push_newline();
        self.maybe_flush()
    }

    fn push_indent(&mut self) {
        if self.options.pretty {
            let width = self.depth * self.options.indent;
            self.buffer.extend(std::iter::repeat(' ').take(width));
        }
    }

    fn push_newline(&mut self) {
        if self.options.pretty {
            self.buffer.push('\n');
        }
    }

    fn maybe_flush(&mut self) -> Result<()> {
        if self.buffer.len() >= CHUNK_SIZE {
            self.flush_buffer()?;
        }
        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        self.out.write_all(self.buffer.as_bytes())?;
        self.buffer.clear();
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.flush_buffer()?;
        self.out.flush()?;
        Ok(())
    }
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::invalid_name(name))
    }
}

impl<'a> Schema<'a> {
    /// Saves the bound values as a compact document string.
    ///
    /// # Errors
    ///
    /// Returns an error if an [`Aggregate`](crate::Aggregate) binding fails.
    pub fn to_string(&self) -> Result<String> {
        self.to_string_with_options(&WriteOptions::default())
    }

    /// Saves the bound values as an indented document string with a declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if an [`Aggregate`](crate::Aggregate) binding fails.
    pub fn to_string_pretty(&self) -> Result<String> {
        self.to_string_with_options(&WriteOptions::pretty())
    }

    /// Saves the bound values as a document string laid out per `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if an [`Aggregate`](crate::Aggregate) binding fails.
    pub fn to_string_with_options(&self, options: &WriteOptions) -> Result<String> {
        let mut output = Vec::with_capacity(256);
        self.to_writer_with_options(&mut output, options)?;
        String::from_utf8(output).map_err(Error::custom)
    }

    /// Streams a compact document to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or an aggregate binding fails.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        self.to_writer_with_options(writer, &WriteOptions::default())
    }

    /// Streams a document laid out per `options` to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or an aggregate binding fails.
    pub fn to_writer_with_options<W: Write>(&self, mut writer: W, options: &WriteOptions) -> Result<()> {
        let mut emitter = Emitter::new(&mut writer, options.clone());
        if options.declaration {
            emitter.write_declaration()?;
        }
        self.write_node(ROOT, &mut emitter)?;
        debug!("Wrote document <{}>", self.root_name());
        emitter.finish()
    }

    /// Saves an indented document with a declaration to `path`.
    ///
    /// A failed save may leave a partial file behind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or written.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_file_with_options(path, &WriteOptions::pretty())
    }

    /// Saves a document laid out per `options` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or written.
    pub fn save_file_with_options<P: AsRef<Path>>(&self, path: P, options: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        info!("Saving document <{}> to {}", self.root_name(), path.display());
        let file = File::create(path)?;
        self.to_writer_with_options(BufWriter::new(file), options)
    }

    /// Writes this schema as one nested block through a parent's [`Emitter`].
    ///
    /// The block is written at the parent's current depth, so calling this once
    /// per element of a list emits one sibling block per element.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or an aggregate binding fails.
    pub fn write_using_parent(&self, out: &mut Emitter<'_>) -> Result<()> {
        trace!("Writing chained <{}> at depth {}", self.root_name(), out.depth());
        self.write_node(ROOT, out)
    }

    fn write_node(&self, id: NodeId, out: &mut Emitter<'_>) -> Result<()> {
        let node = self.node(id);
        out.open_block(&node.name)?;

        for (name, binding) in &node.fields {
            match binding {
                Binding::Scalar(scalar) => out.write_data_bytes(name, &scalar.to_bytes())?,
                Binding::Aggregate(aggregate) => {
                    out.open_block(name)?;
                    aggregate.write(out)?;
                    out.close_block(name)?;
                }
            }
        }

        for &child in node.children.values() {
            self.write_node(child, out)?;
        }

        out.close_block(&node.name)
    }
}
