//! The two binding contracts and the type-erased [`Binding`] that holds either.
//!
//! A binding connects one tag name in a schema to one value owned by the caller.
//! Bindings never own that value; the built-in ones borrow a `&RefCell<T>` so the
//! caller keeps access to it between loads and saves.
//!
//! - [`Scalar`]: the value converts to and from a single escaped text run,
//!   written as `<Name>text</Name>`.
//! - [`Aggregate`]: the value writes and reads arbitrary nested elements through
//!   an [`Emitter`] or a [`DataWindow`]. Lists, key/value maps and repeated
//!   records are aggregates.
//!
//! ## Examples
//!
//! A scalar that stores a colour as `#RRGGBB`:
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::{Error, Result, Scalar, Schema};
//!
//! struct Rgb<'a>(&'a RefCell<u32>);
//!
//! impl Scalar for Rgb<'_> {
//!     fn to_text(&self) -> String {
//!         format!("#{:06X}", *self.0.borrow())
//!     }
//!
//!     fn from_text(&self, text: &str) -> Result<()> {
//!         let hex = text.strip_prefix('#').ok_or_else(|| Error::custom("missing '#'"))?;
//!         *self.0.borrow_mut() = u32::from_str_radix(hex, 16).map_err(Error::custom)?;
//!         Ok(())
//!     }
//! }
//!
//! let colour = RefCell::new(0x00FF80);
//! let mut schema = Schema::new("Theme").unwrap();
//! schema.register_scalar("Background", Rgb(&colour));
//!
//! let doc = schema.to_string().unwrap();
//! assert_eq!(doc, "<Theme><Background>#00FF80</Background></Theme>");
//! ```

use crate::de::DataWindow;
use crate::ser::Emitter;
use crate::Result;
use std::fmt;

/// Single-value text conversion.
///
/// The engines call [`Scalar::to_bytes`] and [`Scalar::from_bytes`]. Their
/// defaults go through the text methods, decoding invalid UTF-8 as U+FFFD.
/// Bindings whose value is arbitrary bytes override both.
pub trait Scalar {
    /// Renders the bound value as raw (unescaped) text.
    fn to_text(&self) -> String;

    /// Stores the unescaped element content into the bound value.
    fn from_text(&self, text: &str) -> Result<()>;

    /// Renders the bound value as raw (unescaped) bytes.
    fn to_bytes(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    /// Stores the unescaped element content, byte for byte, into the bound value.
    fn from_bytes(&self, raw: &[u8]) -> Result<()> {
        self.from_text(&String::from_utf8_lossy(raw))
    }
}

/// Nested element reads and writes.
///
/// The write engine wraps [`Aggregate::write`] in the binding's own open and close
/// tags; the read engine hands [`Aggregate::read`] the raw content between them.
pub trait Aggregate {
    /// Writes the child elements of this binding.
    fn write(&self, out: &mut Emitter<'_>) -> Result<()>;

    /// Reads the child elements of this binding from its captured window.
    fn read(&self, window: &mut DataWindow<'_>) -> Result<()>;
}

/// A type-erased binding, dispatched by variant.
pub enum Binding<'a> {
    Scalar(Box<dyn Scalar + 'a>),
    Aggregate(Box<dyn Aggregate + 'a>),
}

impl<'a> Binding<'a> {
    /// Wraps a [`Scalar`] implementation.
    pub fn scalar<S: Scalar + 'a>(scalar: S) -> Self {
        Binding::Scalar(Box::new(scalar))
    }

    /// Wraps an [`Aggregate`] implementation.
    pub fn aggregate<A: Aggregate + 'a>(aggregate: A) -> Self {
        Binding::Aggregate(Box::new(aggregate))
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Binding::Scalar(_))
    }
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Scalar(_) => f.write_str("Binding::Scalar"),
            Binding::Aggregate(_) => f.write_str("Binding::Aggregate"),
        }
    }
}
