//! # tagcfg
//!
//! Schema-driven serialization between program values and a small XML-like
//! structured-text format.
//!
//! ## How it works
//!
//! You declare a [`Schema`] once: a root element, nested blocks, and one binding
//! per field that points at a value you own. The same schema then saves those
//! values to a document and loads a document back into them. Nothing is
//! generated; the schema only refers to your values through `&RefCell<T>`, so you
//! keep full access to them between calls.
//!
//! ## Key Features
//!
//! - **Built-in bindings**: strings, integers (decimal or hex), bools, fixed byte
//!   buffers, floats, enumerations, string and integer lists
//! - **Custom bindings**: implement [`Scalar`] for a single text value or
//!   [`Aggregate`] for arbitrary nested content
//! - **Forward compatible**: unknown elements are skipped, missing ones leave
//!   their values untouched, element order is free
//! - **Repeated records**: stream lists of records through a nested schema with
//!   [`Schema::write_using_parent`] and [`Schema::connect`]
//! - **No Unsafe Code**
//!
//! ## Quick Start
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
//! schema.check().unwrap();
//!
//! let doc = schema.to_string().unwrap();
//! assert_eq!(
//!     doc,
//!     "<Root><Name>A&amp;B</Name><Count>-5</Count><Tags><Data>x</Data><Data>y</Data></Tags></Root>"
//! );
//!
//! name.borrow_mut().clear();
//! *count.borrow_mut() = 0;
//! tags.borrow_mut().clear();
//!
//! schema.load_str(&doc).unwrap();
//! assert_eq!(*name.borrow(), "A&B");
//! assert_eq!(*count.borrow(), -5);
//! assert_eq!(*tags.borrow(), vec!["x", "y"]);
//! ```
//!
//! ### Nested blocks
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::Schema;
//!
//! let width = RefCell::new(800u32);
//! let height = RefCell::new(600u32);
//!
//! let mut schema = Schema::new("Settings").unwrap();
//! schema
//!     .start_block("Window")
//!     .register_int("Width", &width)
//!     .register_int("Height", &height)
//!     .end_block();
//!
//! assert_eq!(
//!     schema.to_string().unwrap(),
//!     "<Settings><Window><Width>800</Width><Height>600</Height></Window></Settings>"
//! );
//! ```
//!
//! ## Files
//!
//! [`Schema::save_file`] writes the pretty layout with a declaration line;
//! [`Schema::load_file`] refuses files larger than [`DEFAULT_MAX_DOCUMENT_SIZE`].
//! Both log the path at `info` level through the `log` facade.
//!
//! ## Format
//!
//! See the [`grammar`] module for the document dialect.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Saving and loading a settings file
//! - **`repeated_records.rs`** - Key/value lists through a record schema
//! - **`custom_binding.rs`** - Writing your own `Scalar` and `Aggregate`
//!
//! Run any example with: `cargo run --example <name>`

pub mod binding;
pub mod builtin;
pub mod chain;
pub mod de;
pub mod error;
pub mod escape;
pub mod grammar;
pub mod options;
pub mod schema;
pub mod ser;

pub use binding::{Aggregate, Binding, Scalar};
pub use builtin::{FloatFormat, Integer, LIST_ITEM_TAG, UNKNOWN_ENUM_NAME};
pub use chain::ChainReader;
pub use de::DataWindow;
pub use error::{Error, Result};
pub use options::{WriteOptions, DECLARATION, DEFAULT_MAX_DOCUMENT_SIZE};
pub use schema::Schema;
pub use ser::Emitter;
