//! Repeated records inside one aggregate element.
//!
//! A document often holds a list of identically shaped records:
//!
//! ```text
//! <Bookmarks>
//!     <Option><Key>home</Key><Value>/root</Value></Option>
//!     <Option><Key>logs</Key><Value>/var/log</Value></Option>
//! </Bookmarks>
//! ```
//!
//! Writing them is just a loop: update the bound values, then call
//! [`Schema::write_using_parent`] once per record. Reading them goes through a
//! [`ChainReader`]: [`Schema::connect`] attaches the record schema to the window of
//! the enclosing aggregate, and every [`ChainReader::read_next`] loads the next
//! record into the bound values.
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::{Aggregate, DataWindow, Emitter, Result, Schema};
//!
//! struct Bookmarks<'a>(&'a RefCell<Vec<(String, String)>>);
//!
//! impl Aggregate for Bookmarks<'_> {
//!     fn write(&self, out: &mut Emitter<'_>) -> Result<()> {
//!         let key = RefCell::new(String::new());
//!         let value = RefCell::new(String::new());
//!         let mut record = Schema::new("Option")?;
//!         record.register_string("Key", &key).register_string("Value", &value);
//!
//!         for (k, v) in self.0.borrow().iter() {
//!             *key.borrow_mut() = k.clone();
//!             *value.borrow_mut() = v.clone();
//!             record.write_using_parent(out)?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn read(&self, window: &mut DataWindow<'_>) -> Result<()> {
//!         let key = RefCell::new(String::new());
//!         let value = RefCell::new(String::new());
//!         let mut record = Schema::new("Option")?;
//!         record.register_string("Key", &key).register_string("Value", &value);
//!
//!         let mut entries = self.0.borrow_mut();
//!         entries.clear();
//!         let mut chain = record.connect(window);
//!         while chain.read_next()? {
//!             entries.push((key.borrow().clone(), value.borrow().clone()));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let marks = RefCell::new(vec![
//!     ("home".to_string(), "/root".to_string()),
//!     ("logs".to_string(), "/var/log".to_string()),
//! ]);
//! let mut schema = Schema::new("Settings").unwrap();
//! schema.register_aggregate("Bookmarks", Bookmarks(&marks));
//!
//! let doc = schema.to_string().unwrap();
//! marks.borrow_mut().clear();
//! schema.load_str(&doc).unwrap();
//!
//! assert_eq!(marks.borrow().len(), 2);
//! assert_eq!(marks.borrow()[1].1, "/var/log");
//! ```

use crate::de::{read_record, DataWindow, Scanner};
use crate::schema::Schema;
use crate::Result;
use log::trace;

/// A cursor that loads consecutive occurrences of a record schema's root element
/// from one [`DataWindow`].
///
/// Elements between records whose name is not the record root are skipped.
/// Once `read_next` returns `Ok(false)` or an error, the reader stays exhausted.
#[derive(Debug)]
pub struct ChainReader<'s, 'a, 'd> {
    schema: &'s Schema<'a>,
    scanner: Scanner<'d>,
    records: usize,
    done: bool,
}

impl<'s, 'a, 'd> ChainReader<'s, 'a, 'd> {
    /// Loads the next record into the bound values.
    ///
    /// Returns `Ok(true)` when a record was read and `Ok(false)` when the window
    /// holds no further records.
    ///
    /// # Errors
    ///
    /// Returns a malformed-input error if the window is malformed. Values loaded
    /// from the faulty record before the fault keep their new values.
    pub fn read_next(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        match read_record(self.schema, &mut self.scanner) {
            Ok(true) => {
                self.records += 1;
                trace!("Read record <{}> #{}", self.schema.root_name(), self.records);
                Ok(true)
            }
            Ok(false) => {
                self.done = true;
                Ok(false)
            }
            Err(err) => {
                self.done = true;
                Err(err)
            }
        }
    }

    /// Number of records read so far.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }
}

/// Yields `Ok(())` for every record loaded. Fused after the last record or
/// the first error.
impl Iterator for ChainReader<'_, '_, '_> {
    type Item = Result<()>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(true) => Some(Ok(())),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl std::iter::FusedIterator for ChainReader<'_, '_, '_> {}

impl<'a> Schema<'a> {
    /// Connects this schema, as a record schema, to the window of an enclosing
    /// aggregate. The window's cursor is not used or moved.
    pub fn connect<'s, 'd>(&'s self, window: &DataWindow<'d>) -> ChainReader<'s, 'a, 'd> {
        ChainReader {
            schema: self,
            scanner: Scanner::new(window.doc(), window.range()),
            records: 0,
            done: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;

    fn window(doc: &[u8]) -> DataWindow<'_> {
        DataWindow::new(doc, 0..doc.len())
    }

    #[test]
    fn test_reads_each_record_then_stops() {
        let id = RefCell::new(0u32);
        let mut record = Schema::new("Item").unwrap();
        record.register_int("Id", &id);

        let doc = b"<Item><Id>1</Id></Item><Item><Id>2</Id></Item><Item><Id>3</Id></Item>";
        let window = window(doc);
        let mut chain = record.connect(&window);

        let mut seen = Vec::new();
        while chain.read_next().unwrap() {
            seen.push(*id.borrow());
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(chain.records(), 3);
        assert!(!chain.read_next().unwrap());
    }

    #[test]
    fn test_empty_window_has_no_records() {
        let id = RefCell::new(7u32);
        let mut record = Schema::new("Item").unwrap();
        record.register_int("Id", &id);

        let window = window(b"  \n ");
        assert!(!record.connect(&window).read_next().unwrap());
        assert_eq!(*id.borrow(), 7);
    }

    #[test]
    fn test_foreign_siblings_are_skipped() {
        let id = RefCell::new(0u32);
        let mut record = Schema::new("Item").unwrap();
        record.register_int("Id", &id);

        let doc = b"<Note>x</Note><Item><Id>4</Id></Item><!-- c --><Other><Item><Id>9</Id></Item></Other><Item><Id>5</Id></Item>";
        let window = window(doc);
        let ids: Vec<u32> = record
            .connect(&window)
            .map(|r| r.map(|()| *id.borrow()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_error_fuses_the_reader() {
        let id = RefCell::new(0u32);
        let mut record = Schema::new("Item").unwrap();
        record.register_int("Id", &id);

        let doc = b"<Item><Id>1</Id></Item><Item><Id>2</Wrong></Item>";
        let window = window(doc);
        let mut chain = record.connect(&window);

        assert!(chain.read_next().unwrap());
        assert!(matches!(chain.read_next(), Err(Error::MismatchedTag { .. })));
        assert!(chain.next().is_none());
    }
}
