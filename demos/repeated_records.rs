//! Storing a key/value list as repeated records.
//!
//! Run with: cargo run --example repeated_records

use std::cell::RefCell;
use std::error::Error;
use tagcfg::{Aggregate, DataWindow, Emitter, Schema};

/// Each entry is written as `<Option><Key>..</Key><Value>..</Value></Option>`.
struct KeyValues<'a>(&'a RefCell<Vec<(String, String)>>);

impl Aggregate for KeyValues<'_> {
    fn write(&self, out: &mut Emitter<'_>) -> tagcfg::Result<()> {
        let key = RefCell::new(String::new());
        let value = RefCell::new(String::new());
        let mut record = Schema::new("Option")?;
        record.register_string("Key", &key).register_string("Value", &value);

        for (k, v) in self.0.borrow().iter() {
            *key.borrow_mut() = k.clone();
            *value.borrow_mut() = v.clone();
            record.write_using_parent(out)?;
        }
        Ok(())
    }

    fn read(&self, window: &mut DataWindow<'_>) -> tagcfg::Result<()> {
        let key = RefCell::new(String::new());
        let value = RefCell::new(String::new());
        let mut record = Schema::new("Option")?;
        record.register_string("Key", &key).register_string("Value", &value);

        let mut entries = self.0.borrow_mut();
        entries.clear();
        for loaded in record.connect(window) {
            loaded?;
            entries.push((key.borrow().clone(), value.borrow().clone()));
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let macros = RefCell::new(vec![
        ("reset".to_string(), "ATZ\\r".to_string()),
        ("info".to_string(), "ATI<cr>".to_string()),
    ]);

    let mut schema = Schema::new("Terminal")?;
    schema.register_aggregate("Macros", KeyValues(&macros));

    let doc = schema.to_string_pretty()?;
    println!("{}", doc);

    // A hand-edited file: extra comments and unknown elements are fine
    let edited = doc.replace(
        "<Macros>",
        "<Macros>\n        <!-- added by hand -->\n        <Option><Key>dial</Key><Value>ATD555</Value><Note>x</Note></Option>",
    );
    schema.load_str(&edited)?;

    for (key, value) in macros.borrow().iter() {
        println!("{key} => {value}");
    }
    assert_eq!(macros.borrow().len(), 3);
    println!("✓ Loaded {} macros", macros.borrow().len());

    Ok(())
}
