//! Repeated records written with `write_using_parent` and read with `connect`.

use std::cell::RefCell;

use tagcfg::{Aggregate, DataWindow, Emitter, Error, Result, Schema, WriteOptions};

/// A key/value list stored as `<Option><Key>..</Key><Value>..</Value></Option>` records.
struct KvList<'a>(&'a RefCell<Vec<(String, String)>>);

impl KvList<'_> {
    fn with_record<R>(f: impl FnOnce(&Schema<'_>, &RefCell<String>, &RefCell<String>) -> R) -> R {
        let key = RefCell::new(String::new());
        let value = RefCell::new(String::new());
        let mut record = Schema::new("Option").unwrap();
        record.register_string("Key", &key).register_string("Value", &value);
        f(&record, &key, &value)
    }
}

impl Aggregate for KvList<'_> {
    fn write(&self, out: &mut Emitter<'_>) -> Result<()> {
        KvList::with_record(|record, key, value| -> Result<()> {
            for (k, v) in self.0.borrow().iter() {
                *key.borrow_mut() = k.clone();
                *value.borrow_mut() = v.clone();
                record.write_using_parent(out)?;
            }
            Ok(())
        })
    }

    fn read(&self, window: &mut DataWindow<'_>) -> Result<()> {
        KvList::with_record(|record, key, value| -> Result<()> {
            let mut entries = self.0.borrow_mut();
            entries.clear();
            for loaded in record.connect(window) {
                loaded?;
                entries.push((key.borrow().clone(), value.borrow().clone()));
            }
            Ok(())
        })
    }
}

/// A list of named groups, each holding its own key/value list: chaining inside chaining.
struct Groups<'a>(&'a RefCell<Vec<(String, Vec<(String, String)>)>>);

impl Aggregate for Groups<'_> {
    fn write(&self, out: &mut Emitter<'_>) -> Result<()> {
        let name = RefCell::new(String::new());
        let entries = RefCell::new(Vec::new());
        let mut record = Schema::new("Group")?;
        record
            .register_string("Name", &name)
            .register_aggregate("Entries", KvList(&entries));

        for (group, list) in self.0.borrow().iter() {
            *name.borrow_mut() = group.clone();
            *entries.borrow_mut() = list.clone();
            record.write_using_parent(out)?;
        }
        Ok(())
    }

    fn read(&self, window: &mut DataWindow<'_>) -> Result<()> {
        let name = RefCell::new(String::new());
        let entries = RefCell::new(Vec::new());
        let mut record = Schema::new("Group")?;
        record
            .register_string("Name", &name)
            .register_aggregate("Entries", KvList(&entries));

        let mut groups = self.0.borrow_mut();
        groups.clear();
        let mut chain = record.connect(window);
        while chain.read_next()? {
            groups.push((name.borrow().clone(), entries.borrow().clone()));
        }
        Ok(())
    }
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_kv_list_round_trip() {
    let list = RefCell::new(pairs(&[("a", "1"), ("b&c", "<2>"), ("", "")]));
    let mut schema = Schema::new("Root").unwrap();
    schema.register_aggregate("Options", KvList(&list));

    let doc = schema.to_string().unwrap();
    assert_eq!(
        doc,
        "<Root><Options>\
         <Option><Key>a</Key><Value>1</Value></Option>\
         <Option><Key>b&amp;c</Key><Value>&lt;2&gt;</Value></Option>\
         <Option><Key></Key><Value></Value></Option>\
         </Options></Root>"
    );

    let expected = list.borrow().clone();
    list.borrow_mut().clear();
    schema.load_str(&doc).unwrap();
    assert_eq!(*list.borrow(), expected);
}

#[test]
fn test_empty_list_reads_no_records() {
    let list = RefCell::new(pairs(&[("stale", "x")]));
    let mut schema = Schema::new("Root").unwrap();
    schema.register_aggregate("Options", KvList(&list));

    schema.load_str("<Root><Options></Options></Root>").unwrap();
    assert!(list.borrow().is_empty());
}

#[test]
fn test_record_layout_in_pretty_output() {
    let list = RefCell::new(pairs(&[("a", "1"), ("b", "2")]));
    let mut schema = Schema::new("Root").unwrap();
    schema.start_block("Block").register_aggregate("Options", KvList(&list)).end_block();

    let options = WriteOptions::new().with_pretty(true).with_indent(2);
    assert_eq!(
        schema.to_string_with_options(&options).unwrap(),
        "<Root>\n\
         \x20 <Block>\n\
         \x20   <Options>\n\
         \x20     <Option>\n\
         \x20       <Key>a</Key>\n\
         \x20       <Value>1</Value>\n\
         \x20     </Option>\n\
         \x20     <Option>\n\
         \x20       <Key>b</Key>\n\
         \x20       <Value>2</Value>\n\
         \x20     </Option>\n\
         \x20   </Options>\n\
         \x20 </Block>\n\
         </Root>\n"
    );
}

#[test]
fn test_nested_chaining_round_trip() {
    let groups = RefCell::new(vec![
        ("net".to_string(), pairs(&[("host", "10.0.0.1"), ("port", "22")])),
        ("empty".to_string(), Vec::new()),
        ("ui".to_string(), pairs(&[("theme", "dark")])),
    ]);
    let mut schema = Schema::new("Profile").unwrap();
    schema.register_aggregate("Groups", Groups(&groups));

    let doc = schema.to_string_pretty().unwrap();
    let expected = groups.borrow().clone();
    groups.borrow_mut().clear();

    schema.load_str(&doc).unwrap();
    assert_eq!(*groups.borrow(), expected);
}

#[test]
fn test_records_tolerate_unknown_content() {
    let list = RefCell::new(Vec::new());
    let mut schema = Schema::new("Root").unwrap();
    schema.register_aggregate("Options", KvList(&list));

    schema
        .load_str(
            "<Root><Options>\
             <Comment>ignored</Comment>\
             <Option><Extra><Key>no</Key></Extra><Value>1</Value><Key>k1</Key></Option>\
             <!-- between -->\
             <Option><Key>k2</Key></Option>\
             </Options></Root>",
        )
        .unwrap();

    // The second record has no Value, so the bound value keeps the first record's.
    assert_eq!(*list.borrow(), pairs(&[("k1", "1"), ("k2", "1")]));
}

#[test]
fn test_malformed_record_fails_the_load() {
    let list = RefCell::new(Vec::new());
    let mut schema = Schema::new("Root").unwrap();
    schema.register_aggregate("Options", KvList(&list));

    let err = schema
        .load_str("<Root><Options><Option><Key>k</Value></Option></Options></Root>")
        .unwrap_err();
    assert!(matches!(err, Error::MismatchedTag { .. }));
}

#[test]
fn test_custom_aggregate_with_lookups() {
    struct Window<'a>(&'a RefCell<(i32, i32, i32, i32)>);

    impl Aggregate for Window<'_> {
        fn write(&self, out: &mut Emitter<'_>) -> Result<()> {
            let (x, y, w, h) = *self.0.borrow();
            out.write_data_element("X", &x.to_string())?;
            out.write_data_element("Y", &y.to_string())?;
            out.open_block("Size")?;
            out.write_data_element("W", &w.to_string())?;
            out.write_data_element("H", &h.to_string())?;
            out.close_block("Size")
        }

        fn read(&self, window: &mut DataWindow<'_>) -> Result<()> {
            let number = |text: Option<String>| -> Result<i32> {
                text.ok_or_else(|| Error::custom("missing coordinate"))?
                    .parse::<i32>()
                    .map_err(Error::custom)
            };
            let y = number(window.read_data("Y")?)?;
            let x = number(window.read_data("X")?)?;

            let size = window.read_data("Size")?.unwrap_or_default();
            let w = RefCell::new(0i32);
            let h = RefCell::new(0i32);
            let mut inner = Schema::new("Size")?;
            inner.register_int("W", &w).register_int("H", &h);
            inner.load_str(&format!("<Size>{size}</Size>"))?;

            *self.0.borrow_mut() = (x, y, *w.borrow(), *h.borrow());
            Ok(())
        }
    }

    let geometry = RefCell::new((10, -20, 640, 480));
    let mut schema = Schema::new("Ui").unwrap();
    schema.register_aggregate("Window", Window(&geometry));

    let doc = schema.to_string().unwrap();
    assert_eq!(
        doc,
        "<Ui><Window><X>10</X><Y>-20</Y><Size><W>640</W><H>480</H></Size></Window></Ui>"
    );

    *geometry.borrow_mut() = (0, 0, 0, 0);
    schema.load_str(&doc).unwrap();
    assert_eq!(*geometry.borrow(), (10, -20, 640, 480));

    let err = schema.load_str("<Ui><Window><Y>1</Y></Window></Ui>").unwrap_err();
    assert!(matches!(err, Error::Custom(_)));
}
