//! Property-based tests: saving then loading through the same schema restores
//! every bound value, and no input makes the reader panic.

use proptest::prelude::*;
use std::cell::RefCell;
use tagcfg::escape::{escape, unescape};
use tagcfg::{FloatFormat, Schema};

proptest! {
    #[test]
    fn prop_escape_is_reversible(raw in proptest::collection::vec(any::<u8>(), 0..256)) {
        let escaped = escape(&raw);
        prop_assert!(escaped.bytes().all(|b| (0x20..=0x7E).contains(&b)));
        prop_assert!(!escaped.contains('<') && !escaped.contains('>'));
        prop_assert_eq!(unescape(escaped.as_bytes()), raw);
    }

    #[test]
    fn prop_string_round_trip(text in any::<String>()) {
        let value = RefCell::new(text.clone());
        let mut schema = Schema::new("Root").unwrap();
        schema.register_string("Text", &value);

        let doc = schema.to_string().unwrap();
        value.borrow_mut().clear();
        schema.load_str(&doc).unwrap();
        prop_assert_eq!(&*value.borrow(), &text);
    }

    #[test]
    fn prop_integers_round_trip(a in any::<i64>(), b in any::<u64>(), c in any::<i16>(), d in any::<usize>()) {
        let (va, vb, vc, vd) = (RefCell::new(a), RefCell::new(b), RefCell::new(c), RefCell::new(d));
        let (ha, hc) = (RefCell::new(a), RefCell::new(c));
        let mut schema = Schema::new("Root").unwrap();
        schema
            .register_int("A", &va)
            .register_int("B", &vb)
            .register_int("C", &vc)
            .register_int("D", &vd)
            .start_block("Hex")
            .register_hex("A", &ha)
            .register_hex("C", &hc)
            .end_block();

        let doc = schema.to_string_pretty().unwrap();
        *va.borrow_mut() = 0;
        *vb.borrow_mut() = 0;
        *vc.borrow_mut() = 0;
        *vd.borrow_mut() = 0;
        *ha.borrow_mut() = 0;
        *hc.borrow_mut() = 0;
        schema.load_str(&doc).unwrap();

        prop_assert_eq!(*va.borrow(), a);
        prop_assert_eq!(*vb.borrow(), b);
        prop_assert_eq!(*vc.borrow(), c);
        prop_assert_eq!(*vd.borrow(), d);
        prop_assert_eq!(*ha.borrow(), a);
        prop_assert_eq!(*hc.borrow(), c);
    }

    #[test]
    fn prop_float_round_trip(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let value = RefCell::new(f);
        let mut schema = Schema::new("Root").unwrap();
        schema.register_float("F", &value, FloatFormat::Display);

        let doc = schema.to_string().unwrap();
        *value.borrow_mut() = f64::NAN;
        schema.load_str(&doc).unwrap();
        prop_assert_eq!(value.borrow().to_bits(), f.to_bits());
    }

    #[test]
    fn prop_lists_round_trip(
        words in proptest::collection::vec(any::<String>(), 0..8),
        numbers in proptest::collection::vec(any::<i32>(), 0..8),
    ) {
        let w = RefCell::new(words.clone());
        let n = RefCell::new(numbers.clone());
        let mut schema = Schema::new("Root").unwrap();
        schema.register_string_list("Words", &w).register_int_list("Numbers", &n);

        let doc = schema.to_string().unwrap();
        w.borrow_mut().clear();
        n.borrow_mut().clear();
        schema.load_str(&doc).unwrap();

        prop_assert_eq!(&*w.borrow(), &words);
        prop_assert_eq!(&*n.borrow(), &numbers);
    }

    #[test]
    fn prop_bool_round_trip(b in any::<bool>()) {
        let value = RefCell::new(b);
        let mut schema = Schema::new("Root").unwrap();
        schema.register_bool("B", &value);

        let doc = schema.to_string().unwrap();
        *value.borrow_mut() = !b;
        schema.load_str(&doc).unwrap();
        prop_assert_eq!(*value.borrow(), b);
    }

    #[test]
    fn prop_reader_never_panics(doc in proptest::collection::vec(any::<u8>(), 0..512)) {
        let text = RefCell::new(String::new());
        let list = RefCell::new(Vec::<String>::new());
        let mut schema = Schema::new("Root").unwrap();
        schema
            .register_string("Text", &text)
            .start_block("Sub")
            .register_string_list("List", &list)
            .end_block();
        let _ = schema.load_slice(&doc);
    }

    #[test]
    fn prop_reader_never_panics_on_markup(doc in "(<(/)?(Root|Sub|List|Data|Text|X)>|<!--|-->|<\\?x\\?>|[a-z&;#]{0,3}){0,40}") {
        let text = RefCell::new(String::new());
        let list = RefCell::new(Vec::<String>::new());
        let mut schema = Schema::new("Root").unwrap();
        schema
            .register_string("Text", &text)
            .start_block("Sub")
            .register_string_list("List", &list)
            .end_block();
        let _ = schema.load_str(&doc);
    }
}
