//! Writing your own `Scalar` and `Aggregate` bindings.
//!
//! Run with: cargo run --example custom_binding

use std::cell::RefCell;
use std::error::Error;
use std::net::Ipv4Addr;
use tagcfg::{Aggregate, DataWindow, Emitter, Scalar, Schema};

/// An address stored as dotted text.
struct Address<'a>(&'a RefCell<Ipv4Addr>);

impl Scalar for Address<'_> {
    fn to_text(&self) -> String {
        self.0.borrow().to_string()
    }

    fn from_text(&self, text: &str) -> tagcfg::Result<()> {
        *self.0.borrow_mut() = text.trim().parse::<Ipv4Addr>().map_err(tagcfg::Error::custom)?;
        Ok(())
    }
}

/// A point stored as `<X>..</X><Y>..</Y>`, read in whatever order the file uses.
struct Point<'a>(&'a RefCell<(i32, i32)>);

impl Aggregate for Point<'_> {
    fn write(&self, out: &mut Emitter<'_>) -> tagcfg::Result<()> {
        let (x, y) = *self.0.borrow();
        out.write_data_element("X", &x.to_string())?;
        out.write_data_element("Y", &y.to_string())
    }

    fn read(&self, window: &mut DataWindow<'_>) -> tagcfg::Result<()> {
        let mut point = self.0.borrow_mut();
        while let Some((name, text)) = window.read_next_tag()? {
            let number = text.trim().parse::<i32>().map_err(tagcfg::Error::custom)?;
            match name.as_str() {
                "X" => point.0 = number,
                "Y" => point.1 = number,
                _ => {}
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let gateway = RefCell::new(Ipv4Addr::new(192, 168, 1, 1));
    let origin = RefCell::new((-40, 25));

    let mut schema = Schema::new("Network")?;
    schema
        .register_scalar("Gateway", Address(&gateway))
        .register_aggregate("Origin", Point(&origin));

    let doc = schema.to_string()?;
    println!("{}", doc);

    schema.load_str("<Network><Origin><Y>7</Y><X>3</X></Origin><Gateway>10.0.0.254</Gateway></Network>")?;
    assert_eq!(*gateway.borrow(), Ipv4Addr::new(10, 0, 0, 254));
    assert_eq!(*origin.borrow(), (3, 7));
    println!("✓ Custom bindings loaded");

    // Parse failures surface as errors
    let err = schema
        .load_str("<Network><Gateway>not an address</Gateway></Network>")
        .unwrap_err();
    println!("Rejected bad address: {}", err);

    Ok(())
}
