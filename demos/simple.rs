//! Saving and loading an application settings file.
//!
//! Run with: cargo run --example simple

use std::cell::RefCell;
use std::error::Error;
use tagcfg::{FloatFormat, Schema};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Theme {
    Light,
    Dark,
}

const THEMES: &[(Theme, &str)] = &[(Theme::Light, "Light"), (Theme::Dark, "Dark")];

fn main() -> Result<(), Box<dyn Error>> {
    let title = RefCell::new("Serial Monitor & Logger".to_string());
    let width = RefCell::new(1024u32);
    let height = RefCell::new(768u32);
    let zoom = RefCell::new(1.25f64);
    let theme = RefCell::new(Theme::Dark);
    let background = RefCell::new(0xFF20_2020u32);
    let recent = RefCell::new(vec!["/dev/ttyUSB0".to_string(), "/dev/ttyACM1".to_string()]);

    let mut schema = Schema::new("Settings")?;
    schema
        .register_string("Title", &title)
        .register_enum("Theme", &theme, Theme::Light, THEMES)
        .start_block("Window")
        .register_int("Width", &width)
        .register_int("Height", &height)
        .register_float("Zoom", &zoom, FloatFormat::Fixed(2))
        .register_hex("Background", &background)
        .end_block()
        .register_string_list("RecentPorts", &recent);
    schema.check()?;

    let path = std::env::temp_dir().join("tagcfg-simple.xml");
    schema.save_file(&path)?;
    println!("Saved {}:\n{}", path.display(), std::fs::read_to_string(&path)?);

    // Forget everything, then load it back
    title.borrow_mut().clear();
    *width.borrow_mut() = 0;
    *theme.borrow_mut() = Theme::Light;
    recent.borrow_mut().clear();

    schema.load_file(&path)?;
    assert_eq!(*title.borrow(), "Serial Monitor & Logger");
    assert_eq!(*width.borrow(), 1024);
    assert_eq!(*theme.borrow(), Theme::Dark);
    assert_eq!(recent.borrow().len(), 2);
    println!("✓ Round-trip successful");

    std::fs::remove_file(&path)?;
    Ok(())
}
