//! Built-in bindings for common field types.
//!
//! | Registration | Field type | Saved as |
//! |--------------|------------|----------|
//! | [`Schema::register_string`] | `String` | verbatim text |
//! | [`Schema::register_int`] | any [`Integer`] | decimal |
//! | [`Schema::register_hex`] | any [`Integer`] | at least 8 upper-case hex digits |
//! | [`Schema::register_bool`] | `bool` | `True` / `False` |
//! | [`Schema::register_buffer`] | `[u8; N]` | raw bytes up to the first NUL |
//! | [`Schema::register_float`] | `f64` | per [`FloatFormat`] |
//! | [`Schema::register_string_list`] | `Vec<String>` | one `<Data>` element per entry |
//! | [`Schema::register_int_list`] | `Vec<T: Integer>` | one `<Data>` element per entry |
//! | [`Schema::register_enum`] | any `Copy + PartialEq` | name from a value/name table |
//!
//! Loading is lenient. Malformed integers keep only their leading digits and a
//! float that does not parse is left unchanged. Unknown enumeration names select
//! the default value; anything but `TRUE` (in any case) loads as `false`. None of
//! these abort the document.

use crate::binding::{Aggregate, Binding, Scalar};
use crate::de::DataWindow;
use crate::schema::Schema;
use crate::ser::Emitter;
use crate::Result;
use log::debug;
use std::cell::RefCell;

/// Tag used for each entry of the built-in list bindings.
pub const LIST_ITEM_TAG: &str = "Data";

/// Text emitted for an enumeration whose value and default are both missing from its table.
pub const UNKNOWN_ENUM_NAME: &str = "Unknown";

/// Integer types usable with [`Schema::register_int`] and [`Schema::register_hex`].
pub trait Integer: Copy {
    fn to_decimal(self) -> String;

    /// Zero-padded (at least 8 digits) upper-case hex of the unsigned bit pattern.
    fn to_hex(self) -> String;

    /// Parses a leading decimal number; trailing garbage is ignored, no digits gives 0.
    fn from_decimal(text: &str) -> Self;

    /// Parses a leading hex number, with or without `0x`; no digits gives 0.
    fn from_hex(text: &str) -> Self;
}

macro_rules! impl_integer {
    ($($t:ty => $u:ty),* $(,)?) => {
        $(
            impl Integer for $t {
                fn to_decimal(self) -> String {
                    self.to_string()
                }

                fn to_hex(self) -> String {
                    format!("{:08X}", self as $u)
                }

                fn from_decimal(text: &str) -> Self {
                    leading_decimal(text) as $t
                }

                fn from_hex(text: &str) -> Self {
                    leading_hex(text) as $u as $t
                }
            }
        )*
    };
}

impl_integer!(
    i16 => u16,
    u16 => u16,
    i32 => u32,
    u32 => u32,
    i64 => u64,
    u64 => u64,
    isize => usize,
    usize => usize,
);

// Reads the leading digits only; wraps on overflow.
fn leading_decimal(text: &str) -> i128 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i128, |acc, b| {
            acc.wrapping_mul(10).wrapping_add(i128::from(b - b'0'))
        });
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

fn leading_hex(text: &str) -> u128 {
    let text = text.trim_start();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    digits
        .chars()
        .map_while(|c| c.to_digit(16))
        .fold(0u128, |acc, d| acc.wrapping_mul(16).wrapping_add(u128::from(d)))
}

/// Output format for [`Schema::register_float`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloatFormat {
    /// Shortest text that reads back to the same value.
    #[default]
    Display,
    /// Fixed number of digits after the decimal point.
    Fixed(usize),
    /// Scientific notation with a fixed mantissa precision.
    Scientific(usize),
}

impl FloatFormat {
    /// Formats `value` according to this format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tagcfg::FloatFormat;
    ///
    /// assert_eq!(FloatFormat::Display.format(0.5), "0.5");
    /// assert_eq!(FloatFormat::Fixed(3).format(2.0), "2.000");
    /// assert_eq!(FloatFormat::Scientific(2).format(1500.0), "1.50e3");
    /// ```
    #[must_use]
    pub fn format(self, value: f64) -> String {
        match self {
            FloatFormat::Display => value.to_string(),
            FloatFormat::Fixed(precision) => format!("{:.*}", precision, value),
            FloatFormat::Scientific(precision) => format!("{:.*e}", precision, value),
        }
    }
}

struct TextBinding<'a>(&'a RefCell<String>);

impl Scalar for TextBinding<'_> {
    fn to_text(&self) -> String {
        self.0.borrow().clone()
    }

    fn from_text(&self, text: &str) -> Result<()> {
        let mut value = self.0.borrow_mut();
        value.clear();
        value.push_str(text);
        Ok(())
    }
}

struct IntBinding<'a, T> {
    value: &'a RefCell<T>,
    hex: bool,
}

impl<T: Integer> Scalar for IntBinding<'_, T> {
    fn to_text(&self) -> String {
        let value = *self.value.borrow();
        if self.hex {
            value.to_hex()
        } else {
            value.to_decimal()
        }
    }

    fn from_text(&self, text: &str) -> Result<()> {
        if self.hex {
            *self.value.borrow_mut() = T::from_hex(text);
        } else {
            *self.value.borrow_mut() = T::from_decimal(text);
        }
        Ok(())
    }
}

struct BoolBinding<'a>(&'a RefCell<bool>);

impl Scalar for BoolBinding<'_> {
    fn to_text(&self) -> String {
        let text = if *self.0.borrow() { "True" } else { "False" };
        text.to_string()
    }

    fn from_text(&self, text: &str) -> Result<()> {
        *self.0.borrow_mut() = text.eq_ignore_ascii_case("TRUE");
        Ok(())
    }
}

struct BufferBinding<'a, const N: usize>(&'a RefCell<[u8; N]>);

impl<const N: usize> Scalar for BufferBinding<'_, N> {
    fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }

    fn from_text(&self, text: &str) -> Result<()> {
        self.from_bytes(text.as_bytes())
    }

    fn to_bytes(&self) -> Vec<u8> {
        let buffer = self.0.borrow();
        let len = buffer.iter().position(|&b| b == 0).unwrap_or(N);
        buffer[..len].to_vec()
    }

    fn from_bytes(&self, raw: &[u8]) -> Result<()> {
        let mut buffer = self.0.borrow_mut();
        let len = raw.len().min(N);
        if len < raw.len() {
            debug!("Truncating {} bytes to buffer of {}", raw.len(), N);
        }
        buffer[..len].copy_from_slice(&raw[..len]);
        buffer[len..].fill(0);
        Ok(())
    }
}

struct FloatBinding<'a> {
    value: &'a RefCell<f64>,
    format: FloatFormat,
}

impl Scalar for FloatBinding<'_> {
    fn to_text(&self) -> String {
        self.format.format(*self.value.borrow())
    }

    fn from_text(&self, text: &str) -> Result<()> {
        match text.trim().parse::<f64>() {
            Ok(value) => *self.value.borrow_mut() = value,
            Err(_) => debug!("Ignoring unparsable float {:?}", text),
        }
        Ok(())
    }
}

struct EnumBinding<'a, T> {
    value: &'a RefCell<T>,
    default: T,
    table: &'a [(T, &'a str)],
}

impl<T: Copy + PartialEq> Scalar for EnumBinding<'_, T> {
    fn to_text(&self) -> String {
        let value = *self.value.borrow();
        let lookup = |wanted: T| {
            self.table
                .iter()
                .find(|(v, _)| *v == wanted)
                .map(|(_, name)| *name)
        };
        match lookup(value) {
            Some(name) => name.to_string(),
            None => {
                debug!("Enumeration value missing from table, saving default");
                lookup(self.default).unwrap_or(UNKNOWN_ENUM_NAME).to_string()
            }
        }
    }

    fn from_text(&self, text: &str) -> Result<()> {
        let found = self
            .table
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(text))
            .map(|(v, _)| *v);
        if found.is_none() {
            debug!("Unknown enumeration name {:?}, loading default", text);
        }
        *self.value.borrow_mut() = found.unwrap_or(self.default);
        Ok(())
    }
}

struct StringListBinding<'a>(&'a RefCell<Vec<String>>);

impl Aggregate for StringListBinding<'_> {
    fn write(&self, out: &mut Emitter<'_>) -> Result<()> {
        for entry in self.0.borrow().iter() {
            out.write_data_element(LIST_ITEM_TAG, entry)?;
        }
        Ok(())
    }

    fn read(&self, window: &mut DataWindow<'_>) -> Result<()> {
        let mut list = self.0.borrow_mut();
        list.clear();
        while let Some(entry) = window.read_next_data(LIST_ITEM_TAG)? {
            list.push(entry);
        }
        Ok(())
    }
}

struct IntListBinding<'a, T>(&'a RefCell<Vec<T>>);

impl<T: Integer> Aggregate for IntListBinding<'_, T> {
    fn write(&self, out: &mut Emitter<'_>) -> Result<()> {
        for entry in self.0.borrow().iter() {
            out.write_data_element(LIST_ITEM_TAG, &entry.to_decimal())?;
        }
        Ok(())
    }

    fn read(&self, window: &mut DataWindow<'_>) -> Result<()> {
        let mut list = self.0.borrow_mut();
        list.clear();
        while let Some(entry) = window.read_next_data(LIST_ITEM_TAG)? {
            list.push(T::from_decimal(&entry));
        }
        Ok(())
    }
}

impl<'a> Schema<'a> {
    /// Binds a `String` field, saved and loaded verbatim.
    pub fn register_string(&mut self, name: &str, value: &'a RefCell<String>) -> &mut Self {
        self.register(name, Binding::scalar(TextBinding(value)))
    }

    /// Binds an integer field, saved in decimal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use tagcfg::Schema;
    ///
    /// let count = RefCell::new(-5i32);
    /// let mut schema = Schema::new("Root").unwrap();
    /// schema.register_int("Count", &count);
    /// assert_eq!(schema.to_string().unwrap(), "<Root><Count>-5</Count></Root>");
    /// ```
    pub fn register_int<T: Integer + 'a>(&mut self, name: &str, value: &'a RefCell<T>) -> &mut Self {
        self.register(name, Binding::scalar(IntBinding { value, hex: false }))
    }

    /// Binds an integer field, saved as zero-padded hex of its unsigned bit pattern.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use tagcfg::Schema;
    ///
    /// let mask = RefCell::new(-1i32);
    /// let mut schema = Schema::new("Root").unwrap();
    /// schema.register_hex("Mask", &mask);
    /// assert_eq!(schema.to_string().unwrap(), "<Root><Mask>FFFFFFFF</Mask></Root>");
    /// ```
    pub fn register_hex<T: Integer + 'a>(&mut self, name: &str, value: &'a RefCell<T>) -> &mut Self {
        self.register(name, Binding::scalar(IntBinding { value, hex: true }))
    }

    /// Binds a `bool` field, saved as `True` or `False`.
    pub fn register_bool(&mut self, name: &str, value: &'a RefCell<bool>) -> &mut Self {
        self.register(name, Binding::scalar(BoolBinding(value)))
    }

    /// Binds a fixed-size, NUL-padded byte buffer.
    ///
    /// Saving writes the bytes before the first NUL. Loading copies at most `N`
    /// bytes and fills the rest of the buffer with NUL. The bytes need not be
    /// UTF-8; each one survives a save and load unchanged.
    pub fn register_buffer<const N: usize>(
        &mut self,
        name: &str,
        value: &'a RefCell<[u8; N]>,
    ) -> &mut Self {
        self.register(name, Binding::scalar(BufferBinding(value)))
    }

    /// Binds an `f64` field written with `format`.
    pub fn register_float(
        &mut self,
        name: &str,
        value: &'a RefCell<f64>,
        format: FloatFormat,
    ) -> &mut Self {
        self.register(name, Binding::scalar(FloatBinding { value, format }))
    }

    /// Binds a list of strings, one `<Data>` element per entry.
    pub fn register_string_list(
        &mut self,
        name: &str,
        value: &'a RefCell<Vec<String>>,
    ) -> &mut Self {
        self.register(name, Binding::aggregate(StringListBinding(value)))
    }

    /// Binds a list of integers, one decimal `<Data>` element per entry.
    pub fn register_int_list<T: Integer + 'a>(
        &mut self,
        name: &str,
        value: &'a RefCell<Vec<T>>,
    ) -> &mut Self {
        self.register(name, Binding::aggregate(IntListBinding(value)))
    }

    /// Binds a closed enumeration through a value/name table.
    ///
    /// Names are matched case-insensitively on load; a name missing from the table
    /// loads `default`. A value missing from the table saves the name of `default`,
    /// or `Unknown` if `default` is missing too.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::RefCell;
    /// use tagcfg::Schema;
    ///
    /// #[derive(Clone, Copy, Debug, PartialEq)]
    /// enum Parity { None, Odd, Even }
    ///
    /// const PARITY: &[(Parity, &str)] = &[
    ///     (Parity::None, "None"),
    ///     (Parity::Odd, "Odd"),
    ///     (Parity::Even, "Even"),
    /// ];
    ///
    /// let parity = RefCell::new(Parity::Odd);
    /// let mut schema = Schema::new("Port").unwrap();
    /// schema.register_enum("Parity", &parity, Parity::None, PARITY);
    ///
    /// schema.load_str("<Port><Parity>even</Parity></Port>").unwrap();
    /// assert_eq!(*parity.borrow(), Parity::Even);
    ///
    /// schema.load_str("<Port><Parity>Mark</Parity></Port>").unwrap();
    /// assert_eq!(*parity.borrow(), Parity::None);
    /// ```
    pub fn register_enum<T: Copy + PartialEq + 'a>(
        &mut self,
        name: &str,
        value: &'a RefCell<T>,
        default: T,
        table: &'a [(T, &'a str)],
    ) -> &mut Self {
        self.register(
            name,
            Binding::scalar(EnumBinding {
                value,
                default,
                table,
            }),
        )
    }
}
