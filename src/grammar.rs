//! Document dialect
//!
//! This module documents the structured-text dialect read and written by this
//! library. It is a strict subset of XML: enough to carry nested configuration
//! blocks, and nothing a configuration file does not need.
//!
//! # Grammar
//!
//! ```text
//! document := declaration? misc* element misc*
//! element  := "<" name ">" ( text | element | misc )* "</" name ">"
//! name     := [A-Za-z0-9_]+
//! misc     := comment | directive | whitespace
//! comment  := "<!--" any* "-->"
//! directive:= "<?" any* ">" | "<!" any* ">"
//! ```
//!
//! - No attributes, no self-closing tags, no namespaces, no CDATA.
//! - Comments do not nest. A comment may appear anywhere markup may, including
//!   inside elements that are skipped.
//! - Anything after the first whitespace inside a tag is ignored when reading.
//!
//! # Declaration
//!
//! Pretty output starts with:
//!
//! ```text
//! <?xml version="1.0" standalone="no" ?>
//! ```
//!
//! Compact output has no declaration unless
//! [`WriteOptions::with_declaration`](crate::WriteOptions::with_declaration) asks
//! for one. Readers skip any declaration.
//!
//! # Text escaping
//!
//! | Byte | Written as |
//! |------|------------|
//! | `&` | `&amp;` |
//! | `<` | `&lt;` |
//! | `>` | `&gt;` |
//! | any byte outside `0x20..=0x7E` | `&#N;` (decimal) |
//!
//! Tabs, newlines and every byte of a multi-byte UTF-8 character are therefore
//! written as numeric references. Readers also accept `&quot;`, `&apos;` and hex
//! references `&#xH;`; a reference above 255 is decoded as UTF-8. Anything
//! between a numeric reference's digits and the next `;` is dropped. An `&` that
//! starts none of these is kept literally.
//!
//! # Value encodings
//!
//! | Binding | Element content |
//! |---------|-----------------|
//! | text | the escaped string |
//! | integer | decimal, optional `-` |
//! | hex integer | eight or more upper-case hex digits, two's complement |
//! | bool | `True` / `False`; only `true` in any case reads as true |
//! | byte buffer | the raw bytes up to the first NUL, each kept exactly |
//! | float | [`FloatFormat`](crate::FloatFormat) rendering |
//! | enum | the name from the caller's table |
//! | list | one `<Data>` child per item |
//!
//! Integer readers take the leading numeric prefix and yield 0 when there is
//! none; a float that does not parse leaves the bound value unchanged.
//!
//! # Example
//!
//! ```text
//! <?xml version="1.0" standalone="no" ?>
//! <Settings>
//!     <Title>Bench &amp; Lab</Title>
//!     <Colour>FF00FF80</Colour>
//!     <Window>
//!         <Width>800</Width>
//!         <Maximised>False</Maximised>
//!     </Window>
//!     <Recent>
//!         <Data>/tmp/a.log</Data>
//!         <Data>/tmp/b.log</Data>
//!     </Recent>
//! </Settings>
//! ```
//!
//! # Reading rules
//!
//! - Elements are matched by name, so their order in the document is free.
//! - An element with no binding is skipped together with everything inside it.
//! - A field missing from the document leaves its bound value untouched.
//! - A close tag must name the element it closes; a mismatch is an error.
//! - Content after the root element's close tag is ignored.
