//! Escaping between raw bytes and the document's text alphabet.
//!
//! Element content is restricted to printable ASCII. On the way out:
//!
//! | Raw | Escaped |
//! |-----|---------|
//! | `&` | `&amp;` |
//! | `<` | `&lt;`  |
//! | `>` | `&gt;`  |
//! | any byte outside `0x20..=0x7E` | `&#N;` (decimal byte value) |
//!
//! Multi-byte UTF-8 characters are escaped byte by byte, so `unescape(escape(s))`
//! restores the exact input bytes.
//!
//! ## Examples
//!
//! ```rust
//! use tagcfg::escape::{escape, unescape};
//!
//! let escaped = escape(b"a<b & \x01");
//! assert_eq!(escaped, "a&lt;b &amp; &#1;");
//! assert_eq!(unescape(escaped.as_bytes()), b"a<b & \x01");
//! ```

/// Escapes `raw` into printable text.
#[must_use]
pub fn escape(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    escape_into(raw, &mut out);
    out
}

/// Escapes `raw` and appends the result to `out`.
pub fn escape_into(raw: &[u8], out: &mut String) {
    for &byte in raw {
        match byte {
            b'&' => out.push_str("&amp;"),
            b'<' => out.push_str("&lt;"),
            b'>' => out.push_str("&gt;"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                out.push_str("&#");
                out.push_str(&byte.to_string());
                out.push(';');
            }
        }
    }
}

/// Reverses [`escape`].
///
/// Named references `&amp;`, `&lt;`, `&gt;` (plus `&quot;` and `&apos;` for documents
/// produced by other tools) and numeric references `&#N;` / `&#xH;` are decoded.
/// Anything between a numeric reference's digits and the next `;` is discarded,
/// so `&#65abc;` decodes to `A`; with no `;` left the rest of the buffer goes.
/// Values above 255 are emitted as UTF-8. A `&#` with no digits, and anything
/// else that starts with `&`, is kept literally.
///
/// # Examples
///
/// ```rust
/// use tagcfg::escape::unescape;
///
/// assert_eq!(unescape(b"&lt;tag&gt;"), b"<tag>");
/// assert_eq!(unescape(b"x&#65"), b"xA");
/// assert_eq!(unescape(b"&#65abc;z"), b"Az");
/// assert_eq!(unescape(b"&unknown;"), b"&unknown;");
/// ```
#[must_use]
pub fn unescape(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;

    while i < text.len() {
        if text[i] != b'&' {
            out.push(text[i]);
            i += 1;
            continue;
        }

        let rest = &text[i..];
        if let Some(consumed) = named_reference(rest, &mut out) {
            i += consumed;
        } else if let Some(consumed) = numeric_reference(rest, &mut out) {
            i += consumed;
        } else {
            out.push(b'&');
            i += 1;
        }
    }

    out
}

/// Unescapes `text` into a `String`, replacing invalid UTF-8 with U+FFFD.
#[must_use]
pub fn unescape_to_string(text: &[u8]) -> String {
    match String::from_utf8(unescape(text)) {
        Ok(s) => s,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

fn named_reference(rest: &[u8], out: &mut Vec<u8>) -> Option<usize> {
    const NAMED: [(&[u8], u8); 5] = [
        (b"&amp;", b'&'),
        (b"&lt;", b'<'),
        (b"&gt;", b'>'),
        (b"&quot;", b'"'),
        (b"&apos;", b'\''),
    ];

    NAMED
        .iter()
        .find(|(reference, _)| rest.starts_with(reference))
        .map(|(reference, byte)| {
            out.push(*byte);
            reference.len()
        })
}

fn numeric_reference(rest: &[u8], out: &mut Vec<u8>) -> Option<usize> {
    let body = rest.strip_prefix(b"&#")?;
    let (radix, digits_at) = match body.first() {
        Some(b'x') | Some(b'X') => (16, 1),
        _ => (10, 0),
    };

    let digits = body[digits_at..]
        .iter()
        .take_while(|b| (**b as char).is_digit(radix))
        .count();
    if digits == 0 {
        return None;
    }

    let value = body[digits_at..digits_at + digits]
        .iter()
        .fold(0u32, |acc, b| {
            let digit = (*b as char).to_digit(radix).unwrap_or(0);
            acc.saturating_mul(radix).saturating_add(digit)
        });

    if let Ok(byte) = u8::try_from(value) {
        out.push(byte);
    } else {
        let ch = char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER);
        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    }

    let tail = 2 + digits_at + digits;
    let consumed = rest[tail..]
        .iter()
        .position(|&b| b == b';')
        .map_or(rest.len(), |semi| tail + semi + 1);
    Some(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup_characters() {
        assert_eq!(escape(b"A&B"), "A&amp;B");
        assert_eq!(escape(b"<x>"), "&lt;x&gt;");
    }

    #[test]
    fn test_escape_non_printable_bytes() {
        assert_eq!(escape(b"\n\t"), "&#10;&#9;");
        assert_eq!(escape(&[0x7F, 0xFF]), "&#127;&#255;");
        assert_eq!(escape("é".as_bytes()), "&#195;&#169;");
    }

    #[test]
    fn test_escape_leaves_printable_ascii() {
        let printable: Vec<u8> = (0x20..=0x7E)
            .filter(|b| !matches!(*b, b'&' | b'<' | b'>'))
            .collect();
        assert_eq!(escape(&printable).as_bytes(), printable.as_slice());
    }

    #[test]
    fn test_escape_round_trip() {
        let raw = b"a&b<c>d\x01e\x7Ff\xC3\xA9";
        assert_eq!(unescape(escape(raw).as_bytes()), raw.to_vec());
    }

    #[test]
    fn test_unescape_numeric_forms() {
        assert_eq!(unescape(b"&#65;&#x42;"), b"AB");
        assert_eq!(unescape(b"&#233;"), vec![233u8]);
        assert_eq!(unescape(b"&#8364;"), "€".as_bytes());
    }

    #[test]
    fn test_unescape_reference_at_end_of_buffer() {
        assert_eq!(unescape(b"abc&#10"), b"abc\n");
    }

    #[test]
    fn test_unescape_discards_junk_before_semicolon() {
        assert_eq!(unescape(b"&#65abc;d"), b"Ad");
        assert_eq!(unescape(b"&#x41zz;&#66"), b"AB");
        assert_eq!(unescape(b"&#67 tail"), b"C");
    }

    #[test]
    fn test_unescape_keeps_unknown_references() {
        assert_eq!(unescape(b"&nbsp; &# &"), b"&nbsp; &# &");
    }

    #[test]
    fn test_unescape_to_string_replaces_invalid_utf8() {
        assert_eq!(unescape_to_string(b"&#255;"), "\u{FFFD}");
        assert_eq!(unescape_to_string(b"&#195;&#169;"), "é");
    }
}
