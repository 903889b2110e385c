//! Comment compression and the URL-style escaping around it.
//!
//! Comments travel as an explicit length followed by 4-character groups,
//! each group one buffer value in base 96 over the printable-ASCII table
//! (space through `~`, 95 symbols). Text is escaped JavaScript-`escape`
//! style before packing, so arbitrary Unicode survives the ASCII alphabet.

use crate::error::{FumenError, Result};

/// Symbols in the comment alphabet (space through `~`).
pub const TABLE_LENGTH: u32 = 95;

/// Radix used by the group arithmetic; one above the table length.
pub const CHAR_RADIX: u32 = 96;

/// Characters packed per buffer value.
pub const CHARS_PER_GROUP: usize = 4;

/// Buffer digits of the comment length field.
pub const LENGTH_WIDTH: usize = 2;

/// Buffer digits of one packed character group.
pub const GROUP_WIDTH: usize = 5;

/// Longest escaped comment the length field can carry.
pub const MAX_COMMENT_LENGTH: usize = 4095;

fn char_digit(c: char) -> Result<u32> {
    let value = c as u32;
    if (0x20..0x7f).contains(&value) {
        Ok(value - 0x20)
    } else {
        Err(FumenError::invalid_character(c, "comment"))
    }
}

/// Pack text into 4-character groups.
///
/// Returns the true character count alongside the group values; the last
/// group may be padded, and decode needs the count to trim it.
pub fn encode(text: &str) -> Result<(usize, Vec<u32>)> {
    let chars: Vec<char> = text.chars().collect();
    let mut values = Vec::with_capacity(chars.len().div_ceil(CHARS_PER_GROUP));
    for group in chars.chunks(CHARS_PER_GROUP) {
        let mut value = 0u32;
        for &c in group.iter().rev() {
            value = char_digit(c)? + value * CHAR_RADIX;
        }
        values.push(value);
    }
    Ok((chars.len(), values))
}

/// Unpack group values back into text, trimmed to `length` characters.
pub fn decode(values: &[u32], length: usize) -> Result<String> {
    let mut text = String::with_capacity(values.len() * CHARS_PER_GROUP);
    for &group in values {
        let mut group = group;
        for _ in 0..CHARS_PER_GROUP {
            let index = group % CHAR_RADIX;
            group /= CHAR_RADIX;
            if index >= TABLE_LENGTH {
                return Err(FumenError::invalid_comment_index(index));
            }
            // Index 0 is the space at 0x20.
            text.push(char::from_u32(index + 0x20).unwrap_or(' '));
        }
    }
    text.truncate(length);
    Ok(text)
}

fn is_escape_safe(unit: u16) -> bool {
    matches!(unit,
        0x30..=0x39 | 0x41..=0x5a | 0x61..=0x7a)
        || matches!(unit as u8 as char, '@' | '*' | '_' | '+' | '-' | '.' | '/')
            && unit < 0x80
}

/// JavaScript-`escape` over UTF-16 code units: safe characters pass
/// through, the rest become `%XX` or `%uXXXX`.
pub fn escape(text: &str) -> String {
    let mut out = String::new();
    for unit in text.encode_utf16() {
        if is_escape_safe(unit) {
            out.push(unit as u8 as char);
        } else if unit < 0x100 {
            out.push_str(&format!("%{unit:02X}"));
        } else {
            out.push_str(&format!("%u{unit:04X}"));
        }
    }
    out
}

/// Invert [`escape`]. Malformed escape sequences pass through untouched.
pub fn unescape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut units: Vec<u16> = Vec::with_capacity(chars.len());
    let mut i = 0;
    let hex4 = |s: &[char]| -> Option<u16> {
        let text: String = s.iter().collect();
        u16::from_str_radix(&text, 16).ok()
    };
    while i < chars.len() {
        if chars[i] == '%' && i + 5 < chars.len() && chars[i + 1] == 'u' {
            if let Some(unit) = hex4(&chars[i + 2..i + 6]) {
                units.push(unit);
                i += 6;
                continue;
            }
        }
        if chars[i] == '%' && i + 2 < chars.len() {
            if let Some(unit) = hex4(&chars[i + 1..i + 3]) {
                units.push(unit);
                i += 3;
                continue;
            }
        }
        let mut buf = [0u16; 2];
        units.extend_from_slice(chars[i].encode_utf16(&mut buf));
        i += 1;
    }
    String::from_utf16_lossy(&units)
}

/// Escape `text` and cap it at the wire's maximum comment length.
pub fn escape_capped(text: &str, max_len: usize) -> String {
    let mut escaped = escape(text);
    if escaped.len() > max_len {
        escaped.truncate(max_len);
    }
    escaped
}

/// Whether two comments are equal once escaped and capped.
pub fn escaped_eq(a: &str, b: &str, max_len: usize) -> bool {
    escape_capped(a, max_len) == escape_capped(b, max_len)
}
