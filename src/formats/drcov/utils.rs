//! Utility functions for drcov text fields

use std::str::FromStr;

/// Split a `Key: value` line, returning the value if the key matches.
pub fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = line.split_once(':')?;
    (name.trim() == key).then(|| value.trim())
}

/// Parse a hexadecimal field, with or without a `0x` prefix.
pub fn parse_hex<T: HexInt>(field: &str) -> Option<T> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    T::from_hex(digits)
}

/// Parse an unsigned decimal field. Signs and separators are rejected.
pub fn parse_dec<T: FromStr>(field: &str) -> Option<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Integer types that can be parsed from hex digits.
pub trait HexInt: Sized {
    fn from_hex(digits: &str) -> Option<Self>;
}

macro_rules! impl_hex_int {
    ($($t:ty),*) => {
        $(impl HexInt for $t {
            fn from_hex(digits: &str) -> Option<Self> {
                <$t>::from_str_radix(digits, 16).ok()
            }
        })*
    };
}

impl_hex_int!(u16, u32, u64);

/// Final component of a path, accepting both `/` and `\` separators.
pub fn basename(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Remove one pair of matching surrounding quotes.
pub fn strip_quotes(name: &str) -> &str {
    for quote in ['\'', '"'] {
        if name.len() >= 2 && name.starts_with(quote) && name.ends_with(quote) {
            return &name[1..name.len() - 1];
        }
    }
    name
}

/// Derive the display filename recorded on a module.
///
/// Quotes may wrap either the whole path or just the final component.
pub fn module_filename(path: &str) -> String {
    strip_quotes(basename(strip_quotes(path))).to_string()
}
