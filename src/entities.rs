//! Character-reference decoding: named references against the static
//! HTML5 table, numeric references by codepoint.

mod table;

use crate::error::{ParseError, SlotmlResult};

/// Look up a named reference (without `&` and `;`). Unknown names are not an
/// error anywhere in the grammar; callers re-emit the literal `&name;`.
pub fn lookup_named(name: &str) -> Option<&'static str> {
    table::NAMED_REFERENCES
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|i| table::NAMED_REFERENCES[i].1)
}

/// Decode the digits of a numeric reference (`&#NNN;` or `&#xHHH;`, digits
/// only, without the `&#`/`;` framing). Malformed digits and non-scalar
/// codepoints are parse failures.
pub fn decode_numeric(digits: &str, hex: bool) -> SlotmlResult<char> {
    let radix = if hex { 16 } else { 10 };
    if digits.is_empty() {
        return Err(ParseError::BadNumericReference {
            digits: digits.to_string(),
            reason: "no digits".to_string(),
        });
    }
    let codepoint =
        u32::from_str_radix(digits, radix).map_err(|_| ParseError::BadNumericReference {
            digits: digits.to_string(),
            reason: format!("not a valid base-{} number", radix),
        })?;
    char::from_u32(codepoint).ok_or_else(|| ParseError::BadNumericReference {
        digits: digits.to_string(),
        reason: format!("U+{:X} is not a valid character", codepoint),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup_hits_common_references() {
        assert_eq!(lookup_named("amp"), Some("&"));
        assert_eq!(lookup_named("lt"), Some("<"));
        assert_eq!(lookup_named("nbsp"), Some("\u{a0}"));
        assert_eq!(lookup_named("rarr"), Some("\u{2192}"));
    }

    #[test]
    fn named_lookup_misses_unknown_names() {
        assert_eq!(lookup_named("zzzzz"), None);
        assert_eq!(lookup_named(""), None);
    }

    #[test]
    fn numeric_decimal_and_hex_decode() {
        assert_eq!(decode_numeric("65", false).unwrap(), 'A');
        assert_eq!(decode_numeric("41", true).unwrap(), 'A');
        assert_eq!(decode_numeric("1F600", true).unwrap(), '\u{1F600}');
    }

    #[test]
    fn numeric_rejects_malformed_digits() {
        assert!(decode_numeric("", false).is_err());
        assert!(decode_numeric("12x", false).is_err());
        assert!(decode_numeric("zz", true).is_err());
        // surrogate range is not a scalar value
        assert!(decode_numeric("D800", true).is_err());
    }
}
