//! Shelfkey encoding for call numbers.
//!
//! A shelfkey is a string whose plain byte order reproduces shelving order.
//! Keys are built from a 38-character alphabet (space, period, digits and
//! uppercase letters, in ascending byte order) with these segments, separated
//! by single spaces:
//!
//! - class letters (`QA`)
//! - class number, integer part zero-padded to [`CLASS_NUMBER_WIDTH`] digits,
//!   followed by `.` and the decimal digits with trailing zeros removed
//!   (`0076.73`)
//! - each cutter as its letter plus digits right-padded with zeros to
//!   [`CUTTER_DIGIT_WIDTH`], then its work letter uppercased (`C150000A`)
//! - each suffix token: words uppercased, numbers zero-padded to
//!   [`SUFFIX_NUMBER_WIDTH`] (`002021`)
//!
//! The separator sorts below every other key character, so a shorter call
//! number shelves before any longer call number it prefixes.
//!
//! The reverse shelfkey maps every character to its mirror in the alphabet
//! and appends `~`, which sorts above the whole alphabet. Ascending reverse
//! keys therefore walk the shelf backwards, letting backward paging use the
//! same "greater than" comparison as forward paging.
//!
//! Changing any width constant invalidates previously indexed keys.

use crate::call_number::{LccParts, SuffixToken};
use std::fmt::Write as _;

/// Zero-padded width of the integer class number. LC class numbers do not
/// exceed four digits; longer numbers make a call number non-LC.
pub const CLASS_NUMBER_WIDTH: usize = 4;

/// Right-padded width of cutter digits.
pub const CUTTER_DIGIT_WIDTH: usize = 6;

/// Zero-padded width of numeric suffix tokens (years, volume numbers).
/// Longer numbers, leading zeros aside, make a call number non-LC.
pub const SUFFIX_NUMBER_WIDTH: usize = 6;

/// Every character a shelfkey may contain, in ascending byte order.
const ALPHABET: &[u8; 38] = b" .0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Terminator appended to reverse keys; sorts above the whole alphabet.
const REVERSE_TERMINATOR: char = '~';

/// A shelfkey and its reverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShelfKey {
    shelfkey: String,
    reverse: String,
    lcc: bool,
}

impl ShelfKey {
    fn from_key(shelfkey: String, lcc: bool) -> Self {
        let reverse = reverse(&shelfkey);
        ShelfKey {
            shelfkey,
            reverse,
            lcc,
        }
    }

    /// Build a key from the raw text of a call number that is not LC.
    ///
    /// Letters are uppercased, digit runs zero-padded and everything else
    /// treated as a separator, so non-LC call numbers still sort in a stable
    /// natural order.
    #[must_use]
    pub fn fallback(raw: &str) -> Self {
        let mut tokens: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut in_digits = false;
        for c in raw.chars() {
            if c.is_ascii_alphanumeric() {
                let is_digit = c.is_ascii_digit();
                if !current.is_empty() && is_digit != in_digits {
                    tokens.push(pad_fallback(&current, in_digits));
                    current.clear();
                }
                in_digits = is_digit;
                current.push(c.to_ascii_uppercase());
            } else if !current.is_empty() {
                tokens.push(pad_fallback(&current, in_digits));
                current.clear();
            }
        }
        if !current.is_empty() {
            tokens.push(pad_fallback(&current, in_digits));
        }
        Self::from_key(tokens.join(" "), false)
    }

    /// The forward key.
    #[must_use]
    pub fn shelfkey(&self) -> &str {
        &self.shelfkey
    }

    /// The reverse key.
    #[must_use]
    pub fn reverse_shelfkey(&self) -> &str {
        &self.reverse
    }

    /// Whether the key was encoded from LC parts rather than raw text.
    #[must_use]
    pub fn is_lcc(&self) -> bool {
        self.lcc
    }
}

fn pad_fallback(token: &str, digits: bool) -> String {
    if digits {
        format!("{token:0>SUFFIX_NUMBER_WIDTH$}")
    } else {
        token.to_string()
    }
}

/// Encode a raw call number.
///
/// Returns `None` when the call number cannot be tokenized into class,
/// number and cutter segments, or when a number is wider than its field;
/// callers then decide whether to fall back
/// to [`ShelfKey::fallback`] or treat the item as not browsable.
///
/// # Examples
///
/// ```
/// use vshelf::shelfkey::encode;
///
/// let a = encode("QA76.73 .C15 2021").unwrap();
/// let b = encode("QA76.8 .A1").unwrap();
/// assert!(a.shelfkey() < b.shelfkey());
/// assert!(a.reverse_shelfkey() > b.reverse_shelfkey());
/// assert!(encode("not a call number").is_none());
/// ```
#[must_use]
pub fn encode(raw: &str) -> Option<ShelfKey> {
    LccParts::parse(raw).as_ref().and_then(encode_parts)
}

/// Encode already tokenized LC parts.
#[must_use]
pub fn encode_parts(parts: &LccParts) -> Option<ShelfKey> {
    let mut key = parts.letters.clone();

    if let Some(integer) = &parts.integer {
        if integer.len() > CLASS_NUMBER_WIDTH {
            return None;
        }
        let _ = write!(key, " {integer:0>CLASS_NUMBER_WIDTH$}");
        if let Some(decimal) = parts.decimal.as_deref().map(trim_fraction) {
            if !decimal.is_empty() {
                key.push('.');
                key.push_str(decimal);
            }
        }
    }

    for cutter in &parts.cutters {
        let digits = trim_fraction(&cutter.digits);
        let _ = write!(key, " {}{digits:0<CUTTER_DIGIT_WIDTH$}", cutter.letter);
        if let Some(work) = cutter.work {
            key.push(work.to_ascii_uppercase());
        }
    }

    for token in &parts.suffix {
        match token {
            SuffixToken::Word(word) => {
                key.push(' ');
                key.extend(word.chars().filter(char::is_ascii_uppercase));
            },
            SuffixToken::Number(number) => {
                let number = number.trim_start_matches('0');
                if number.len() > SUFFIX_NUMBER_WIDTH {
                    return None;
                }
                let _ = write!(key, " {number:0>SUFFIX_NUMBER_WIDTH$}");
            },
        }
    }

    Some(ShelfKey::from_key(key, true))
}

/// Trailing zeros do not change a decimal fraction.
fn trim_fraction(digits: &str) -> &str {
    digits.trim_end_matches('0')
}

/// Compute the reverse of a shelfkey.
///
/// Characters outside the shelfkey alphabet map to the top of the alphabet.
#[must_use]
pub fn reverse(shelfkey: &str) -> String {
    let mut out = String::with_capacity(shelfkey.len() + 1);
    for b in shelfkey.bytes() {
        let mirrored = ALPHABET
            .iter()
            .position(|&a| a == b)
            .map_or(ALPHABET[0], |i| ALPHABET[ALPHABET.len() - 1 - i]);
        out.push(char::from(mirrored));
    }
    out.push(REVERSE_TERMINATOR);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> String {
        encode(raw).unwrap().shelfkey().to_string()
    }

    #[test]
    fn test_encode_layout() {
        assert_eq!(key("QA76.73.C15 S63 2021"), "QA 0076.73 C150000 S630000 002021");
        assert_eq!(key("PS3537.A426 Z9"), "PS 3537 A426000 Z900000");
        assert_eq!(key("QA"), "QA");
    }

    #[test]
    fn test_encode_shelving_order() {
        let ordered = [
            "Q",
            "Q1",
            "QA",
            "QA1",
            "QA9 .B2",
            "QA76",
            "QA76 .C15",
            "QA76.5",
            "QA76.73 .C15",
            "QA76.73 .C15 1999",
            "QA76.73 .C15 2021",
            "QA76.73 .C2",
            "QA760",
            "QB1",
            "R1",
        ];
        for pair in ordered.windows(2) {
            assert!(key(pair[0]) < key(pair[1]), "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_equivalent_call_numbers_share_key() {
        assert_eq!(key("QA76.50"), key("qa 76.5"));
        assert_eq!(key("QA76 .C1"), key("QA76.C10"));
    }

    #[test]
    fn test_volume_numbers_sort_numerically() {
        assert!(key("QA1 .A2 v.2") < key("QA1 .A2 v.10"));
    }

    #[test]
    fn test_work_letters_shelve_after_bare_cutter() {
        assert_eq!(key("QA76.73 .C15a"), "QA 0076.73 C150000A");
        let ordered = [
            "QA76.73 .C1",
            "QA76.73 .C15",
            "QA76.73 .C15 S63",
            "QA76.73 .C15a",
            "QA76.73 .C15b",
            "QA76.73 .C151",
            "QA76.73 .C2",
        ];
        for pair in ordered.windows(2) {
            assert!(key(pair[0]) < key(pair[1]), "{} !< {}", pair[0], pair[1]);
        }
        assert_eq!(key("QA76.73.C15S63"), key("QA76.73 .C15 S63"));
    }

    #[test]
    fn test_encode_rejects_oversized_class_number() {
        assert!(encode("QA12345").is_none());
        assert!(encode("").is_none());
    }

    #[test]
    fn test_encode_rejects_oversized_suffix_number() {
        assert!(encode("QA1 .A2 1234567").is_none());
        assert_eq!(key("QA1 .A2 0000002021"), key("QA1 .A2 2021"));
        assert_eq!(key("QA1 .A2 v.0"), "QA 0001 A200000 V 000000");

        let long = crate::CallNumber::new("QA1 .A2 1234567");
        assert!(!long.is_lcc());
    }

    #[test]
    fn test_reverse_inverts_order() {
        let a = encode("QA76").unwrap();
        let b = encode("QA76 .C15").unwrap();
        assert!(a.shelfkey() < b.shelfkey());
        assert!(a.reverse_shelfkey() > b.reverse_shelfkey());
        assert!(a.reverse_shelfkey().ends_with(REVERSE_TERMINATOR));
    }

    #[test]
    fn test_reverse_mirror() {
        assert_eq!(reverse(" "), "Z~");
        assert_eq!(reverse("Z"), " ~");
        assert_eq!(reverse("0"), "X~");
    }

    #[test]
    fn test_fallback_key() {
        let a = ShelfKey::fallback("Video disc 2");
        let b = ShelfKey::fallback("video  disc 10");
        assert!(!a.is_lcc());
        assert_eq!(a.shelfkey(), "VIDEO DISC 000002");
        assert!(a.shelfkey() < b.shelfkey());
        assert!(a.reverse_shelfkey() > b.reverse_shelfkey());
    }
}
