//! Call number tokenizing and normalization.
//!
//! Library of Congress call numbers have no fixed grammar, but almost all of
//! them follow the shape
//!
//! ```text
//! QA 76.73 .C15 S63 2021 v.2
//! ^^ ^^^^^ ^^^^^^^^ ^^^^^^^^
//! |  |     |        suffix (dates, volumes, copies)
//! |  |     cutters (letter + decimal digits, optional work letter)
//! |  class number (integer + optional decimal)
//! class letters (1-3)
//! ```
//!
//! [`CallNumber`] parses that shape with `nom` and keeps the raw string
//! alongside the normalized form and the shelfkeys derived from it.
//!
//! # Examples
//!
//! ```
//! use vshelf::call_number::CallNumber;
//!
//! let cn = CallNumber::new("qa76.73.c15 s63 2021");
//! assert!(cn.is_lcc());
//! assert_eq!(cn.normalized(), "QA76.73 .C15 S63 2021");
//! ```

use crate::shelfkey::{self, ShelfKey};
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1, satisfy, space0},
    branch::alt,
    combinator::{map, not, opt, peek, recognize},
    sequence::{pair, preceded, terminated},
    IResult,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Class letters never used as the first letter of an LC class.
const UNUSED_CLASS_LETTERS: [char; 5] = ['I', 'O', 'W', 'X', 'Y'];

/// A cutter segment: one letter followed by digits read as a decimal
/// fraction, optionally closed by a work letter (`C15a`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cutter {
    /// Uppercased cutter letter
    pub letter: char,
    /// Cutter digits, as written
    pub digits: String,
    /// Lowercased work letter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<char>,
}

impl fmt::Display for Cutter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.digits)?;
        if let Some(work) = self.work {
            write!(f, "{work}")?;
        }
        Ok(())
    }
}

/// A token of the trailing part of a call number (dates, volumes, copies).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuffixToken {
    /// A run of letters, uppercased
    Word(String),
    /// A run of digits
    Number(String),
}

/// The tokenized structure of an LC call number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LccParts {
    /// Class letters, uppercased (e.g. "QA")
    pub letters: String,
    /// Integer part of the class number, without leading zeros
    pub integer: Option<String>,
    /// Decimal part of the class number, as written
    pub decimal: Option<String>,
    /// Cutter segments in order
    pub cutters: SmallVec<[Cutter; 3]>,
    /// Tokens following the cutters
    pub suffix: Vec<SuffixToken>,
    /// Text following the cutters, whitespace-collapsed
    pub suffix_text: String,
}

impl LccParts {
    /// Parse a raw call number into its LC parts.
    ///
    /// Returns `None` when the string does not start with 1-3 class letters
    /// followed by a class number, when text follows bare class letters, or
    /// when a cutter runs into text that is neither a work letter nor
    /// another cutter (`.C15abc`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let input = raw.trim();
        let (rest, letters) = class_letters(input).ok()?;
        let first = letters.chars().next()?.to_ascii_uppercase();
        if UNUSED_CLASS_LETTERS.contains(&first) {
            return None;
        }
        let letters = letters.to_ascii_uppercase();

        let (rest, number) = opt(preceded(space0, class_number))(rest).ok()?;
        let Some((integer, decimal)) = number else {
            // Bare class letters ("QA") are valid range bounds.
            return rest.trim().is_empty().then(|| LccParts {
                letters,
                integer: None,
                decimal: None,
                cutters: SmallVec::new(),
                suffix: Vec::new(),
                suffix_text: String::new(),
            });
        };

        let mut cutters = SmallVec::new();
        let mut rest = rest;
        loop {
            match cutter(rest) {
                Ok((next, (letter, digits, work))) => {
                    cutters.push(Cutter {
                        letter: letter.to_ascii_uppercase(),
                        digits: digits.to_string(),
                        work: work.map(|c| c.to_ascii_lowercase()),
                    });
                    rest = next;
                },
                Err(_) if cutter_head(rest).is_ok() => return None,
                Err(_) => break,
            }
        }

        let trimmed = integer.trim_start_matches('0');
        Some(LccParts {
            letters,
            integer: Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string()),
            decimal: decimal.map(str::to_string),
            cutters,
            suffix: suffix_tokens(rest),
            suffix_text: rest.split_whitespace().collect::<Vec<_>>().join(" "),
        })
    }

    /// The class portion, letters and number fused (e.g. "QA76.73").
    #[must_use]
    pub fn class_part(&self) -> String {
        let mut out = self.letters.clone();
        if let Some(integer) = &self.integer {
            out.push_str(integer);
        }
        if let Some(decimal) = &self.decimal {
            out.push('.');
            out.push_str(decimal);
        }
        out
    }

    /// Display segments: the fused class part, each cutter, then each
    /// whitespace-separated suffix word. The first cutter carries its
    /// leading period.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        let mut segments = vec![self.class_part()];
        for (i, cutter) in self.cutters.iter().enumerate() {
            if i == 0 {
                segments.push(format!(".{cutter}"));
            } else {
                segments.push(cutter.to_string());
            }
        }
        segments.extend(self.suffix_text.split_whitespace().map(str::to_string));
        segments
    }
}

/// 1-3 letters not followed by another letter.
fn class_letters(input: &str) -> IResult<&str, &str> {
    let (rest, letters) = take_while_m_n(1, 3, |c: char| c.is_ascii_alphabetic())(input)?;
    let (rest, ()) = not(satisfy(|c: char| c.is_ascii_alphabetic()))(rest)?;
    Ok((rest, letters))
}

/// Integer part plus optional `.digits` decimal.
fn class_number(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    pair(digit1, opt(preceded(char('.'), digit1)))(input)
}

/// An optionally period-prefixed letter+digits group, then an optional
/// work letter, ending at a boundary or at the next run-together cutter.
fn cutter(input: &str) -> IResult<&str, (char, &str, Option<char>)> {
    let (rest, (letter, digits)) = cutter_head(input)?;
    let (rest, work) = opt(terminated(
        satisfy(|c: char| c.is_ascii_alphabetic()),
        cutter_end,
    ))(rest)?;
    let (rest, ()) = cutter_end(rest)?;
    Ok((rest, (letter, digits, work)))
}

fn cutter_head(input: &str) -> IResult<&str, (char, &str)> {
    let (rest, _) = recognize(pair(space0, opt(pair(char('.'), space0))))(input)?;
    pair(satisfy(|c: char| c.is_ascii_alphabetic()), digit1)(rest)
}

/// Zero-width: end of input, a non-alphanumeric character, or the letter
/// and digits of a following cutter (`C15S63`).
fn cutter_end(input: &str) -> IResult<&str, ()> {
    peek(alt((
        not(satisfy(|c: char| c.is_ascii_alphanumeric())),
        map(pair(satisfy(|c: char| c.is_ascii_alphabetic()), digit1), |_| ()),
    )))(input)
}

fn suffix_tokens(input: &str) -> Vec<SuffixToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for c in input.chars() {
        let is_digit = c.is_ascii_digit();
        if c.is_alphanumeric() {
            if !current.is_empty() && is_digit != in_digits {
                tokens.push(finish_token(&mut current, in_digits));
            }
            in_digits = is_digit;
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(finish_token(&mut current, in_digits));
        }
    }
    if !current.is_empty() {
        tokens.push(finish_token(&mut current, in_digits));
    }
    tokens
}

fn finish_token(current: &mut String, digits: bool) -> SuffixToken {
    let text = std::mem::take(current);
    if digits {
        SuffixToken::Number(text)
    } else {
        SuffixToken::Word(text.to_uppercase())
    }
}

/// A call number with its derived normalized form and shelfkeys.
///
/// Immutable once constructed. Call numbers that cannot be tokenized as LC
/// still get a shelfkey, built from the raw string so that they order after
/// a plain comparison of their uppercased text; [`CallNumber::is_lcc`]
/// reports which case applies.
///
/// Deserializing accepts either the raw string or a serialized
/// `CallNumber`; only `raw` is read and everything else is derived again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredCallNumber")]
pub struct CallNumber {
    raw: String,
    normalized: String,
    shelfkey: String,
    reverse_shelfkey: String,
    parts: Option<LccParts>,
}

impl CallNumber {
    /// Tokenize and encode a raw call number.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let parts = LccParts::parse(raw);
        let key = parts
            .as_ref()
            .and_then(shelfkey::encode_parts)
            .unwrap_or_else(|| ShelfKey::fallback(raw));
        let (parts, normalized) = match parts {
            Some(parts) if key.is_lcc() => {
                let normalized = parts.segments().join(" ");
                (Some(parts), normalized)
            },
            _ => (None, collapse_whitespace(raw)),
        };

        CallNumber {
            raw: raw.to_string(),
            normalized,
            shelfkey: key.shelfkey().to_string(),
            reverse_shelfkey: key.reverse_shelfkey().to_string(),
            parts,
        }
    }

    /// The call number as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized display form (uppercased class and cutters, single spaces).
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Sortable key; byte order matches shelving order.
    #[must_use]
    pub fn shelfkey(&self) -> &str {
        &self.shelfkey
    }

    /// Inverse key; byte order matches reverse shelving order.
    #[must_use]
    pub fn reverse_shelfkey(&self) -> &str {
        &self.reverse_shelfkey
    }

    /// Whether the call number was tokenized as LC.
    #[must_use]
    pub fn is_lcc(&self) -> bool {
        self.parts.is_some()
    }

    /// LC parts, if the call number was tokenized as LC.
    #[must_use]
    pub fn parts(&self) -> Option<&LccParts> {
        self.parts.as_ref()
    }

    /// Comparable display segments (see [`LccParts::segments`]); non-LC call
    /// numbers split on whitespace.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        match &self.parts {
            Some(parts) => parts.segments(),
            None => self
                .normalized
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCallNumber {
    Raw(String),
    Full { raw: String },
}

impl From<StoredCallNumber> for CallNumber {
    fn from(stored: StoredCallNumber) -> Self {
        match stored {
            StoredCallNumber::Raw(raw) | StoredCallNumber::Full { raw } => CallNumber::new(&raw),
        }
    }
}

impl fmt::Display for CallNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
