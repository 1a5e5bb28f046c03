//! Call-number ranges of the LC Classification outline.
//!
//! Outline ranges are written as `QA1-QA939`, `QA76.75-QA76.765`, the
//! abbreviated `QA1-939` (upper bound inherits the lower bound's letters),
//! or bare class letters (`QA`, `Q`). Containment only considers the class
//! portion of a call number: letters, integer and decimal. Cutters never
//! affect which outline range a call number falls in.

use crate::call_number::LccParts;
use std::cmp::Ordering;
use std::fmt;

/// The class portion of a call number, ordered by shelving position.
///
/// Bare letters sort before any number under those letters, and decimals
/// compare as fractions (trailing zeros removed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassKey {
    letters: String,
    integer: Option<u32>,
    decimal: String,
}

impl ClassKey {
    /// Build the class key of a call number, if it tokenizes as LC.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        LccParts::parse(raw).and_then(|parts| Self::from_parts(&parts))
    }

    /// Build the class key of already tokenized parts.
    #[must_use]
    pub fn from_parts(parts: &LccParts) -> Option<Self> {
        let integer = match &parts.integer {
            Some(digits) => Some(digits.parse().ok()?),
            None => None,
        };
        Some(ClassKey {
            letters: parts.letters.clone(),
            integer,
            decimal: parts
                .decimal
                .as_deref()
                .unwrap_or("")
                .trim_end_matches('0')
                .to_string(),
        })
    }

    /// Class letters.
    #[must_use]
    pub fn letters(&self) -> &str {
        &self.letters
    }

    /// Whether the key has no class number (bare letters).
    #[must_use]
    pub fn is_letters(&self) -> bool {
        self.integer.is_none()
    }

    /// Truncate this key to the precision of `bound`: a letters-only bound
    /// keeps only as many letters, an integer bound drops the decimal, a
    /// decimal bound keeps as many decimal digits.
    fn truncated_to(&self, bound: &ClassKey) -> ClassKey {
        if bound.integer.is_none() {
            let letters: String = self.letters.chars().take(bound.letters.len()).collect();
            return ClassKey {
                letters,
                integer: None,
                decimal: String::new(),
            };
        }
        let decimal: String = self.decimal.chars().take(bound.decimal.len()).collect();
        ClassKey {
            letters: self.letters.clone(),
            integer: self.integer,
            decimal: decimal.trim_end_matches('0').to_string(),
        }
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters)?;
        if let Some(integer) = self.integer {
            write!(f, "{integer}")?;
            if !self.decimal.is_empty() {
                write!(f, ".{}", self.decimal)?;
            }
        }
        Ok(())
    }
}

/// An inclusive outline range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LccRange {
    lower: ClassKey,
    upper: ClassKey,
}

impl LccRange {
    /// Parse an outline range string.
    ///
    /// Returns `None` if either bound does not tokenize or the lower bound
    /// sorts after the upper bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use vshelf::lcc::{ClassKey, LccRange};
    ///
    /// let range = LccRange::parse("QA1-939").unwrap();
    /// assert!(range.contains(&ClassKey::parse("QA76.73 .C15").unwrap()));
    /// assert!(range.contains(&ClassKey::parse("QA939.5").unwrap()));
    /// assert!(!range.contains(&ClassKey::parse("QB1").unwrap()));
    /// ```
    #[must_use]
    pub fn parse(range: &str) -> Option<Self> {
        let range = range.trim();
        let (low, high) = match range.split_once('-') {
            Some((low, high)) => (low.trim(), high.trim()),
            None => (range, range),
        };

        let lower = ClassKey::parse(low)?;
        let upper = if high.starts_with(|c: char| c.is_ascii_digit()) {
            ClassKey::parse(&format!("{}{high}", lower.letters))?
        } else {
            ClassKey::parse(high)?
        };

        (lower.cmp_bound(&upper) != Ordering::Greater).then_some(LccRange { lower, upper })
    }

    /// A range covering exactly the given class letters and every number
    /// under them, but no longer letter combinations (`KF` excludes `KFA`).
    #[must_use]
    pub fn for_letters(letters: &str) -> Self {
        let letters = letters.trim().to_ascii_uppercase();
        LccRange {
            lower: ClassKey {
                letters: letters.clone(),
                integer: None,
                decimal: String::new(),
            },
            upper: ClassKey {
                letters,
                integer: Some(u32::MAX),
                decimal: String::new(),
            },
        }
    }

    /// Whether this range was built by [`LccRange::for_letters`].
    #[must_use]
    pub fn is_letters_only(&self) -> bool {
        self.upper.integer == Some(u32::MAX) && self.lower.integer.is_none()
    }

    /// Lower bound.
    #[must_use]
    pub fn lower(&self) -> &ClassKey {
        &self.lower
    }

    /// Upper bound.
    #[must_use]
    pub fn upper(&self) -> &ClassKey {
        &self.upper
    }

    /// Whether `key` falls within this range.
    #[must_use]
    pub fn contains(&self, key: &ClassKey) -> bool {
        *key >= self.lower && key.truncated_to(&self.upper) <= self.upper
    }

    /// Whether every call number in `other` also falls in this range.
    #[must_use]
    pub fn encloses(&self, other: &LccRange) -> bool {
        self.contains(&other.lower)
            && other.upper.truncated_to(&self.upper) <= self.upper
    }

    /// Whether the two ranges share any call number. Both ranges must be
    /// given in ascending order of lower bound.
    #[must_use]
    pub fn overlaps_next(&self, next: &LccRange) -> bool {
        self.contains(&next.lower)
    }
}

impl ClassKey {
    /// Compare as range bounds: the lower bound truncated to the upper
    /// bound's precision must not exceed it.
    fn cmp_bound(&self, upper: &ClassKey) -> Ordering {
        self.truncated_to(upper).cmp(upper)
    }
}

impl fmt::Display for LccRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lower == self.upper || self.is_letters_only() {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "{}-{}", self.lower, self.upper)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> ClassKey {
        ClassKey::parse(raw).unwrap()
    }

    #[test]
    fn test_class_key_order() {
        assert!(key("Q") < key("Q1"));
        assert!(key("Q1") < key("QA"));
        assert!(key("QA") < key("QA1"));
        assert!(key("QA76.5") < key("QA76.73"));
        assert!(key("QA76.73") < key("QA76.8"));
        assert!(key("QA76.8") < key("QA77"));
        assert_eq!(key("QA76.50"), key("QA76.5"));
    }

    #[test]
    fn test_cutters_ignored() {
        assert_eq!(key("QA76.73 .C15 2021"), key("QA76.73"));
    }

    #[test]
    fn test_letters_only_range() {
        let class_q = LccRange::parse("Q").unwrap();
        assert!(class_q.contains(&key("Q1")));
        assert!(class_q.contains(&key("QA76")));
        assert!(class_q.contains(&key("QR500")));
        assert!(!class_q.contains(&key("P1")));
        assert!(!class_q.contains(&key("R1")));

        let subclass = LccRange::parse("QA").unwrap();
        assert!(subclass.contains(&key("QA1")));
        assert!(!subclass.contains(&key("Q1")));
        assert!(!subclass.contains(&key("QB1")));
    }

    #[test]
    fn test_exact_letters_range() {
        let kf = LccRange::for_letters("KF");
        assert!(kf.contains(&key("KF")));
        assert!(kf.contains(&key("KF9827.5")));
        assert!(!kf.contains(&key("KFA1")));
        assert!(!kf.contains(&key("KE1")));
        assert_eq!(kf.to_string(), "KF");
        assert!(kf.is_letters_only());
        assert!(LccRange::parse("K").unwrap().encloses(&kf));
    }

    #[test]
    fn test_integer_upper_bound_includes_decimals() {
        let range = LccRange::parse("QA1-QA99").unwrap();
        assert!(range.contains(&key("QA1")));
        assert!(range.contains(&key("QA99")));
        assert!(range.contains(&key("QA99.5")));
        assert!(!range.contains(&key("QA100")));
        assert!(!range.contains(&key("QA")));
    }

    #[test]
    fn test_decimal_bounds() {
        let range = LccRange::parse("QA76.75-QA76.765").unwrap();
        assert!(range.contains(&key("QA76.75")));
        assert!(range.contains(&key("QA76.76")));
        assert!(range.contains(&key("QA76.7654")));
        assert!(!range.contains(&key("QA76.77")));
        assert!(!range.contains(&key("QA76.74")));
    }

    #[test]
    fn test_abbreviated_upper_bound() {
        let range = LccRange::parse("E151-889").unwrap();
        assert_eq!(range.upper(), &key("E889"));
        assert_eq!(range.to_string(), "E151-E889");
    }

    #[test]
    fn test_parse_rejects_inverted_and_malformed() {
        assert!(LccRange::parse("QA99-QA1").is_none());
        assert!(LccRange::parse("nonsense").is_none());
        assert!(LccRange::parse("QA1-").is_none());
    }

    #[test]
    fn test_encloses_and_overlap() {
        let parent = LccRange::parse("QA1-939").unwrap();
        assert!(parent.encloses(&LccRange::parse("QA75.5-QA76.95").unwrap()));
        assert!(!parent.encloses(&LccRange::parse("QA900-QA1000").unwrap()));
        assert!(LccRange::parse("Q").unwrap().encloses(&parent));

        let first = LccRange::parse("QA1-QA99").unwrap();
        assert!(first.overlaps_next(&LccRange::parse("QA99.5-QA140").unwrap()));
        assert!(!first.overlaps_next(&LccRange::parse("QA101-QA140").unwrap()));
    }
}
