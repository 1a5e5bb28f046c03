//! Language classification against the English allow-list.

use crate::config::StatusConfig;
use crate::error::Result;
use regex::Regex;

/// Outcome of classifying a language list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageVerdict {
    /// At least one value is English-equivalent
    English,
    /// Only non-English values, deduplicated in original order
    NonEnglish(Vec<String>),
    /// Nothing left to judge after dropping blanks and translation notes
    Unknown,
}

/// Classifies language facet values.
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    english: Vec<Regex>,
    translated: Vec<Regex>,
}

impl LanguageClassifier {
    /// Compile the patterns of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ShelfError::Config`] for an invalid pattern.
    pub fn from_config(config: &StatusConfig) -> Result<Self> {
        Ok(LanguageClassifier {
            english: config.english_regexes()?,
            translated: config.translated_regexes()?,
        })
    }

    /// Whether a single value is English-equivalent.
    #[must_use]
    pub fn is_english(&self, language: &str) -> bool {
        self.english.iter().any(|re| re.is_match(language))
    }

    /// Whether a value only names a translation source.
    #[must_use]
    pub fn is_translation_note(&self, language: &str) -> bool {
        self.translated.iter().any(|re| re.is_match(language))
    }

    /// Classify a language list.
    #[must_use]
    pub fn classify(&self, languages: &[String]) -> LanguageVerdict {
        let mut others: Vec<String> = Vec::new();
        for language in languages {
            let language = language.trim();
            if language.is_empty() || self.is_translation_note(language) {
                continue;
            }
            if self.is_english(language) {
                return LanguageVerdict::English;
            }
            if !others.iter().any(|seen| seen == language) {
                others.push(language.to_string());
            }
        }
        if others.is_empty() {
            LanguageVerdict::Unknown
        } else {
            LanguageVerdict::NonEnglish(others)
        }
    }
}
