//! Engine configuration.
//!
//! Configuration is plain data with compiled defaults. It can be built in
//! code with the `with_*` methods or loaded from a JSON file; every field is
//! optional in the file and falls back to its default.
//!
//! ```json
//! {
//!   "browse": { "default_width": 11, "default_offset": "first" },
//!   "status": {
//!     "sites": {
//!       "SPEC-COLL": { "marker": "site_special", "unique": true }
//!     }
//!   }
//! }
//! ```
//!
//! | Key | Default |
//! |-----|---------|
//! | `browse.default_width` | 15 |
//! | `browse.max_width` | 100 |
//! | `browse.default_offset` | `middle` |
//! | `browse.query_timeout_ms` | 5000 |
//! | `status.sites` | `SPEC-COLL`, `IVY`, `LAW`, `HEALTHSCI` |
//! | `status.english_patterns` | English, Eng., closed-captioned variants |
//! | `status.translated_patterns` | "Translated from ..." annotations |

use crate::browse::OffsetSpec;
use crate::error::{Result, ShelfError};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Browse window settings
    pub browse: BrowseConfig,
    /// Status marker settings
    pub status: StatusConfig,
}

impl ShelfConfig {
    /// Load configuration from a JSON file. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds invalid values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or holds invalid
    /// values.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: ShelfConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.browse.validate()?;
        self.status.validate()
    }

    /// Replace the browse section.
    #[must_use]
    pub fn with_browse(mut self, browse: BrowseConfig) -> Self {
        self.browse = browse;
        self
    }

    /// Replace the status section.
    #[must_use]
    pub fn with_status(mut self, status: StatusConfig) -> Self {
        self.status = status;
        self
    }
}

/// Browse window settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Width used when a request names none
    pub default_width: usize,
    /// Largest width a request may ask for
    pub max_width: usize,
    /// Origin placement used when a request names none
    pub default_offset: OffsetSpec,
    /// Upper bound on each store call, in milliseconds
    pub query_timeout_ms: u64,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            default_width: 15,
            max_width: 100,
            default_offset: OffsetSpec::Middle,
            query_timeout_ms: 5000,
        }
    }
}

impl BrowseConfig {
    /// Set the default width.
    #[must_use]
    pub fn with_default_width(mut self, width: usize) -> Self {
        self.default_width = width;
        self
    }

    /// Set the maximum width.
    #[must_use]
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set the default offset.
    #[must_use]
    pub fn with_default_offset(mut self, offset: OffsetSpec) -> Self {
        self.default_offset = offset;
        self
    }

    /// Set the store call timeout.
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Store call timeout.
    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Check widths, default offset, and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 {
            return Err(ShelfError::Config("max_width must be positive".to_string()));
        }
        if self.default_width == 0 || self.default_width > self.max_width {
            return Err(ShelfError::Config(format!(
                "default_width {} must be between 1 and max_width {}",
                self.default_width, self.max_width
            )));
        }
        if self.query_timeout_ms == 0 {
            return Err(ShelfError::Config(
                "query_timeout_ms must be positive".to_string(),
            ));
        }
        self.default_offset
            .slots_before(self.default_width)
            .map_err(|e| ShelfError::Config(format!("default_offset: {e}")))?;
        Ok(())
    }
}

/// How holdings in one library are marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRule {
    /// Marker emitted for copies in this library (e.g. "site_law")
    pub marker: String,
    /// Reading-room-only collection whose items always count as available
    #[serde(default)]
    pub unique: bool,
    /// Items held only here are forced unavailable
    #[serde(default)]
    pub workflow_override: bool,
}

impl SiteRule {
    /// A plain site marker rule.
    #[must_use]
    pub fn new(marker: &str) -> Self {
        SiteRule {
            marker: marker.to_string(),
            unique: false,
            workflow_override: false,
        }
    }

    /// Mark the library as a unique site.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Enable the workflow override.
    #[must_use]
    pub fn workflow_override(mut self) -> Self {
        self.workflow_override = true;
        self
    }
}

/// Status marker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Site rules keyed by library code, in marker emission order
    pub sites: IndexMap<String, SiteRule>,
    /// Language values treated as English (case-insensitive regexes)
    pub english_patterns: Vec<String>,
    /// Language values that only annotate a translation source
    pub translated_patterns: Vec<String>,
}

fn default_sites() -> IndexMap<String, SiteRule> {
    let mut sites = IndexMap::new();
    sites.insert("SPEC-COLL".to_string(), SiteRule::new("site_special").unique());
    sites.insert("IVY".to_string(), SiteRule::new("site_ivy"));
    sites.insert("LAW".to_string(), SiteRule::new("site_law"));
    sites.insert("HEALTHSCI".to_string(), SiteRule::new("site_health"));
    sites
}

fn default_english_patterns() -> Vec<String> {
    [
        r"^\s*english\s*[.,;:]?\s*$",
        r"^\s*eng\s*[.,;:]?\s*$",
        r"^\s*english\s*[-,;:(]?\s*\(?\s*closed[- ]?caption(ed)?\s*\)?\s*[.]?\s*$",
        r"^\s*closed[- ]?caption(ed)?\s*[.]?\s*$",
    ]
    .iter()
    .map(|p| (*p).to_string())
    .collect()
}

fn default_translated_patterns() -> Vec<String> {
    vec![r"\btranslat(ed|ion)\s+from\b".to_string()]
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            english_patterns: default_english_patterns(),
            translated_patterns: default_translated_patterns(),
        }
    }
}

impl StatusConfig {
    /// Add or replace a site rule.
    #[must_use]
    pub fn with_site(mut self, library: &str, rule: SiteRule) -> Self {
        self.sites.insert(library.to_string(), rule);
        self
    }

    /// Remove every site rule.
    #[must_use]
    pub fn without_sites(mut self) -> Self {
        self.sites.clear();
        self
    }

    /// Add an English-equivalent language pattern.
    #[must_use]
    pub fn with_english_pattern(mut self, pattern: &str) -> Self {
        self.english_patterns.push(pattern.to_string());
        self
    }

    /// Compile the English allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Config`] naming the first invalid pattern.
    pub fn english_regexes(&self) -> Result<Vec<Regex>> {
        compile_patterns("english_patterns", &self.english_patterns)
    }

    /// Compile the translated-from filters.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Config`] naming the first invalid pattern.
    pub fn translated_regexes(&self) -> Result<Vec<Regex>> {
        compile_patterns("translated_patterns", &self.translated_patterns)
    }

    /// Check patterns and site markers.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if let Some((library, _)) = self
            .sites
            .iter()
            .find(|(_, rule)| rule.marker.trim().is_empty())
        {
            return Err(ShelfError::Config(format!(
                "site rule for {library} has an empty marker"
            )));
        }
        self.english_regexes()?;
        self.translated_regexes()?;
        Ok(())
    }
}

fn compile_patterns(field: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ShelfError::Config(format!("{field}: {pattern:?}: {e}")))
        })
        .collect()
}
