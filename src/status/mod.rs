//! Status marker engine.
//!
//! Derives the display markers of one shelf tile from its holdings. The
//! derivation runs as a fixed sequence of steps and each step appends to a
//! [`MarkerAccumulator`], so the output order is the step order:
//!
//! 1. Placeholders get a single `error` or `empty` marker and nothing else.
//! 2. Availability: shadowed/undiscoverable items and items held only in
//!    unique sites count as available; online-only items need a URL; PDA
//!    items get a purchasable code; other items need an available copy.
//! 3. Site markers, all-or-nothing: emitted only when every holding library
//!    has a site rule. Items held only in workflow-override libraries are
//!    forced unavailable.
//! 4. `unavailable`, or the availability exception code.
//! 5. `equipment` for non-bibliographic items, else `non_english`.
//! 6. `audio` / `video`.
//! 7. `non_circ` and `reserve` for physical items.
//! 8. `shadowed` / `undiscoverable`, always.
//! 9. `focus`, when requested.
//!
//! # Examples
//!
//! ```
//! use vshelf::config::StatusConfig;
//! use vshelf::document::{CatalogDocument, DocumentRef};
//! use vshelf::holdings::{HoldingsSnapshot, ItemCopy};
//! use vshelf::status::{MarkerOptions, StatusEngine};
//!
//! let engine = StatusEngine::new(&StatusConfig::default())?;
//! let doc = DocumentRef::from(CatalogDocument::new("u1", "QA76.73 .R87"));
//! let holdings = HoldingsSnapshot::builder()
//!     .copies(3, &ItemCopy::new("ALDERMAN", "STACKS").available(false))
//!     .build();
//!
//! let markers = engine.derive_markers(&doc, &holdings, MarkerOptions::default());
//! assert_eq!(markers.codes(), vec!["unavailable"]);
//! # Ok::<(), vshelf::ShelfError>(())
//! ```

mod language;
mod markers;
mod media;

pub use language::{LanguageClassifier, LanguageVerdict};
pub use markers::{Marker, MarkerAccumulator, MarkerEntry, StatusMarkerSet, StyleHint};
pub use media::{classify_media, MediaKind};

use crate::browse::BrowseWindow;
use crate::config::{SiteRule, StatusConfig};
use crate::document::{DocumentRef, Placeholder};
use crate::error::Result;
use crate::holdings::{HoldingsSnapshot, PdaStatus};
use crate::store::{HoldingsService, RequestContext};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerOptions {
    /// Highlight this tile as the current selection
    pub focus: bool,
}

impl MarkerOptions {
    /// Options with focus set.
    #[must_use]
    pub fn focused() -> Self {
        MarkerOptions { focus: true }
    }
}

/// Result of the availability step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    Available,
    Unavailable,
    Exception(&'static str),
}

/// Copy counts of one library.
#[derive(Debug, Clone, Copy, Default)]
struct LibraryCounts {
    circulating: usize,
}

/// Markers of one tile of a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileStatus {
    /// Document id, for catalog tiles
    pub id: Option<String>,
    /// Derived markers
    pub markers: StatusMarkerSet,
}

/// Derives status markers under a site and language configuration.
#[derive(Debug, Clone)]
pub struct StatusEngine {
    sites: IndexMap<String, SiteRule>,
    languages: LanguageClassifier,
}

impl StatusEngine {
    /// Build an engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ShelfError::Config`] if the configuration is invalid.
    pub fn new(config: &StatusConfig) -> Result<Self> {
        config.validate()?;
        Ok(StatusEngine {
            sites: config.sites.clone(),
            languages: LanguageClassifier::from_config(config)?,
        })
    }

    /// Derive the markers of one shelf slot. `holdings` is ignored for
    /// placeholders.
    #[must_use]
    pub fn derive_markers(
        &self,
        doc: &DocumentRef,
        holdings: &HoldingsSnapshot,
        options: MarkerOptions,
    ) -> StatusMarkerSet {
        let mut acc = MarkerAccumulator::new();
        match doc {
            DocumentRef::Placeholder(Placeholder::Empty) => {
                acc.push(Marker::Empty, None, None);
            },
            DocumentRef::Placeholder(Placeholder::Error(reason)) => {
                acc.push(Marker::Error, None, Some(reason.clone()));
            },
            DocumentRef::Catalog(_) => self.catalog_markers(&mut acc, holdings, options),
        }
        acc.finish()
    }

    fn catalog_markers(
        &self,
        acc: &mut MarkerAccumulator,
        holdings: &HoldingsSnapshot,
        options: MarkerOptions,
    ) {
        let flagged = holdings.shadowed || holdings.undiscoverable;
        let mut availability = self.availability(holdings);

        let libraries = library_counts(holdings);
        let site_marked = !libraries.is_empty()
            && libraries.keys().all(|library| self.sites.contains_key(*library));
        if site_marked {
            for library in libraries.keys() {
                if let Some(rule) = self.sites.get(*library) {
                    acc.push(Marker::Site(rule.marker.clone()), Some(StyleHint::Site), None);
                }
            }
        }
        let overridden = !flagged
            && !libraries.is_empty()
            && libraries
                .keys()
                .all(|library| self.sites.get(*library).is_some_and(|rule| rule.workflow_override));
        if overridden {
            availability = Availability::Unavailable;
        }

        match availability {
            Availability::Available => {},
            Availability::Unavailable => {
                acc.push(Marker::Unavailable, Some(StyleHint::Unavailable), None);
            },
            Availability::Exception(code) => {
                acc.push(Marker::Availability(code.to_string()), None, None);
            },
        }

        if holdings.bibliographic {
            if let LanguageVerdict::NonEnglish(languages) = self.languages.classify(&holdings.languages)
            {
                let tooltip = format!("Language: {}", languages.join(", "));
                acc.push(Marker::NonEnglish, None, Some(tooltip));
            }
        } else {
            acc.push(Marker::Equipment, None, None);
        }

        match classify_media(&holdings.formats) {
            Some(MediaKind::Video) => acc.push(Marker::Video, None, None),
            Some(MediaKind::Audio) => acc.push(Marker::Audio, None, None),
            None => {},
        }

        if holdings.is_physical() && holdings.existing_copies() > 0 {
            let site_circulating: usize = if site_marked {
                libraries.values().map(|counts| counts.circulating).sum()
            } else {
                0
            };
            if holdings.circulating_copies().saturating_sub(site_circulating) == 0 {
                acc.push(Marker::NonCirc, Some(StyleHint::NonCirc), None);
            }

            let reserve = holdings.reserve_copies();
            if reserve > 0 {
                let restyle = holdings.available_copies() <= reserve;
                acc.push(Marker::Reserve, restyle.then_some(StyleHint::Reserve), None);
            }
        }

        if holdings.shadowed {
            acc.push(Marker::Shadowed, Some(StyleHint::Diagnostic), None);
        }
        if holdings.undiscoverable {
            acc.push(Marker::Undiscoverable, Some(StyleHint::Diagnostic), None);
        }

        if options.focus {
            acc.push(Marker::Focus, Some(StyleHint::Focus), None);
        }
    }

    fn availability(&self, holdings: &HoldingsSnapshot) -> Availability {
        if holdings.shadowed || holdings.undiscoverable {
            return Availability::Available;
        }
        let unique_only = !holdings.copies.is_empty()
            && holdings
                .copies
                .iter()
                .all(|copy| self.sites.get(&copy.library).is_some_and(|rule| rule.unique));
        if unique_only {
            return Availability::Available;
        }
        if holdings.online_only {
            return if holdings.has_url() {
                Availability::Available
            } else {
                Availability::Unavailable
            };
        }
        match holdings.pda {
            Some(PdaStatus::Orderable) => Availability::Exception("pda"),
            Some(PdaStatus::Ordered) => Availability::Exception("pda_ordered"),
            Some(PdaStatus::Unorderable) => Availability::Unavailable,
            None if holdings.available_copies() > 0 => Availability::Available,
            None => Availability::Unavailable,
        }
    }

    /// Fetch holdings and derive markers for every tile of a window, in
    /// parallel. The tile whose document id equals `focus` gets the focus
    /// marker.
    ///
    /// # Errors
    ///
    /// Returns the first holdings service failure.
    pub fn annotate_window<H: HoldingsService>(
        &self,
        window: &BrowseWindow,
        service: &H,
        focus: Option<&str>,
    ) -> Result<Vec<TileStatus>> {
        self.annotate_window_with(window, service, focus, &RequestContext::background())
    }

    /// [`StatusEngine::annotate_window`] under the deadline and
    /// cancellation of `ctx`, which every holdings call receives.
    ///
    /// # Errors
    ///
    /// Returns the first holdings service failure, or
    /// [`ShelfError::Timeout`](crate::ShelfError::Timeout) /
    /// [`ShelfError::Cancelled`](crate::ShelfError::Cancelled) once the
    /// request ends.
    pub fn annotate_window_with<H: HoldingsService>(
        &self,
        window: &BrowseWindow,
        service: &H,
        focus: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Vec<TileStatus>> {
        let tiles = window.tiles();
        let statuses = tiles
            .par_iter()
            .map(|tile| -> Result<TileStatus> {
                let id = tile.id().map(str::to_string);
                let holdings = match &id {
                    Some(id) => ctx.call(None, |scoped| service.get_holdings(id, scoped))?,
                    None => HoldingsSnapshot::default(),
                };
                let options = MarkerOptions {
                    focus: id.is_some() && id.as_deref() == focus,
                };
                Ok(TileStatus {
                    markers: self.derive_markers(tile, &holdings, options),
                    id,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(tiles = statuses.len(), page = window.page(), "annotated window");
        Ok(statuses)
    }
}

/// Per-library counts in first-seen order.
fn library_counts(holdings: &HoldingsSnapshot) -> IndexMap<&str, LibraryCounts> {
    let mut libraries: IndexMap<&str, LibraryCounts> = IndexMap::new();
    for copy in &holdings.copies {
        let counts = libraries.entry(copy.library.as_str()).or_default();
        if copy.circulating {
            counts.circulating += 1;
        }
    }
    libraries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteRule;
    use crate::document::CatalogDocument;
    use crate::holdings::ItemCopy;

    fn engine() -> StatusEngine {
        StatusEngine::new(&StatusConfig::default()).unwrap()
    }

    fn doc() -> DocumentRef {
        DocumentRef::from(CatalogDocument::new("u1", "PS3537 .A426 Z9"))
    }

    fn stacks() -> ItemCopy {
        ItemCopy::new("ALDERMAN", "STACKS")
    }

    fn codes(holdings: &HoldingsSnapshot) -> Vec<String> {
        engine()
            .derive_markers(&doc(), holdings, MarkerOptions::default())
            .codes()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_placeholders_short_circuit() {
        let holdings = HoldingsSnapshot::builder().shadowed(true).build();
        let engine = engine();
        let empty = engine.derive_markers(&DocumentRef::empty(), &holdings, MarkerOptions::focused());
        assert_eq!(empty.codes(), vec!["empty"]);
        let error = engine.derive_markers(&DocumentRef::error("bad"), &holdings, MarkerOptions::focused());
        assert_eq!(error.codes(), vec!["error"]);
        assert_eq!(error.tooltip(&Marker::Error), Some("bad"));
    }

    #[test]
    fn test_all_checked_out() {
        let holdings = HoldingsSnapshot::builder()
            .copies(3, &stacks().available(false))
            .build();
        assert_eq!(codes(&holdings), vec!["unavailable"]);
    }

    #[test]
    fn test_mixed_reserve_not_restyled() {
        let holdings = HoldingsSnapshot::builder()
            .copies(4, &stacks())
            .copy(ItemCopy::new("CLEMONS", "RESERVE").reserve(true).available(false))
            .build();
        let set = engine().derive_markers(&doc(), &holdings, MarkerOptions::default());
        assert_eq!(set.codes(), vec!["reserve"]);
        assert!(!set.has_style(StyleHint::Reserve));
    }

    #[test]
    fn test_reserve_only_restyled() {
        let holdings = HoldingsSnapshot::builder()
            .copy(ItemCopy::new("CLEMONS", "RESERVE").reserve(true))
            .build();
        let set = engine().derive_markers(&doc(), &holdings, MarkerOptions::default());
        assert_eq!(set.codes(), vec!["reserve"]);
        assert!(set.has_style(StyleHint::Reserve));
    }

    #[test]
    fn test_site_markers_all_or_nothing() {
        let mixed = HoldingsSnapshot::builder()
            .copy(ItemCopy::new("SPEC-COLL", "VAULT").circulating(false))
            .copy(stacks())
            .build();
        assert!(codes(&mixed).iter().all(|c| !c.starts_with("site_")));

        let marked = HoldingsSnapshot::builder()
            .copy(ItemCopy::new("LAW", "STACKS"))
            .copy(ItemCopy::new("IVY", "STACKS").available(false))
            .copy(ItemCopy::new("LAW", "STACKS"))
            .build();
        let codes = codes(&marked);
        assert_eq!(&codes[..2], &["site_law", "site_ivy"]);
    }

    #[test]
    fn test_unique_site_always_available() {
        let holdings = HoldingsSnapshot::builder()
            .copy(ItemCopy::new("SPEC-COLL", "VAULT").available(false).circulating(false))
            .build();
        let codes = codes(&holdings);
        assert_eq!(codes, vec!["site_special", "non_circ"]);
    }

    #[test]
    fn test_workflow_override_forces_unavailable() {
        let config = StatusConfig::default()
            .with_site("BINDERY", SiteRule::new("site_bindery").workflow_override());
        let engine = StatusEngine::new(&config).unwrap();
        let holdings = HoldingsSnapshot::builder()
            .copies(2, &ItemCopy::new("BINDERY", "REPAIR"))
            .build();
        let set = engine.derive_markers(&doc(), &holdings, MarkerOptions::default());
        assert!(set.contains(&Marker::Unavailable));
        assert!(set.contains_code("site_bindery"));

        let shadowed = HoldingsSnapshot::builder()
            .copies(2, &ItemCopy::new("BINDERY", "REPAIR"))
            .shadowed(true)
            .build();
        let set = engine.derive_markers(&doc(), &shadowed, MarkerOptions::default());
        assert!(!set.contains(&Marker::Unavailable));
        assert!(set.contains(&Marker::Shadowed));
    }

    #[test]
    fn test_online_and_pda() {
        let with_url = HoldingsSnapshot::builder()
            .online(Some("https://example.org/e"))
            .language("English")
            .build();
        assert!(codes(&with_url).is_empty());

        let without_url = HoldingsSnapshot::builder().online(None).build();
        assert_eq!(codes(&without_url), vec!["unavailable"]);

        let orderable = HoldingsSnapshot::builder().pda(PdaStatus::Orderable).build();
        assert_eq!(codes(&orderable), vec!["pda"]);
        let ordered = HoldingsSnapshot::builder().pda(PdaStatus::Ordered).build();
        assert_eq!(codes(&ordered), vec!["pda_ordered"]);
        let gone = HoldingsSnapshot::builder().pda(PdaStatus::Unorderable).build();
        assert_eq!(codes(&gone), vec!["unavailable"]);
    }

    #[test]
    fn test_language_and_media() {
        let holdings = HoldingsSnapshot::builder()
            .copy(stacks())
            .language("French")
            .language("Translated from German")
            .format("DVD")
            .build();
        let set = engine().derive_markers(&doc(), &holdings, MarkerOptions::default());
        assert_eq!(set.codes(), vec!["non_english", "video"]);
        assert_eq!(set.tooltip(&Marker::NonEnglish), Some("Language: French"));

        let equipment = HoldingsSnapshot::builder()
            .copy(stacks())
            .language("French")
            .equipment()
            .build();
        assert_eq!(codes(&equipment), vec!["equipment"]);
    }

    #[test]
    fn test_non_circ() {
        let holdings = HoldingsSnapshot::builder()
            .copies(2, &stacks().circulating(false))
            .build();
        assert_eq!(codes(&holdings), vec!["non_circ"]);
    }

    #[test]
    fn test_diagnostics_and_focus_last() {
        let holdings = HoldingsSnapshot::builder()
            .copy(stacks().available(false))
            .shadowed(true)
            .undiscoverable(true)
            .build();
        let set = engine().derive_markers(&doc(), &holdings, MarkerOptions::focused());
        assert_eq!(set.codes(), vec!["shadowed", "undiscoverable", "focus"]);
        assert_eq!(set.styles().last(), Some(&StyleHint::Focus));
    }
}
