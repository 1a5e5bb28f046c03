//! Holdings snapshots consumed by the status marker engine.
//!
//! A [`HoldingsSnapshot`] describes the physical copies of a catalog item
//! (library and location codes with per-copy availability, circulation and
//! reserve flags) together with the bibliographic facts status markers
//! depend on. Snapshots are supplied by an external availability service
//! and treated as read-only input.

use serde::{Deserialize, Serialize};

/// One physical copy of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCopy {
    /// Library code (e.g. "ALDERMAN", "SPEC-COLL")
    pub library: String,
    /// Location code within the library (e.g. "STACKS")
    pub location: String,
    /// Whether the copy is currently on the shelf
    pub available: bool,
    /// Whether the copy may be checked out
    pub circulating: bool,
    /// Whether the copy is on course reserve
    pub reserve: bool,
}

impl ItemCopy {
    /// A circulating, available, non-reserve copy.
    #[must_use]
    pub fn new(library: &str, location: &str) -> Self {
        ItemCopy {
            library: library.to_string(),
            location: location.to_string(),
            available: true,
            circulating: true,
            reserve: false,
        }
    }

    /// Set availability.
    #[must_use]
    pub fn available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Set circulation.
    #[must_use]
    pub fn circulating(mut self, circulating: bool) -> Self {
        self.circulating = circulating;
        self
    }

    /// Set reserve.
    #[must_use]
    pub fn reserve(mut self, reserve: bool) -> Self {
        self.reserve = reserve;
        self
    }
}

/// Purchase state of a patron-driven-acquisition item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdaStatus {
    /// May be ordered on request
    Orderable,
    /// An order has already been placed
    Ordered,
    /// Can no longer be ordered
    Unorderable,
}

/// Availability facts for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingsSnapshot {
    /// Physical copies
    pub copies: Vec<ItemCopy>,
    /// The item exists only online
    pub online_only: bool,
    /// Delivery URL for online items
    pub url: Option<String>,
    /// Patron-driven-acquisition state, for items not yet purchased
    pub pda: Option<PdaStatus>,
    /// Language facet values
    pub languages: Vec<String>,
    /// False for non-bibliographic items (equipment, laptops, keys)
    pub bibliographic: bool,
    /// Format facet values (e.g. "Book", "Video", "Sound Recording")
    pub formats: Vec<String>,
    /// Suppressed from public display
    pub shadowed: bool,
    /// Not returned by discovery searches
    pub undiscoverable: bool,
}

impl Default for HoldingsSnapshot {
    fn default() -> Self {
        HoldingsSnapshot {
            copies: Vec::new(),
            online_only: false,
            url: None,
            pda: None,
            languages: Vec::new(),
            bibliographic: true,
            formats: Vec::new(),
            shadowed: false,
            undiscoverable: false,
        }
    }
}

impl HoldingsSnapshot {
    /// Create a builder for fluently constructing snapshots
    #[must_use]
    pub fn builder() -> HoldingsSnapshotBuilder {
        HoldingsSnapshotBuilder {
            snapshot: HoldingsSnapshot::default(),
        }
    }

    /// Number of copies.
    #[must_use]
    pub fn existing_copies(&self) -> usize {
        self.copies.len()
    }

    /// Number of copies on the shelf.
    #[must_use]
    pub fn available_copies(&self) -> usize {
        self.copies.iter().filter(|c| c.available).count()
    }

    /// Number of copies that may be checked out.
    #[must_use]
    pub fn circulating_copies(&self) -> usize {
        self.copies.iter().filter(|c| c.circulating).count()
    }

    /// Number of copies on reserve.
    #[must_use]
    pub fn reserve_copies(&self) -> usize {
        self.copies.iter().filter(|c| c.reserve).count()
    }

    /// Whether a non-blank delivery URL exists.
    #[must_use]
    pub fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Whether the item is held physically (neither online-only nor PDA).
    #[must_use]
    pub fn is_physical(&self) -> bool {
        !self.online_only && self.pda.is_none()
    }
}

/// Builder for fluently constructing holdings snapshots
#[derive(Debug)]
pub struct HoldingsSnapshotBuilder {
    snapshot: HoldingsSnapshot,
}

impl HoldingsSnapshotBuilder {
    /// Add a copy
    #[must_use]
    pub fn copy(mut self, copy: ItemCopy) -> Self {
        self.snapshot.copies.push(copy);
        self
    }

    /// Add `count` identical copies
    #[must_use]
    pub fn copies(mut self, count: usize, copy: &ItemCopy) -> Self {
        self.snapshot
            .copies
            .extend(std::iter::repeat(copy).take(count).cloned());
        self
    }

    /// Mark as online-only with an optional delivery URL
    #[must_use]
    pub fn online(mut self, url: Option<&str>) -> Self {
        self.snapshot.online_only = true;
        self.snapshot.url = url.map(str::to_string);
        self
    }

    /// Set the PDA state
    #[must_use]
    pub fn pda(mut self, status: PdaStatus) -> Self {
        self.snapshot.pda = Some(status);
        self
    }

    /// Add a language value
    #[must_use]
    pub fn language(mut self, language: &str) -> Self {
        self.snapshot.languages.push(language.to_string());
        self
    }

    /// Add a format value
    #[must_use]
    pub fn format(mut self, format: &str) -> Self {
        self.snapshot.formats.push(format.to_string());
        self
    }

    /// Mark as a non-bibliographic item
    #[must_use]
    pub fn equipment(mut self) -> Self {
        self.snapshot.bibliographic = false;
        self
    }

    /// Set the shadowed flag
    #[must_use]
    pub fn shadowed(mut self, shadowed: bool) -> Self {
        self.snapshot.shadowed = shadowed;
        self
    }

    /// Set the undiscoverable flag
    #[must_use]
    pub fn undiscoverable(mut self, undiscoverable: bool) -> Self {
        self.snapshot.undiscoverable = undiscoverable;
        self
    }

    /// Build the snapshot
    #[must_use]
    pub fn build(self) -> HoldingsSnapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let snapshot = HoldingsSnapshot::builder()
            .copies(3, &ItemCopy::new("ALDERMAN", "STACKS"))
            .copy(ItemCopy::new("CLEMONS", "RESERVE").reserve(true).circulating(false))
            .copy(ItemCopy::new("ALDERMAN", "STACKS").available(false))
            .build();
        assert_eq!(snapshot.existing_copies(), 5);
        assert_eq!(snapshot.available_copies(), 4);
        assert_eq!(snapshot.circulating_copies(), 4);
        assert_eq!(snapshot.reserve_copies(), 1);
        assert!(snapshot.is_physical());
    }

    #[test]
    fn test_default_is_bibliographic() {
        let snapshot = HoldingsSnapshot::default();
        assert!(snapshot.bibliographic);
        assert_eq!(snapshot.existing_copies(), 0);
        assert!(!HoldingsSnapshot::builder().equipment().build().bibliographic);
    }

    #[test]
    fn test_url() {
        assert!(!HoldingsSnapshot::builder().online(Some("  ")).build().has_url());
        let online = HoldingsSnapshot::builder()
            .online(Some("https://example.org/item"))
            .build();
        assert!(online.has_url());
        assert!(!online.is_physical());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"copies":[{"library":"LAW","location":"STACKS","available":false,"circulating":true,"reserve":false}],"languages":["French"]}"#;
        let snapshot: HoldingsSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.bibliographic);
        assert_eq!(snapshot.copies[0].library, "LAW");
        assert_eq!(snapshot.available_copies(), 0);
    }
}
