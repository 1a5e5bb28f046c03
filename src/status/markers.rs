//! Status markers and the ordered accumulator that collects them.

use serde::{Serialize, Serializer};
use std::fmt;

/// A symbolic status marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Placeholder for an entry the store could not load
    Error,
    /// Placeholder for a slot past the end of the shelf
    Empty,
    /// No copy can be used right now
    Unavailable,
    /// A named availability exception (e.g. "pda", "pda_ordered")
    Availability(String),
    /// Holdings restricted to a marked site (e.g. "site_law")
    Site(String),
    /// Non-bibliographic item
    Equipment,
    /// Not in English
    NonEnglish,
    /// Sound recording
    Audio,
    /// Video recording
    Video,
    /// No copy circulates
    NonCirc,
    /// Copies on course reserve
    Reserve,
    /// Suppressed from display
    Shadowed,
    /// Excluded from discovery
    Undiscoverable,
    /// The selected tile
    Focus,
}

impl Marker {
    /// Symbolic code of the marker.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Marker::Error => "error",
            Marker::Empty => "empty",
            Marker::Unavailable => "unavailable",
            Marker::Availability(code) | Marker::Site(code) => code,
            Marker::Equipment => "equipment",
            Marker::NonEnglish => "non_english",
            Marker::Audio => "audio",
            Marker::Video => "video",
            Marker::NonCirc => "non_circ",
            Marker::Reserve => "reserve",
            Marker::Shadowed => "shadowed",
            Marker::Undiscoverable => "undiscoverable",
            Marker::Focus => "focus",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Marker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Style-class hints applied by the renderer in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    /// Dimmed tile
    Unavailable,
    /// Site-restricted tile
    Site,
    /// Non-circulating tile
    NonCirc,
    /// Reserve tile
    Reserve,
    /// Data-integrity warning
    Diagnostic,
    /// Selected tile
    Focus,
}

impl StyleHint {
    /// CSS class name of the hint.
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            StyleHint::Unavailable => "unavailable",
            StyleHint::Site => "site",
            StyleHint::NonCirc => "non-circ",
            StyleHint::Reserve => "reserve",
            StyleHint::Diagnostic => "diagnostic",
            StyleHint::Focus => "focus",
        }
    }
}

/// One emitted marker with its optional tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerEntry {
    /// The marker
    pub marker: Marker,
    /// Hover text, e.g. the language list of `non_english`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// Ordered, de-duplicated markers and style hints of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusMarkerSet {
    entries: Vec<MarkerEntry>,
    styles: Vec<StyleHint>,
}

impl StatusMarkerSet {
    /// Markers in emission order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.entries.iter().map(|entry| &entry.marker)
    }

    /// Marker codes in emission order.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.markers().map(Marker::code).collect()
    }

    /// Markers with tooltips.
    #[must_use]
    pub fn entries(&self) -> &[MarkerEntry] {
        &self.entries
    }

    /// Style hints in emission order.
    #[must_use]
    pub fn styles(&self) -> &[StyleHint] {
        &self.styles
    }

    /// Whether `marker` was emitted.
    #[must_use]
    pub fn contains(&self, marker: &Marker) -> bool {
        self.markers().any(|m| m == marker)
    }

    /// Whether a marker with this code was emitted.
    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.markers().any(|m| m.code() == code)
    }

    /// Whether `style` was applied.
    #[must_use]
    pub fn has_style(&self, style: StyleHint) -> bool {
        self.styles.contains(&style)
    }

    /// Tooltip attached to `marker`.
    #[must_use]
    pub fn tooltip(&self, marker: &Marker) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| &entry.marker == marker)
            .and_then(|entry| entry.tooltip.as_deref())
    }

    /// Number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no marker was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Appends markers in derivation order, dropping repeats.
#[derive(Debug, Default)]
pub struct MarkerAccumulator {
    set: StatusMarkerSet,
}

impl MarkerAccumulator {
    /// Start an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a marker and its style hint. A repeated marker keeps its
    /// first position and tooltip.
    pub fn push(&mut self, marker: Marker, style: Option<StyleHint>, tooltip: Option<String>) {
        if !self.set.contains(&marker) {
            self.set.entries.push(MarkerEntry { marker, tooltip });
        }
        if let Some(style) = style {
            self.style(style);
        }
    }

    /// Append a style hint without a marker.
    pub fn style(&mut self, style: StyleHint) {
        if !self.set.styles.contains(&style) {
            self.set.styles.push(style);
        }
    }

    /// Finish the set.
    #[must_use]
    pub fn finish(self) -> StatusMarkerSet {
        self.set
    }
}
