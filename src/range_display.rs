//! Human-readable descriptions of a shelf window.
//!
//! A window is labelled by the call numbers at either end, shortened to the
//! segments needed to tell them apart, and by the deepest classification
//! node both ends share.
//!
//! # Examples
//!
//! ```
//! use vshelf::range_display::minimal_distinguishing_pair;
//!
//! let (first, last) = minimal_distinguishing_pair("QA76.73 .C15 S63 2021", "QA76.73 .J38 2019");
//! assert_eq!(first, "QA76.73 .C15");
//! assert_eq!(last.as_deref(), Some("QA76.73 .J38"));
//! ```

use crate::browse::BrowseWindow;
use crate::call_number::CallNumber;
use crate::lcc::{effective_name, LccTree, NodeKind};
use serde::Serialize;

/// Shorten two call numbers to the segments that tell them apart.
///
/// Both are split into segments (fused class part, cutters, suffix words)
/// and cut after the first segment where they differ. A difference in the
/// class part keeps one more segment, so `QA76` vs `QB1` still shows a
/// cutter. Equal call numbers return the first with no second value.
#[must_use]
pub fn minimal_distinguishing_pair(a: &str, b: &str) -> (String, Option<String>) {
    let first = CallNumber::new(a);
    let last = CallNumber::new(b);
    let first_segments = first.segments();
    let last_segments = last.segments();

    if first_segments == last_segments {
        return (first.normalized().to_string(), None);
    }

    let differ = first_segments
        .iter()
        .zip(&last_segments)
        .take_while(|(x, y)| x == y)
        .count();
    let keep = if differ == 0 { 2 } else { differ + 1 };

    (
        join_prefix(&first_segments, keep),
        Some(join_prefix(&last_segments, keep)),
    )
}

fn join_prefix(segments: &[String], keep: usize) -> String {
    segments[..keep.min(segments.len())].join(" ")
}

/// The classification node shared by both ends of a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedClassification {
    /// Table id of the node
    pub id: String,
    /// Display label (artificial nodes borrow their ancestor's)
    pub label: String,
    /// Canonical range of the node
    pub range: String,
    /// Labels from the class down to the node
    pub trail: Vec<String>,
}

/// Display summary of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowDescription {
    /// Shortened first call number
    pub first: String,
    /// Shortened last call number, absent when both ends are equal
    pub last: Option<String>,
    /// Deepest node shared by both ends, unless that is the root
    pub classification: Option<SharedClassification>,
}

impl WindowDescription {
    /// Range label such as `QA76.73 .C15 - QA76.73 .J38`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.last {
            Some(last) => format!("{} - {last}", self.first),
            None => self.first.clone(),
        }
    }
}

/// Describe the catalog documents of a window. Returns `None` when the
/// window holds no catalog document.
#[must_use]
pub fn describe_window(window: &BrowseWindow, tree: &LccTree) -> Option<WindowDescription> {
    let first = window.first_document()?.call_number();
    let last = window.last_document()?.call_number();
    let (first_label, last_label) = minimal_distinguishing_pair(first.raw(), last.raw());

    let first_path = tree.lookup(first.normalized());
    let last_path = tree.lookup(last.normalized());
    let shared = first_path.common_ancestor(&last_path);

    let classification = (shared.kind() != NodeKind::Root).then(|| {
        let trail = first_path
            .iter()
            .skip(1)
            .take_while(|node| node.depth() <= shared.depth())
            .filter(|node| !node.is_artificial())
            .map(|node| node.name().to_string())
            .collect();
        SharedClassification {
            id: shared.table_id().to_string(),
            label: effective_name(tree, shared, false).to_string(),
            range: shared.range().to_string(),
            trail,
        }
    });

    Some(WindowDescription {
        first: first_label,
        last: last_label,
        classification,
    })
}
