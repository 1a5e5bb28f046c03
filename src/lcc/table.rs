//! Loading the static LC Classification outline table.
//!
//! The table is CSV with a header row and the columns
//! `id,range,name,ascii_name,note,parent_id`. Rows with an empty
//! `parent_id` are top-level classes.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// The outline shipped with the crate.
pub const BUNDLED_OUTLINE: &str = include_str!("../../data/lcc_outline.csv");

/// One row of the outline table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LccRow {
    /// Unique row identifier
    pub id: String,
    /// Call-number range (e.g. "QA1-939")
    pub range: String,
    /// Subject label
    pub name: String,
    /// ASCII-only subject label; derived from `name` when blank
    #[serde(default)]
    pub ascii_name: String,
    /// Optional elaboration
    #[serde(default)]
    pub note: Option<String>,
    /// Identifier of the parent row; blank for top-level classes
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl LccRow {
    /// Create a row.
    #[must_use]
    pub fn new(id: &str, range: &str, name: &str, parent_id: Option<&str>) -> Self {
        LccRow {
            id: id.to_string(),
            range: range.to_string(),
            name: name.to_string(),
            ascii_name: String::new(),
            note: None,
            parent_id: parent_id.map(str::to_string),
        }
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// The ASCII label, falling back to a folded form of `name`.
    #[must_use]
    pub fn effective_ascii_name(&self) -> String {
        if self.ascii_name.trim().is_empty() {
            ascii_fold(&self.name)
        } else {
            self.ascii_name.clone()
        }
    }

    /// Parent identifier, treating blank as absent.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Read all rows from CSV.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or a row does not match the
/// expected columns.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<LccRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        let mut row: LccRow = row?;
        row.note = row.note.filter(|n| !n.is_empty());
        rows.push(row);
    }
    Ok(rows)
}

/// Fold a label to ASCII: decompose, drop combining marks, then drop any
/// remaining non-ASCII characters.
#[must_use]
pub fn ascii_fold(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect()
}
