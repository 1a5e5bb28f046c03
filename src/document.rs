//! Documents placed on the virtual shelf.
//!
//! A browse window holds [`DocumentRef`] entries: either a catalog document
//! with a call number, or a placeholder standing in for a slot the store
//! could not fill.

use crate::call_number::CallNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog document as returned by the document store.
///
/// The document id doubles as the handle for fetching its
/// [`HoldingsSnapshot`](crate::holdings::HoldingsSnapshot) from a
/// [`HoldingsService`](crate::store::HoldingsService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    id: String,
    call_number: CallNumber,
    title: Option<String>,
}

impl CatalogDocument {
    /// Create a document from its id and raw call number.
    #[must_use]
    pub fn new(id: &str, call_number: &str) -> Self {
        CatalogDocument {
            id: id.to_string(),
            call_number: CallNumber::new(call_number),
            title: None,
        }
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Document id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Call number with derived shelfkeys.
    #[must_use]
    pub fn call_number(&self) -> &CallNumber {
        &self.call_number
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Sort key shorthand for `call_number().shelfkey()`.
    #[must_use]
    pub fn shelfkey(&self) -> &str {
        self.call_number.shelfkey()
    }
}

/// Why a shelf slot holds no catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "placeholder", content = "reason", rename_all = "snake_case")]
pub enum Placeholder {
    /// The shelf ran out in this direction
    Empty,
    /// The store returned an entry that could not be loaded
    Error(String),
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Empty => write!(f, "empty"),
            Placeholder::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// One shelf slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRef {
    /// A catalog document
    Catalog(CatalogDocument),
    /// A non-catalog placeholder
    Placeholder(Placeholder),
}

impl DocumentRef {
    /// Shorthand for an empty placeholder.
    #[must_use]
    pub fn empty() -> Self {
        DocumentRef::Placeholder(Placeholder::Empty)
    }

    /// Shorthand for an error placeholder.
    #[must_use]
    pub fn error(reason: &str) -> Self {
        DocumentRef::Placeholder(Placeholder::Error(reason.to_string()))
    }

    /// The catalog document, if this is one.
    #[must_use]
    pub fn as_catalog(&self) -> Option<&CatalogDocument> {
        match self {
            DocumentRef::Catalog(doc) => Some(doc),
            DocumentRef::Placeholder(_) => None,
        }
    }

    /// Document id of catalog entries.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.as_catalog().map(CatalogDocument::id)
    }

    /// Call number of catalog entries.
    #[must_use]
    pub fn call_number(&self) -> Option<&CallNumber> {
        self.as_catalog().map(CatalogDocument::call_number)
    }

    /// Whether this slot is a placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, DocumentRef::Placeholder(_))
    }
}

impl From<CatalogDocument> for DocumentRef {
    fn from(doc: CatalogDocument) -> Self {
        DocumentRef::Catalog(doc)
    }
}
