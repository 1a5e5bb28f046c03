//! Browse window engine.
//!
//! A browse session is anchored at an origin (a document or an explicit
//! call number) and split into pages of `width` shelf slots. Page 0 holds
//! the origin at the slot named by the [`OffsetSpec`]; every other page is
//! chained from page 0 by whole widths, so stepping one page at a time and
//! jumping straight to page `n` land on the same boundaries.
//!
//! Slots are numbered relative to the origin: slot 0 is the first document
//! at or after the origin position, slot -1 the nearest document before it.
//! Page `p` covers slots `p * width - before .. (p + 1) * width - before`,
//! where `before` is the number of slots page 0 shows ahead of the origin.
//! Each page is fetched with skip-based neighbor queries, so the store is
//! asked for exactly the documents of the page.
//!
//! # Examples
//!
//! ```
//! use vshelf::browse::{BrowseEngine, BrowseRequest, OffsetSpec};
//! use vshelf::config::BrowseConfig;
//! use vshelf::document::CatalogDocument;
//! use vshelf::store::InMemoryStore;
//!
//! let store = InMemoryStore::from_documents(
//!     (1..=20).map(|n| CatalogDocument::new(&format!("d{n}"), &format!("QA{n}"))),
//! );
//! let engine = BrowseEngine::new(store, BrowseConfig::default())?;
//!
//! let request = BrowseRequest::document("d10").width(5).offset(OffsetSpec::Middle);
//! let window = engine.browse(&request)?;
//! let ids: Vec<_> = window.documents().iter().filter_map(|d| d.id()).collect();
//! assert_eq!(ids, vec!["d8", "d9", "d10", "d11", "d12"]);
//!
//! let next = engine.browse(&request.clone().page(1))?;
//! assert_eq!(next.documents()[0].id(), Some("d13"));
//! # Ok::<(), vshelf::ShelfError>(())
//! ```

use crate::call_number::CallNumber;
use crate::config::BrowseConfig;
use crate::document::{CatalogDocument, DocumentRef};
use crate::error::{Result, ShelfError};
use crate::store::{DocumentStore, NeighborQuery, RequestContext, ShelfPosition};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a browse session is anchored at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginSpec {
    /// A document id; the document must exist in the store
    Document(String),
    /// An explicit starting call number; must tokenize as LC
    CallNumber(String),
}

impl OriginSpec {
    /// Build an origin from optional request parameters. Blank values count
    /// as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::InvalidOrigin`] unless exactly one is present.
    pub fn from_parts(document: Option<&str>, call_number: Option<&str>) -> Result<Self> {
        let document = document.map(str::trim).filter(|s| !s.is_empty());
        let call_number = call_number.map(str::trim).filter(|s| !s.is_empty());
        match (document, call_number) {
            (Some(id), None) => Ok(OriginSpec::Document(id.to_string())),
            (None, Some(cn)) => Ok(OriginSpec::CallNumber(cn.to_string())),
            (Some(_), Some(_)) => Err(ShelfError::InvalidOrigin(
                "both a document id and a call number were given".to_string(),
            )),
            (None, None) => Err(ShelfError::InvalidOrigin(
                "neither a document id nor a call number was given".to_string(),
            )),
        }
    }
}

/// Where the origin sits within page 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSpec {
    /// Origin is the first slot
    First,
    /// Origin is the middle slot (`width / 2`)
    Middle,
    /// Origin is the last slot
    Last,
    /// Origin is at this zero-based slot
    Index(usize),
}

impl OffsetSpec {
    /// Number of slots page 0 shows before the origin.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::InvalidOffset`] if an index does not fit in
    /// `width`.
    pub fn slots_before(self, width: usize) -> Result<usize> {
        match self {
            OffsetSpec::First => Ok(0),
            OffsetSpec::Middle => Ok(width / 2),
            OffsetSpec::Last => Ok(width.saturating_sub(1)),
            OffsetSpec::Index(index) if index < width => Ok(index),
            OffsetSpec::Index(index) => Err(ShelfError::InvalidOffset(format!(
                "index {index} does not fit in a window of {width}"
            ))),
        }
    }
}

impl fmt::Display for OffsetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetSpec::First => write!(f, "first"),
            OffsetSpec::Middle => write!(f, "middle"),
            OffsetSpec::Last => write!(f, "last"),
            OffsetSpec::Index(index) => write!(f, "{index}"),
        }
    }
}

impl FromStr for OffsetSpec {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(OffsetSpec::First),
            "middle" => Ok(OffsetSpec::Middle),
            "last" => Ok(OffsetSpec::Last),
            other => other
                .parse()
                .map(OffsetSpec::Index)
                .map_err(|_| ShelfError::InvalidOffset(format!("unrecognized offset {s:?}"))),
        }
    }
}

/// A browse request. Unset width and offset fall back to the engine's
/// configured defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseRequest {
    /// Session anchor
    pub origin: OriginSpec,
    /// Signed page number; 0 holds the origin
    pub page: i64,
    /// Slots per page
    pub width: Option<usize>,
    /// Origin placement within page 0
    pub offset: Option<OffsetSpec>,
}

impl BrowseRequest {
    /// Page 0 of a session anchored at `origin`.
    #[must_use]
    pub fn new(origin: OriginSpec) -> Self {
        BrowseRequest {
            origin,
            page: 0,
            width: None,
            offset: None,
        }
    }

    /// Page 0 of a session anchored at a document.
    #[must_use]
    pub fn document(id: &str) -> Self {
        Self::new(OriginSpec::Document(id.to_string()))
    }

    /// Page 0 of a session anchored at an explicit call number.
    #[must_use]
    pub fn call_number(call_number: &str) -> Self {
        Self::new(OriginSpec::CallNumber(call_number.to_string()))
    }

    /// Set the page.
    #[must_use]
    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Set the width.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the offset.
    #[must_use]
    pub fn offset(mut self, offset: OffsetSpec) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// A resolved session anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    spec: OriginSpec,
    call_number: CallNumber,
    position: ShelfPosition,
    document: Option<CatalogDocument>,
}

impl Origin {
    /// The origin as requested.
    #[must_use]
    pub fn spec(&self) -> &OriginSpec {
        &self.spec
    }

    /// Call number the session is anchored at.
    #[must_use]
    pub fn call_number(&self) -> &CallNumber {
        &self.call_number
    }

    /// Shelf position of the origin.
    #[must_use]
    pub fn position(&self) -> &ShelfPosition {
        &self.position
    }

    /// The origin document, for document origins.
    #[must_use]
    pub fn document(&self) -> Option<&CatalogDocument> {
        self.document.as_ref()
    }
}

/// One page of a browse session.
///
/// `documents` is in ascending shelf order whatever the paging direction and
/// holds at most `width` entries. A short page is returned as the store
/// answered it; [`BrowseWindow::tiles`] pads it to `width` for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseWindow {
    origin: Origin,
    page: i64,
    width: usize,
    offset: OffsetSpec,
    documents: Vec<DocumentRef>,
    origin_index: Option<usize>,
    leading_gap: usize,
    trailing_gap: usize,
}

impl BrowseWindow {
    /// The resolved origin.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Page number.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Requested width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Origin placement within page 0.
    #[must_use]
    pub fn offset(&self) -> OffsetSpec {
        self.offset
    }

    /// Documents in ascending shelf order.
    #[must_use]
    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    /// Number of documents returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether the store returned fewer than `width` documents.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.documents.len() < self.width
    }

    /// Index in `documents` of the first entry at or after the origin, on
    /// page 0 when such an entry exists. For document origins this is the
    /// origin document itself.
    #[must_use]
    pub fn origin_index(&self) -> Option<usize> {
        self.origin_index
    }

    /// Exactly `width` slots: `documents` padded with empty placeholders on
    /// the side(s) where the shelf ran out.
    #[must_use]
    pub fn tiles(&self) -> Vec<DocumentRef> {
        let mut tiles = Vec::with_capacity(self.width);
        tiles.extend(std::iter::repeat_with(DocumentRef::empty).take(self.leading_gap));
        tiles.extend(self.documents.iter().cloned());
        tiles.extend(std::iter::repeat_with(DocumentRef::empty).take(self.trailing_gap));
        tiles
    }

    /// First catalog document.
    #[must_use]
    pub fn first_document(&self) -> Option<&CatalogDocument> {
        self.documents.iter().find_map(DocumentRef::as_catalog)
    }

    /// Last catalog document.
    #[must_use]
    pub fn last_document(&self) -> Option<&CatalogDocument> {
        self.documents.iter().rev().find_map(DocumentRef::as_catalog)
    }

    /// Shelf position of the first catalog document.
    #[must_use]
    pub fn lower_bound(&self) -> Option<ShelfPosition> {
        self.first_document().map(ShelfPosition::of)
    }

    /// Shelf position of the last catalog document.
    #[must_use]
    pub fn upper_bound(&self) -> Option<ShelfPosition> {
        self.last_document().map(ShelfPosition::of)
    }
}

/// Slots `[start, end)` of a page, relative to the origin.
fn slot_range(page: i64, width: usize, before: usize) -> Result<(i64, i64)> {
    let out_of_range = || ShelfError::InvalidOffset(format!("page {page} is out of range"));
    let width = i64::try_from(width).map_err(|_| out_of_range())?;
    let before = i64::try_from(before).map_err(|_| out_of_range())?;
    let start = page
        .checked_mul(width)
        .and_then(|slots| slots.checked_sub(before))
        .ok_or_else(out_of_range)?;
    let end = start.checked_add(width).ok_or_else(out_of_range)?;
    Ok((start, end))
}

fn slot_count(slots: i64) -> Result<usize> {
    usize::try_from(slots).map_err(|_| ShelfError::InvalidOffset(format!("slot {slots} is out of range")))
}

/// Computes browse windows against a document store.
///
/// The engine holds no per-request state and may be shared across threads.
#[derive(Debug)]
pub struct BrowseEngine<S> {
    store: Arc<S>,
    config: BrowseConfig,
}

impl<S> Clone for BrowseEngine<S> {
    fn clone(&self) -> Self {
        BrowseEngine {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: DocumentStore> BrowseEngine<S> {
    /// Create an engine over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Config`] if the configuration is invalid.
    pub fn new(store: S, config: BrowseConfig) -> Result<Self> {
        Self::from_arc(Arc::new(store), config)
    }

    /// Create an engine over a shared store.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Config`] if the configuration is invalid.
    pub fn from_arc(store: Arc<S>, config: BrowseConfig) -> Result<Self> {
        config.validate()?;
        Ok(BrowseEngine { store, config })
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compute a window with no request deadline beyond the configured
    /// query timeout.
    ///
    /// # Errors
    ///
    /// See [`BrowseEngine::browse_with`].
    pub fn browse(&self, request: &BrowseRequest) -> Result<BrowseWindow> {
        self.browse_with(request, &RequestContext::background())
    }

    /// Compute a window under the deadline and cancellation of `ctx`.
    ///
    /// Each store call gets `ctx` narrowed to the configured query timeout.
    /// A page lying wholly on one side of the origin costs one neighbor
    /// query. The page containing the origin costs two: a backward query
    /// for the slots before the origin (exclusive of it) and a forward query
    /// from the origin (inclusive).
    ///
    /// # Errors
    ///
    /// - [`ShelfError::InvalidWidth`] or [`ShelfError::InvalidOffset`] for
    ///   bad paging parameters
    /// - [`ShelfError::MalformedCallNumber`] if an explicit call number
    ///   does not tokenize as LC
    /// - [`ShelfError::DocumentNotFound`] if the origin document is missing
    /// - [`ShelfError::Store`], [`ShelfError::Timeout`] or
    ///   [`ShelfError::Cancelled`] if a store call fails
    pub fn browse_with(&self, request: &BrowseRequest, ctx: &RequestContext) -> Result<BrowseWindow> {
        let width = request.width.unwrap_or(self.config.default_width);
        if width == 0 || width > self.config.max_width {
            return Err(ShelfError::InvalidWidth {
                width,
                max: self.config.max_width,
            });
        }
        let offset = request.offset.unwrap_or(self.config.default_offset);
        let before = offset.slots_before(width)?;
        let (start, end) = slot_range(request.page, width, before)?;

        let origin = self.resolve_origin(&request.origin, ctx)?;
        let anchor = origin.position.clone();
        debug!(
            origin = %origin.call_number,
            page = request.page,
            width,
            %offset,
            start,
            end,
            "computing browse window"
        );

        let (documents, leading_gap, trailing_gap, origin_index) = if start >= 0 {
            let found = self.query(ctx, NeighborQuery::forward(anchor, slot_count(start)?, width))?;
            let origin_index = (request.page == 0 && !found.is_empty()).then_some(0);
            let trailing = width - found.len();
            (found, 0, trailing, origin_index)
        } else if end <= 0 {
            let mut found =
                self.query(ctx, NeighborQuery::backward(anchor, slot_count(-end)?, width))?;
            found.reverse();
            let leading = width - found.len();
            (found, leading, 0, None)
        } else {
            let below = slot_count(-start)?;
            let above = slot_count(end)?;
            let mut lower = self.query(ctx, NeighborQuery::backward(anchor.clone(), 0, below))?;
            lower.reverse();
            let upper = self.query(ctx, NeighborQuery::forward(anchor, 0, above))?;
            let leading = below - lower.len();
            let trailing = above - upper.len();
            let origin_index = (!upper.is_empty()).then_some(lower.len());
            lower.extend(upper);
            (lower, leading, trailing, origin_index)
        };

        let unparsed = documents
            .iter()
            .filter_map(DocumentRef::call_number)
            .filter(|cn| !cn.is_lcc())
            .count();
        if unparsed > 0 {
            warn!(unparsed, "window contains call numbers that are not LC");
        }

        Ok(BrowseWindow {
            origin,
            page: request.page,
            width,
            offset,
            documents,
            origin_index,
            leading_gap,
            trailing_gap,
        })
    }

    fn resolve_origin(&self, spec: &OriginSpec, ctx: &RequestContext) -> Result<Origin> {
        match spec {
            OriginSpec::Document(id) => {
                if id.trim().is_empty() {
                    return Err(ShelfError::InvalidOrigin("empty document id".to_string()));
                }
                let document = ctx
                    .call(Some(self.config.query_timeout()), |scoped| {
                        self.store.get_document(id, scoped)
                    })?
                    .ok_or_else(|| ShelfError::DocumentNotFound(id.clone()))?;
                if !document.call_number().is_lcc() {
                    warn!(id = %id, call_number = %document.call_number(), "origin call number is not LC");
                }
                Ok(Origin {
                    spec: spec.clone(),
                    call_number: document.call_number().clone(),
                    position: ShelfPosition::of(&document),
                    document: Some(document),
                })
            },
            OriginSpec::CallNumber(raw) => {
                let call_number = CallNumber::new(raw);
                if !call_number.is_lcc() {
                    return Err(ShelfError::MalformedCallNumber(raw.clone()));
                }
                Ok(Origin {
                    spec: spec.clone(),
                    position: ShelfPosition::at_key(call_number.shelfkey()),
                    call_number,
                    document: None,
                })
            },
        }
    }

    fn query(&self, ctx: &RequestContext, query: NeighborQuery) -> Result<Vec<DocumentRef>> {
        let mut found = ctx.call(Some(self.config.query_timeout()), |scoped| {
            self.store.query_neighbors(&query, scoped)
        })?;
        debug!(
            direction = %query.direction,
            skip = query.skip,
            limit = query.limit,
            returned = found.len(),
            "neighbor query"
        );
        found.truncate(query.limit);
        Ok(found)
    }
}
