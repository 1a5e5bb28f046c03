//! Collaborator interfaces: the document store and the holdings service.
//!
//! The browse engine never talks to a search index directly. It issues
//! [`NeighborQuery`] values against a [`DocumentStore`] and fetches
//! availability through a [`HoldingsService`]. Every store call receives the
//! [`RequestContext`] of its request, narrowed to the configured query
//! timeout. Clients bound their own I/O by [`RequestContext::remaining`] and
//! stop early once [`RequestContext::is_cancelled`] turns true; the engines
//! call them on the caller's thread and discard results that arrive after
//! the deadline or after cancellation.
//!
//! # Query semantics
//!
//! Documents are totally ordered by `(shelfkey, id)`. A forward query
//! returns documents at or after the anchor in ascending order. A backward
//! query returns documents strictly before the anchor, nearest first, which
//! for a search index is an ascending sort on the reverse shelfkey. `skip`
//! corresponds to a search index start offset.
//!
//! [`InMemoryStore`] implements both traits over a sorted vector.

use crate::document::{CatalogDocument, DocumentRef};
use crate::error::{Result, ShelfError, StoreError};
use crate::holdings::HoldingsSnapshot;
use crossbeam_channel::{after, bounded, never, select, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::warn;

/// Paging direction along the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward higher call numbers (ascending shelfkey)
    Forward,
    /// Toward lower call numbers (ascending reverse shelfkey)
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "asc"),
            Direction::Backward => write!(f, "desc"),
        }
    }
}

/// A point on the shelf.
///
/// Without an id the position sits before every document sharing the
/// shelfkey, which is where an explicit call number lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShelfPosition {
    /// Shelfkey of the position
    pub shelfkey: String,
    /// Tie-breaking document id
    pub id: Option<String>,
}

impl ShelfPosition {
    /// The position of a document.
    #[must_use]
    pub fn of(doc: &CatalogDocument) -> Self {
        ShelfPosition {
            shelfkey: doc.shelfkey().to_string(),
            id: Some(doc.id().to_string()),
        }
    }

    /// The position just before every document with this shelfkey.
    #[must_use]
    pub fn at_key(shelfkey: &str) -> Self {
        ShelfPosition {
            shelfkey: shelfkey.to_string(),
            id: None,
        }
    }

    /// Order of `doc` relative to this position, without allocating.
    #[must_use]
    pub fn cmp_document(&self, doc: &CatalogDocument) -> Ordering {
        doc.shelfkey()
            .cmp(self.shelfkey.as_str())
            .then_with(|| match &self.id {
                Some(id) => doc.id().cmp(id.as_str()),
                None => Ordering::Greater,
            })
    }
}

/// A nearest-neighbor query against the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborQuery {
    /// Where the query starts
    pub anchor: ShelfPosition,
    /// Which way to read
    pub direction: Direction,
    /// Documents to pass over before collecting
    pub skip: usize,
    /// Maximum number of documents to return
    pub limit: usize,
}

impl NeighborQuery {
    /// Documents at or after `anchor`, ascending.
    #[must_use]
    pub fn forward(anchor: ShelfPosition, skip: usize, limit: usize) -> Self {
        NeighborQuery {
            anchor,
            direction: Direction::Forward,
            skip,
            limit,
        }
    }

    /// Documents strictly before `anchor`, nearest first.
    #[must_use]
    pub fn backward(anchor: ShelfPosition, skip: usize, limit: usize) -> Self {
        NeighborQuery {
            anchor,
            direction: Direction::Backward,
            skip,
            limit,
        }
    }
}

/// Read access to the shelf-ordered document index.
///
/// Implementations own their retry policy; errors returned here are
/// surfaced to the browse caller unchanged. `ctx` carries the deadline the
/// call must finish by and the request's cancellation signal.
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn get_document(
        &self,
        id: &str,
        ctx: &RequestContext,
    ) -> std::result::Result<Option<CatalogDocument>, StoreError>;

    /// Run a nearest-neighbor query (see the module docs for ordering).
    ///
    /// Returning fewer than `limit` entries is valid. Entries that exist in
    /// the index but cannot be loaded may be returned as
    /// [`Placeholder::Error`](crate::document::Placeholder::Error).
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn query_neighbors(
        &self,
        query: &NeighborQuery,
        ctx: &RequestContext,
    ) -> std::result::Result<Vec<DocumentRef>, StoreError>;
}

/// Availability lookups by document id.
pub trait HoldingsService: Send + Sync {
    /// Fetch the holdings snapshot of a document. Online-only and
    /// non-bibliographic items may yield an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn get_holdings(
        &self,
        id: &str,
        ctx: &RequestContext,
    ) -> std::result::Result<HoldingsSnapshot, StoreError>;
}

/// Deadline and cancellation signal of the enclosing request.
///
/// Cancellation is observed through a channel that disconnects when the
/// paired [`CancelHandle`] is dropped, so every clone of a context sees it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Receiver<()>,
}

/// Cancels the paired [`RequestContext`] when cancelled or dropped.
#[derive(Debug)]
pub struct CancelHandle {
    _sender: Sender<()>,
}

impl CancelHandle {
    /// Cancel the request.
    pub fn cancel(self) {
        // Dropping the sender disconnects every paired receiver.
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context with no deadline that is never cancelled.
    #[must_use]
    pub fn background() -> Self {
        RequestContext {
            deadline: None,
            cancel: never(),
        }
    }

    /// A context that expires after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline.
    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation handle.
    #[must_use]
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (sender, receiver) = bounded(0);
        self.cancel = receiver;
        (self, CancelHandle { _sender: sender })
    }

    /// Time left before the deadline, if one is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the request has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cancel.try_recv(), Err(TryRecvError::Disconnected) | Ok(()))
    }

    /// Whether the deadline, if any, has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Block for `duration`, waking early on deadline or cancellation.
    ///
    /// Returns `true` if the full duration elapsed. Clients use this for
    /// backoff between retries.
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> bool {
        let wait = self.remaining().map_or(duration, |left| left.min(duration));
        select! {
            recv(self.cancel) -> _ => false,
            recv(after(wait)) -> _ => wait == duration,
        }
    }

    /// A copy of this context whose deadline is at most `budget` away.
    fn within(&self, budget: Option<Duration>) -> Self {
        let mut scoped = self.clone();
        if let Some(deadline) = budget.and_then(|budget| Instant::now().checked_add(budget)) {
            scoped.deadline = Some(deadline);
        }
        scoped
    }

    /// Make a store call bounded by `limit` and the request deadline.
    ///
    /// `call` runs on the current thread and receives a context carrying
    /// the tighter of the two deadlines. A result that arrives after that
    /// deadline, or after the request was cancelled, is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::Cancelled`], [`ShelfError::Timeout`], or the
    /// store's own error wrapped in [`ShelfError::Store`].
    pub fn call<T, F>(&self, limit: Option<Duration>, call: F) -> Result<T>
    where
        F: FnOnce(&RequestContext) -> std::result::Result<T, StoreError>,
    {
        if self.is_cancelled() {
            return Err(ShelfError::Cancelled);
        }
        let budget = match (self.remaining(), limit) {
            (Some(left), Some(limit)) => Some(left.min(limit)),
            (left, limit) => left.or(limit),
        };
        if let Some(budget) = budget.filter(Duration::is_zero) {
            return Err(ShelfError::Timeout(budget));
        }

        let scoped = self.within(budget);
        let result = call(&scoped);
        if scoped.is_cancelled() {
            warn!("store call cancelled");
            return Err(ShelfError::Cancelled);
        }
        if let Some(budget) = budget.filter(|_| scoped.is_expired()) {
            warn!(?budget, "store call timed out");
            return Err(ShelfError::Timeout(budget));
        }
        result.map_err(ShelfError::from)
    }
}

/// A document store and holdings service held in memory.
///
/// Documents are kept sorted by `(shelfkey, id)`; inserting a document with
/// an existing id replaces it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shelf: Vec<CatalogDocument>,
    holdings: HashMap<String, HoldingsSnapshot>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `documents`.
    #[must_use]
    pub fn from_documents<I: IntoIterator<Item = CatalogDocument>>(documents: I) -> Self {
        let mut store = Self::new();
        for doc in documents {
            store.insert(doc);
        }
        store
    }

    /// Add or replace a document.
    pub fn insert(&mut self, doc: CatalogDocument) {
        self.shelf.retain(|existing| existing.id() != doc.id());
        let position = ShelfPosition::of(&doc);
        let at = self
            .shelf
            .partition_point(|existing| position.cmp_document(existing) == Ordering::Less);
        self.shelf.insert(at, doc);
    }

    /// Set the holdings snapshot of a document.
    pub fn set_holdings(&mut self, id: &str, snapshot: HoldingsSnapshot) {
        self.holdings.insert(id.to_string(), snapshot);
    }

    /// Builder form of [`InMemoryStore::set_holdings`].
    #[must_use]
    pub fn with_holdings(mut self, id: &str, snapshot: HoldingsSnapshot) -> Self {
        self.set_holdings(id, snapshot);
        self
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shelf.len()
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shelf.is_empty()
    }

    /// All documents in shelf order.
    #[must_use]
    pub fn documents(&self) -> &[CatalogDocument] {
        &self.shelf
    }
}

impl DocumentStore for InMemoryStore {
    fn get_document(
        &self,
        id: &str,
        _ctx: &RequestContext,
    ) -> std::result::Result<Option<CatalogDocument>, StoreError> {
        Ok(self.shelf.iter().find(|doc| doc.id() == id).cloned())
    }

    fn query_neighbors(
        &self,
        query: &NeighborQuery,
        _ctx: &RequestContext,
    ) -> std::result::Result<Vec<DocumentRef>, StoreError> {
        let split = self
            .shelf
            .partition_point(|doc| query.anchor.cmp_document(doc) == Ordering::Less);
        let found = match query.direction {
            Direction::Forward => self.shelf[split..]
                .iter()
                .skip(query.skip)
                .take(query.limit)
                .cloned()
                .map(DocumentRef::Catalog)
                .collect(),
            Direction::Backward => self.shelf[..split]
                .iter()
                .rev()
                .skip(query.skip)
                .take(query.limit)
                .cloned()
                .map(DocumentRef::Catalog)
                .collect(),
        };
        Ok(found)
    }
}

impl HoldingsService for InMemoryStore {
    fn get_holdings(
        &self,
        id: &str,
        _ctx: &RequestContext,
    ) -> std::result::Result<HoldingsSnapshot, StoreError> {
        Ok(self.holdings.get(id).cloned().unwrap_or_default())
    }
}
