#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # vshelf: virtual shelf browse
//!
//! Browse a library catalog the way a reader browses a shelf: start at one
//! item and page through its neighbors in call-number order.
//!
//! ## Quick Start
//!
//! ```
//! use vshelf::browse::{BrowseEngine, BrowseRequest, OffsetSpec};
//! use vshelf::config::ShelfConfig;
//! use vshelf::document::CatalogDocument;
//! use vshelf::lcc::LccTree;
//! use vshelf::range_display::describe_window;
//! use vshelf::store::InMemoryStore;
//!
//! # fn main() -> vshelf::Result<()> {
//! let store = InMemoryStore::from_documents([
//!     CatalogDocument::new("a", "QA76.73 .C15 S63 2021"),
//!     CatalogDocument::new("b", "QA76.73 .J38 2019"),
//!     CatalogDocument::new("c", "QA76.9 .D3 2003"),
//! ]);
//! let config = ShelfConfig::default();
//! let engine = BrowseEngine::new(store, config.browse)?;
//!
//! let request = BrowseRequest::document("b").width(3).offset(OffsetSpec::Middle);
//! let window = engine.browse(&request)?;
//! assert_eq!(window.origin_index(), Some(1));
//!
//! let tree = LccTree::bundled()?;
//! let description = describe_window(&window, &tree).unwrap();
//! assert_eq!(description.label(), "QA76.73 .C15 - QA76.9 .D3");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`call_number`] — Call number tokenizing and normalization
//! - [`shelfkey`] — Sortable shelfkeys and reverse shelfkeys
//! - [`lcc`] — Library of Congress Classification outline
//! - [`document`] — Shelf slots: catalog documents and placeholders
//! - [`store`] — Document store and holdings service interfaces
//! - [`browse`] — Browse window engine
//! - [`holdings`] — Holdings snapshots
//! - [`status`] — Status marker engine
//! - [`range_display`] — Window range labels
//! - [`config`] — Engine configuration
//! - [`error`] — Error types and result type

pub mod browse;
pub mod call_number;
pub mod config;
pub mod document;
pub mod error;
pub mod holdings;
/// Library of Congress Classification outline.
///
/// See the [`lcc`] module documentation for the tree structure and the
/// collapsing rules applied when rendering navigation trees.
pub mod lcc;
pub mod range_display;
pub mod shelfkey;
pub mod status;
pub mod store;

pub use browse::{BrowseEngine, BrowseRequest, BrowseWindow, OffsetSpec, OriginSpec};
pub use call_number::CallNumber;
pub use config::{BrowseConfig, ShelfConfig, SiteRule, StatusConfig};
pub use document::{CatalogDocument, DocumentRef, Placeholder};
pub use error::{Result, ShelfError, StoreError};
pub use holdings::{HoldingsSnapshot, HoldingsSnapshotBuilder, ItemCopy, PdaStatus};
pub use lcc::{LccNode, LccTree, NodePath, TreeNode, TreeOptions};
pub use range_display::{describe_window, minimal_distinguishing_pair, WindowDescription};
pub use shelfkey::ShelfKey;
pub use status::{MarkerOptions, StatusEngine, StatusMarkerSet};
pub use store::{
    DocumentStore, HoldingsService, InMemoryStore, NeighborQuery, RequestContext, ShelfPosition,
};
