//! Library of Congress Classification hierarchy.
//!
//! The hierarchy is built once from a static outline table and is read-only
//! afterwards:
//!
//! ```text
//! Root
//! └── Class        Q     Science
//!     ├── Subclass Q     (artificial, holds Q1-Q390)
//!     └── Subclass QA    Mathematics
//!         └── Range QA1-QA939
//!             └── Range QA71-QA90 ...
//! ```
//!
//! # Examples
//!
//! ```
//! use vshelf::lcc::{render_tree, LccTree, TreeOptions};
//!
//! let tree = LccTree::bundled()?;
//! let path = tree.lookup("PS3537.A426 Z9");
//! assert_eq!(path.deepest().name(), "1900-1960");
//!
//! let nav = render_tree(&tree, tree.class_tree("P").unwrap(), TreeOptions::default());
//! assert_eq!(nav.label, "Language and Literature");
//! # Ok::<(), vshelf::ShelfError>(())
//! ```
//!
//! # Modules
//!
//! - `range`: call-number ranges and class keys
//! - `table`: outline table loading
//! - `tree`: the node arena and lookups
//! - `display`: collapsing rules and navigation-tree rendering

mod display;
mod range;
mod table;
mod tree;

pub use display::{
    effective_children, effective_depth, effective_name, is_collapsible_subclass, level_name,
    render_tree, TreeNode, TreeOptions, COLLAPSIBLE_SUBCLASSES,
};
pub use range::{ClassKey, LccRange};
pub use table::{ascii_fold, read_rows, LccRow, BUNDLED_OUTLINE};
pub use tree::{LccNode, LccTree, NodeId, NodeKind, NodePath};
