//! Navigation-tree rendering of the classification hierarchy.
//!
//! The outline contains many single-child chains that add nothing to a
//! navigation tree. Two collapsing rules apply when rendering:
//!
//! - A class whose only child has no distinct subject name (an artificial
//!   subclass, or one named like the class) is shown with that child's
//!   children directly, under the class label.
//! - A subclass with exactly one child is collapsed down its chain of single
//!   children while those children are artificial, or unconditionally for
//!   the subclasses in [`COLLAPSIBLE_SUBCLASSES`].
//!
//! Collapsed levels do not count towards the effective depth used to name
//! levels, so a range shown directly under its class is labelled as if it
//! sat at subclass level.

use super::tree::{LccNode, LccTree, NodeKind};
use serde::Serialize;

/// Subclasses whose intermediate outline levels are collapsed regardless
/// of whether they are artificial. The outline subdivides institutions in
/// LD and LE by name ranges that carry no subject information.
pub const COLLAPSIBLE_SUBCLASSES: &[&str] = &["LD", "LE"];

/// Options for [`render_tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeOptions {
    /// Use ASCII-only labels
    pub ascii: bool,
    /// Do not render below this effective depth
    pub max_depth: Option<usize>,
    /// Include notes on rendered nodes
    pub include_notes: bool,
}

impl TreeOptions {
    /// Use ASCII-only labels.
    #[must_use]
    pub fn ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    /// Limit rendering depth.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Include notes.
    #[must_use]
    pub fn include_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }
}

/// A rendered navigation tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Outline id of the node
    pub id: String,
    /// Subject label
    pub label: String,
    /// Canonical range string
    pub range: String,
    /// Level name derived from the effective depth
    pub level: &'static str,
    /// Depth after collapsing (root = 0)
    pub effective_depth: usize,
    /// Note, when requested and present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Whether children were cut off by `max_depth`
    pub truncated: bool,
    /// Rendered children
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, itself included.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Find a descendant (or self) by outline id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Level name for an effective depth.
#[must_use]
pub fn level_name(effective_depth: usize) -> &'static str {
    match effective_depth {
        0 => "Classification",
        1 => "Class",
        2 => "Subclass",
        3 => "Topic",
        _ => "Sub-topic",
    }
}

/// Whether a subclass is one of the named collapsing exceptions.
#[must_use]
pub fn is_collapsible_subclass(node: &LccNode) -> bool {
    node.kind() == NodeKind::Subclass && COLLAPSIBLE_SUBCLASSES.contains(&node.range())
}

/// The label to show for a node. Artificial nodes have no subject of their
/// own and borrow the nearest real ancestor's label.
#[must_use]
pub fn effective_name<'a>(tree: &'a LccTree, node: &'a LccNode, ascii: bool) -> &'a str {
    let mut current = node;
    while current.is_artificial() {
        match tree.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    if ascii {
        current.ascii_name()
    } else {
        current.name()
    }
}

/// Children to display under `node` after applying the collapsing rules.
#[must_use]
pub fn effective_children<'a>(tree: &'a LccTree, node: &'a LccNode) -> Vec<&'a LccNode> {
    let source = match node.kind() {
        NodeKind::Class => match node.child_ids() {
            [only] => {
                let child = tree.node(*only);
                if child.is_artificial() || child.name() == node.name() {
                    collapse_chain(tree, child)
                } else {
                    node
                }
            },
            _ => node,
        },
        NodeKind::Subclass => collapse_chain(tree, node),
        NodeKind::Root | NodeKind::Range => node,
    };
    tree.children(source).collect()
}

/// Follow single-child links below a subclass while they may be collapsed.
fn collapse_chain<'a>(tree: &'a LccTree, subclass: &'a LccNode) -> &'a LccNode {
    let exception = is_collapsible_subclass(subclass);
    let mut end = subclass;
    while let [only] = end.child_ids() {
        let child = tree.node(*only);
        if !(child.is_artificial() || exception) {
            break;
        }
        end = child;
    }
    end
}

/// Render the subtree rooted at `node` as a navigation tree.
///
/// # Examples
///
/// ```
/// use vshelf::lcc::{render_tree, LccTree, TreeOptions};
///
/// let tree = LccTree::bundled().unwrap();
/// let class = tree.class_tree("E").unwrap();
/// let rendered = render_tree(&tree, class, TreeOptions::default());
///
/// // The artificial "E" subclass is elided; its ranges hang off the class.
/// assert_eq!(rendered.children[0].range, "E11-E143");
/// assert_eq!(rendered.children[0].level, "Subclass");
/// ```
#[must_use]
pub fn render_tree(tree: &LccTree, node: &LccNode, options: TreeOptions) -> TreeNode {
    // Any entry point starts at the depth its ancestors give it once
    // collapsed, so labels match those of the full tree. An elided node
    // shares the depth of the ancestor that absorbed it.
    let depth = match node.kind() {
        NodeKind::Root => 0,
        _ => effective_depth(tree, node),
    };
    render_at(tree, node, depth, options)
}

fn render_at(tree: &LccTree, node: &LccNode, depth: usize, options: TreeOptions) -> TreeNode {
    let children = effective_children(tree, node);
    let stop = options.max_depth.is_some_and(|max| depth >= max);

    TreeNode {
        id: node.table_id().to_string(),
        label: effective_name(tree, node, options.ascii).to_string(),
        range: node.range().to_string(),
        level: level_name(depth),
        effective_depth: depth,
        note: if options.include_notes {
            node.note().map(str::to_string)
        } else {
            None
        },
        truncated: stop && !children.is_empty(),
        children: if stop {
            Vec::new()
        } else {
            children
                .into_iter()
                .map(|child| render_at(tree, child, depth + 1, options))
                .collect()
        },
    }
}

/// Depth of a node once collapsed levels above it are discounted.
#[must_use]
pub fn effective_depth(tree: &LccTree, node: &LccNode) -> usize {
    let mut ancestors = Vec::new();
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        ancestors.push(parent);
        current = parent;
    }

    let mut depth = 0;
    let mut visible = tree.root();
    for ancestor in ancestors.iter().rev().skip(1).chain(std::iter::once(&node)) {
        if effective_children(tree, visible)
            .iter()
            .any(|c| c.id() == ancestor.id())
        {
            depth += 1;
            visible = *ancestor;
        }
    }
    depth
}
