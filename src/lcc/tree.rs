//! The in-memory LC Classification hierarchy.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. The tree is
//! built once from an outline table and never mutated afterwards, so a
//! shared reference (or an `Arc<LccTree>`) can be read from any number of
//! threads without locking.
//!
//! Each node keeps the lower bounds of its children in ascending order, so
//! [`LccTree::lookup`] descends with one binary search per level.

use super::range::{ClassKey, LccRange};
use super::table::{read_rows, LccRow, BUNDLED_OUTLINE};
use crate::error::{Result, ShelfError};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node.
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Level of a node in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The synthetic top of the tree
    Root,
    /// Single-letter class (e.g. "Q")
    Class,
    /// Letter subclass (e.g. "QA")
    Subclass,
    /// Numeric range, possibly nested (e.g. "QA1-QA939")
    Range,
}

/// A node of the classification hierarchy.
#[derive(Debug, Clone)]
pub struct LccNode {
    id: NodeId,
    kind: NodeKind,
    table_id: String,
    range: String,
    bounds: Option<LccRange>,
    name: String,
    ascii_name: String,
    note: Option<String>,
    depth: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    artificial: bool,
}

impl LccNode {
    /// Arena id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node level.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Identifier from the outline table; artificial nodes get
    /// `"<parent id>/<letters>"`.
    #[must_use]
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Canonical range string (e.g. "QA1-QA939").
    #[must_use]
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Parsed range bounds; `None` only for the root.
    #[must_use]
    pub fn bounds(&self) -> Option<&LccRange> {
        self.bounds.as_ref()
    }

    /// Subject label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ASCII-only subject label.
    #[must_use]
    pub fn ascii_name(&self) -> &str {
        &self.ascii_name
    }

    /// Optional elaboration.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Depth below the root (root = 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Parent node; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in ascending range order.
    #[must_use]
    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node was synthesized rather than read from the table.
    #[must_use]
    pub fn is_artificial(&self) -> bool {
        self.artificial
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether a call number's class key falls in this node's range.
    #[must_use]
    pub fn contains(&self, key: &ClassKey) -> bool {
        self.bounds.as_ref().map_or(true, |b| b.contains(key))
    }
}

/// Ancestors of a call number, from the root down to the deepest node
/// whose range contains it.
#[derive(Debug, Clone)]
pub struct NodePath<'a> {
    nodes: Vec<&'a LccNode>,
}

impl<'a> NodePath<'a> {
    /// Nodes from root to deepest match.
    #[must_use]
    pub fn nodes(&self) -> &[&'a LccNode] {
        &self.nodes
    }

    /// The deepest matching node (the root when nothing matched).
    #[must_use]
    pub fn deepest(&self) -> &'a LccNode {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of nodes in the path, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a path contains at least the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate from root to deepest.
    pub fn iter(&self) -> impl Iterator<Item = &'a LccNode> + '_ {
        self.nodes.iter().copied()
    }

    /// The deepest node shared by both paths.
    #[must_use]
    pub fn common_ancestor(&self, other: &NodePath<'a>) -> &'a LccNode {
        let mut shared = self.nodes[0];
        for (a, b) in self.nodes.iter().zip(other.nodes.iter()) {
            if a.id != b.id {
                break;
            }
            shared = a;
        }
        shared
    }
}

/// The classification hierarchy.
#[derive(Debug, Clone)]
pub struct LccTree {
    nodes: Vec<LccNode>,
    child_bounds: Vec<Vec<ClassKey>>,
    by_table_id: IndexMap<String, NodeId>,
    classes: IndexMap<String, NodeId>,
    subclasses: IndexMap<String, NodeId>,
    ranges: IndexMap<String, NodeId>,
}

impl LccTree {
    /// Build the tree from the outline shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled outline is malformed.
    pub fn bundled() -> Result<Self> {
        Self::from_csv_reader(BUNDLED_OUTLINE.as_bytes())
    }

    /// Build the tree from a CSV outline file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the outline is malformed.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv_reader(File::open(path)?)
    }

    /// Build the tree from CSV outline data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be decoded or the outline is malformed.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_rows(read_rows(reader)?)
    }

    /// Build the tree from outline rows.
    ///
    /// Range rows placed directly under a class are attached to the subclass
    /// for their letters; when the table has no such subclass, an artificial
    /// one carrying the class name is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfError::LccTable`] for duplicate or unknown ids, parent
    /// cycles, unparseable ranges, classes that are not bare letters,
    /// children outside their parent's range, and overlapping siblings.
    pub fn from_rows(rows: Vec<LccRow>) -> Result<Self> {
        let order = insertion_order(&rows)?;

        let mut tree = LccTree {
            nodes: vec![LccNode {
                id: NodeId::ROOT,
                kind: NodeKind::Root,
                table_id: String::new(),
                range: "A-Z".to_string(),
                bounds: None,
                name: "Library of Congress Classification".to_string(),
                ascii_name: "Library of Congress Classification".to_string(),
                note: None,
                depth: 0,
                parent: None,
                children: Vec::new(),
                artificial: false,
            }],
            child_bounds: Vec::new(),
            by_table_id: IndexMap::new(),
            classes: IndexMap::new(),
            subclasses: IndexMap::new(),
            ranges: IndexMap::new(),
        };

        for index in order {
            tree.insert_row(&rows[index])?;
        }
        tree.sort_and_validate()?;

        let artificial = tree.nodes.iter().filter(|n| n.artificial).count();
        info!(
            nodes = tree.nodes.len(),
            classes = tree.classes.len(),
            subclasses = tree.subclasses.len(),
            artificial,
            "loaded LCC outline"
        );
        Ok(tree)
    }

    fn insert_row(&mut self, row: &LccRow) -> Result<()> {
        let parent = match row.parent() {
            None => NodeId::ROOT,
            Some(parent_id) => self.by_table_id.get(parent_id).copied().ok_or_else(|| {
                ShelfError::LccTable(format!("row {:?}: unknown parent {parent_id:?}", row.id))
            })?,
        };
        let range = LccRange::parse(&row.range).ok_or_else(|| {
            ShelfError::LccTable(format!("row {:?}: unparseable range {:?}", row.id, row.range))
        })?;
        let bare_letters = range.lower().is_letters() && range.upper().is_letters();

        let parent_kind = self.nodes[parent.0].kind;
        let (kind, parent, bounds) = match parent_kind {
            NodeKind::Root => {
                if !bare_letters || range.lower() != range.upper() {
                    return Err(ShelfError::LccTable(format!(
                        "class row {:?} must be bare class letters, got {:?}",
                        row.id, row.range
                    )));
                }
                (NodeKind::Class, parent, range)
            },
            NodeKind::Class if bare_letters && range.lower() == range.upper() => (
                NodeKind::Subclass,
                parent,
                LccRange::for_letters(range.lower().letters()),
            ),
            NodeKind::Class => {
                let letters = range.lower().letters().to_string();
                (NodeKind::Range, self.subclass_for(parent, &letters), range)
            },
            NodeKind::Subclass | NodeKind::Range => (NodeKind::Range, parent, range),
        };

        let id = self.push_node(LccNode {
            id: NodeId(self.nodes.len()),
            kind,
            table_id: row.id.clone(),
            range: bounds.to_string(),
            bounds: Some(bounds),
            name: row.name.clone(),
            ascii_name: row.effective_ascii_name(),
            note: row.note.clone(),
            depth: self.nodes[parent.0].depth + 1,
            parent: Some(parent),
            children: Vec::new(),
            artificial: false,
        });
        self.by_table_id.insert(row.id.clone(), id);
        if kind == NodeKind::Range {
            self.ranges.insert(row.range.trim().to_string(), id);
        }
        Ok(())
    }

    /// Find or synthesize the subclass of `class` for `letters`.
    fn subclass_for(&mut self, class: NodeId, letters: &str) -> NodeId {
        let existing = self.nodes[class.0].children.iter().copied().find(|&child| {
            let node = &self.nodes[child.0];
            node.kind == NodeKind::Subclass
                && node.bounds.as_ref().map(|b| b.lower().letters()) == Some(letters)
        });
        if let Some(id) = existing {
            return id;
        }

        let class_node = &self.nodes[class.0];
        let node = LccNode {
            id: NodeId(self.nodes.len()),
            kind: NodeKind::Subclass,
            table_id: format!("{}/{letters}", class_node.table_id),
            range: letters.to_string(),
            bounds: Some(LccRange::for_letters(letters)),
            name: class_node.name.clone(),
            ascii_name: class_node.ascii_name.clone(),
            note: None,
            depth: class_node.depth + 1,
            parent: Some(class),
            children: Vec::new(),
            artificial: true,
        };
        debug!(letters, class = %class_node.table_id, "inserted artificial subclass");
        self.push_node(node)
    }

    fn push_node(&mut self, node: LccNode) -> NodeId {
        let id = node.id;
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        match node.kind {
            NodeKind::Class => {
                self.classes.insert(node.range.clone(), id);
            },
            NodeKind::Subclass => {
                self.subclasses.insert(node.range.clone(), id);
            },
            NodeKind::Range => {
                self.ranges.insert(node.range.clone(), id);
            },
            NodeKind::Root => {},
        }
        self.nodes.push(node);
        id
    }

    fn sort_and_validate(&mut self) -> Result<()> {
        let mut child_bounds = Vec::with_capacity(self.nodes.len());
        for index in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[index].children);
            children.sort_by(|a, b| self.lower_of(*a).cmp(&self.lower_of(*b)));

            let parent = &self.nodes[index];
            for pair in children.windows(2) {
                let (prev, next) = (&self.nodes[pair[0].0], &self.nodes[pair[1].0]);
                if let (Some(p), Some(n)) = (&prev.bounds, &next.bounds) {
                    if p.overlaps_next(n) {
                        return Err(ShelfError::LccTable(format!(
                            "overlapping ranges {} and {} under {:?}",
                            prev.range, next.range, parent.table_id
                        )));
                    }
                }
            }
            if let Some(parent_bounds) = &parent.bounds {
                for &child in &children {
                    let node = &self.nodes[child.0];
                    if !node.bounds.as_ref().is_some_and(|b| parent_bounds.encloses(b)) {
                        return Err(ShelfError::LccTable(format!(
                            "range {} of {:?} is outside parent {}",
                            node.range, node.table_id, parent.range
                        )));
                    }
                }
            }

            child_bounds.push(
                children
                    .iter()
                    .filter_map(|c| self.lower_of(*c).cloned())
                    .collect(),
            );
            self.nodes[index].children = children;
        }
        self.child_bounds = child_bounds;
        Ok(())
    }

    /// Only the root lacks bounds, and the root is never a child.
    fn lower_of(&self, id: NodeId) -> Option<&ClassKey> {
        self.nodes[id.0].bounds.as_ref().map(LccRange::lower)
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &LccNode {
        &self.nodes[0]
    }

    /// Node by arena id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &LccNode {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the tree contains at least the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &LccNode> {
        self.nodes.iter()
    }

    /// Children of a node in ascending range order.
    pub fn children<'a>(&'a self, node: &'a LccNode) -> impl Iterator<Item = &'a LccNode> + 'a {
        node.children.iter().map(move |id| &self.nodes[id.0])
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, node: &LccNode) -> Option<&LccNode> {
        node.parent.map(|id| &self.nodes[id.0])
    }

    /// The subtree of a class, by its letter (e.g. "Q").
    #[must_use]
    pub fn class_tree(&self, letter: &str) -> Option<&LccNode> {
        self.classes
            .get(&letter.trim().to_ascii_uppercase())
            .map(|id| &self.nodes[id.0])
    }

    /// The subtree of a subclass, by its letters (e.g. "QA").
    #[must_use]
    pub fn subclass_tree(&self, letters: &str) -> Option<&LccNode> {
        self.subclasses
            .get(&letters.trim().to_ascii_uppercase())
            .map(|id| &self.nodes[id.0])
    }

    /// The subtree of a range, by range string in either table or
    /// canonical form ("QA1-939" or "QA1-QA939").
    #[must_use]
    pub fn range_tree(&self, range: &str) -> Option<&LccNode> {
        let range = range.trim();
        self.ranges
            .get(range)
            .or_else(|| {
                LccRange::parse(range).and_then(|parsed| self.ranges.get(&parsed.to_string()))
            })
            .map(|id| &self.nodes[id.0])
    }

    /// A node by its outline table id.
    #[must_use]
    pub fn by_table_id(&self, id: &str) -> Option<&LccNode> {
        self.by_table_id.get(id).map(|id| &self.nodes[id.0])
    }

    /// Locate a call number in the hierarchy.
    ///
    /// The path always starts at the root and ends at the deepest node whose
    /// range contains the call number; a call number that does not tokenize
    /// as LC yields just the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use vshelf::lcc::LccTree;
    ///
    /// let tree = LccTree::bundled().unwrap();
    /// let path = tree.lookup("QA76.73 .C15 2021");
    /// let names: Vec<_> = path.iter().skip(1).map(|n| n.name()).collect();
    /// assert_eq!(names[0], "Science");
    /// assert_eq!(path.deepest().name(), "Electronic computers. Computer science");
    /// ```
    #[must_use]
    pub fn lookup(&self, call_number: &str) -> NodePath<'_> {
        let mut nodes = vec![self.root()];
        let Some(key) = ClassKey::parse(call_number) else {
            return NodePath { nodes };
        };

        let mut current = NodeId::ROOT;
        loop {
            let bounds = &self.child_bounds[current.0];
            let idx = bounds.partition_point(|lower| *lower <= key);
            if idx == 0 {
                break;
            }
            let candidate = self.nodes[current.0].children[idx - 1];
            let node = &self.nodes[candidate.0];
            if !node.contains(&key) {
                break;
            }
            nodes.push(node);
            current = candidate;
        }
        NodePath { nodes }
    }
}

/// Order rows so every parent is inserted before its children.
fn insertion_order(rows: &[LccRow]) -> Result<Vec<usize>> {
    let mut index: IndexMap<&str, usize> = IndexMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.id.trim().is_empty() {
            return Err(ShelfError::LccTable(format!("row {} has an empty id", i + 1)));
        }
        if index.insert(row.id.as_str(), i).is_some() {
            return Err(ShelfError::LccTable(format!("duplicate id {:?}", row.id)));
        }
    }

    let mut depths = Vec::with_capacity(rows.len());
    for row in rows {
        let mut depth = 0usize;
        let mut current = row;
        while let Some(parent_id) = current.parent() {
            let parent = *index.get(parent_id).ok_or_else(|| {
                ShelfError::LccTable(format!(
                    "row {:?} refers to unknown parent {parent_id:?}",
                    current.id
                ))
            })?;
            depth += 1;
            if depth > rows.len() {
                return Err(ShelfError::LccTable(format!(
                    "parent cycle through {:?}",
                    row.id
                )));
            }
            current = &rows[parent];
        }
        depths.push(depth);
    }

    // Bare-letter rows first within a depth, so table subclasses exist
    // before range rows under the class look for them.
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by_key(|&i| {
        let numbered = rows[i].range.chars().any(|c| c.is_ascii_digit());
        (depths[i], numbered)
    });
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<LccRow> {
        vec![
            LccRow::new("Q", "Q", "Science", None),
            LccRow::new("QA", "QA", "Mathematics", Some("Q")),
            LccRow::new("QA1-939", "QA1-939", "Mathematics", Some("QA")),
            LccRow::new("QA1-43", "QA1-43", "General", Some("QA1-939")),
            LccRow::new("QA71-90", "QA71-90", "Instruments and machines", Some("QA1-939")),
            LccRow::new("Q1-390", "Q1-390", "Science (General)", Some("Q")),
            LccRow::new("E", "E", "History of the Americas", None),
            LccRow::new("E151-889", "E151-889", "United States", Some("E")),
        ]
    }

    #[test]
    fn test_build_kinds_and_depths() {
        let tree = LccTree::from_rows(rows()).unwrap();
        let q = tree.class_tree("q").unwrap();
        assert_eq!(q.kind(), NodeKind::Class);
        assert_eq!(q.depth(), 1);

        let qa = tree.subclass_tree("QA").unwrap();
        assert_eq!(qa.kind(), NodeKind::Subclass);
        assert_eq!(qa.depth(), 2);
        assert!(!qa.is_artificial());

        let range = tree.range_tree("QA1-QA43").unwrap();
        assert_eq!(range.kind(), NodeKind::Range);
        assert_eq!(range.depth(), 4);
        assert_eq!(range.range(), "QA1-QA43");
        assert_eq!(tree.range_tree("QA1-43").unwrap().id(), range.id());
    }

    #[test]
    fn test_artificial_subclass_inserted() {
        let tree = LccTree::from_rows(rows()).unwrap();
        let q = tree.subclass_tree("Q").unwrap();
        assert!(q.is_artificial());
        assert_eq!(q.name(), "Science");
        assert_eq!(q.table_id(), "Q/Q");
        assert_eq!(tree.children(q).count(), 1);

        // Children sorted by range: Q before QA.
        let class = tree.class_tree("Q").unwrap();
        let names: Vec<_> = tree.children(class).map(LccNode::range).collect();
        assert_eq!(names, vec!["Q", "QA"]);

        let e = tree.subclass_tree("E").unwrap();
        assert!(e.is_artificial());
        assert_eq!(tree.range_tree("E151-889").unwrap().depth(), 3);
    }

    #[test]
    fn test_lookup_descends_to_deepest() {
        let tree = LccTree::from_rows(rows()).unwrap();
        let path = tree.lookup("QA76.73 .C15");
        let ranges: Vec<_> = path.iter().map(LccNode::range).collect();
        assert_eq!(ranges, vec!["A-Z", "Q", "QA", "QA1-QA939", "QA71-QA90"]);

        // In QA1-939 but in none of its children.
        let path = tree.lookup("QA50");
        assert_eq!(path.deepest().range(), "QA1-QA939");

        let path = tree.lookup("Q100");
        assert_eq!(path.deepest().range(), "Q1-Q390");
    }

    #[test]
    fn test_lookup_partial_and_unparseable() {
        let tree = LccTree::from_rows(rows()).unwrap();
        assert_eq!(tree.lookup("R1").len(), 1);
        assert_eq!(tree.lookup("Microfilm 12").len(), 1);
        assert_eq!(tree.lookup("QB1").deepest().range(), "Q");
    }

    #[test]
    fn test_common_ancestor() {
        let tree = LccTree::from_rows(rows()).unwrap();
        let a = tree.lookup("QA5");
        let b = tree.lookup("QA80");
        assert_eq!(a.common_ancestor(&b).range(), "QA1-QA939");
        let c = tree.lookup("E200");
        assert_eq!(a.common_ancestor(&c).kind(), NodeKind::Root);
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let mut rows = rows();
        rows.push(LccRow::new("QA", "QA", "Again", Some("Q")));
        assert!(matches!(LccTree::from_rows(rows), Err(ShelfError::LccTable(_))));
    }

    #[test]
    fn test_unknown_parent_is_fatal() {
        let mut rows = rows();
        rows.push(LccRow::new("QB", "QB", "Astronomy", Some("Nope")));
        assert!(matches!(LccTree::from_rows(rows), Err(ShelfError::LccTable(_))));
    }

    #[test]
    fn test_cycle_is_fatal() {
        let rows = vec![
            LccRow::new("A1", "QA1-5", "One", Some("A2")),
            LccRow::new("A2", "QA1-9", "Two", Some("A1")),
        ];
        assert!(matches!(LccTree::from_rows(rows), Err(ShelfError::LccTable(_))));
    }

    #[test]
    fn test_overlap_is_fatal() {
        let mut rows = rows();
        rows.push(LccRow::new("QA40-50", "QA40-50", "Overlap", Some("QA1-939")));
        let err = LccTree::from_rows(rows).unwrap_err();
        assert!(err.to_string().contains("overlapping"));
    }

    #[test]
    fn test_child_outside_parent_is_fatal() {
        let mut rows = rows();
        rows.push(LccRow::new("QA900-999", "QA900-999", "Outside", Some("QA1-939")));
        let err = LccTree::from_rows(rows).unwrap_err();
        assert!(err.to_string().contains("outside parent"));
    }

    #[test]
    fn test_class_must_be_letters() {
        let rows = vec![LccRow::new("Q", "Q1-5", "Science", None)];
        assert!(matches!(LccTree::from_rows(rows), Err(ShelfError::LccTable(_))));
    }

    #[test]
    fn test_bad_range_is_fatal() {
        let mut rows = rows();
        rows.push(LccRow::new("bad", "not a range", "Bad", Some("QA")));
        assert!(matches!(LccTree::from_rows(rows), Err(ShelfError::LccTable(_))));
    }
}
