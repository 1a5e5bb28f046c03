//! Integration tests for the classification outline.

mod common;

use common::{bundled_tree, SMALL_OUTLINE};
use std::io::Write;
use tempfile::NamedTempFile;
use vshelf::lcc::{render_tree, ClassKey, LccNode, LccTree, NodeKind, TreeOptions};
use vshelf::ShelfError;

#[test]
fn test_every_leaf_range_is_reachable() {
    let tree = bundled_tree();
    let leaves: Vec<&LccNode> = tree
        .nodes()
        .filter(|node| node.kind() == NodeKind::Range && node.is_leaf())
        .collect();
    assert!(leaves.len() > 40);

    for leaf in leaves {
        let lower = leaf.bounds().unwrap().lower().to_string();
        let path = tree.lookup(&lower);
        assert_eq!(
            path.deepest().id(),
            leaf.id(),
            "{lower} resolved to {}",
            path.deepest().range()
        );
    }
}

#[test]
fn test_paths_descend_one_level_at_a_time() {
    let tree = bundled_tree();
    for call_number in ["QA76.75 .S65", "PS3545 .I345", "KF3319 .A2", "LD2001 .H4", "F1219 .C6"] {
        let path = tree.lookup(call_number);
        assert_eq!(path.nodes()[0].kind(), NodeKind::Root);
        for (depth, node) in path.iter().enumerate() {
            assert_eq!(node.depth(), depth, "{call_number}");
            if depth > 0 {
                assert!(node.contains(&ClassKey::parse(call_number).unwrap()));
            }
        }
    }
}

#[test]
fn test_longer_letters_do_not_fall_into_shorter_subclass() {
    let tree = bundled_tree();
    assert_eq!(tree.lookup("KFA1 .A5").deepest().range(), "KFA1-KFA4999");
    assert_eq!(tree.lookup("KF1 .A5").deepest().range(), "KF1-KF9827");
    // KG is not in the outline; only the class matches.
    assert_eq!(tree.lookup("KG100").deepest().kind(), NodeKind::Class);
}

#[test]
fn test_small_outline_from_reader() {
    let tree = LccTree::from_csv_reader(SMALL_OUTLINE.as_bytes()).unwrap();

    let music = tree.class_tree("M").unwrap();
    let subclasses: Vec<_> = tree.children(music).map(LccNode::range).collect();
    assert_eq!(subclasses, vec!["M", "ML", "MT"]);
    assert!(tree.subclass_tree("M").unwrap().is_artificial());
    assert!(!tree.subclass_tree("ML").unwrap().is_artificial());

    let path = tree.lookup("ML410 .B4 1990");
    assert_eq!(path.deepest().name(), "Biography of composers");
    assert_eq!(path.deepest().note(), Some("Individual composers A-Z"));
    assert_eq!(path.len(), 5);

    assert_eq!(tree.lookup("M1 .A15").deepest().name(), "Collections");
    assert_eq!(tree.lookup("M20").deepest().range(), "M1-M5000");
}

#[test]
fn test_small_outline_from_path() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SMALL_OUTLINE.as_bytes()).unwrap();
    file.flush().unwrap();

    let tree = LccTree::from_csv_path(file.path()).unwrap();
    assert!(tree.by_table_id("MT1-960").is_some());
    assert_eq!(tree.range_tree("MT1-MT960").unwrap().name(), "Instruction and study");
}

#[test]
fn test_missing_outline_file() {
    let err = LccTree::from_csv_path("/nonexistent/outline.csv").unwrap_err();
    assert!(matches!(err, ShelfError::IoError(_)));
}

#[test]
fn test_malformed_outline_is_fatal() {
    let duplicate = format!("{SMALL_OUTLINE}ML,ML,Again,,,M\n");
    assert!(matches!(
        LccTree::from_csv_reader(duplicate.as_bytes()),
        Err(ShelfError::LccTable(_))
    ));

    let orphan = format!("{SMALL_OUTLINE}MZ1-5,MZ1-5,Orphan,,,MZ\n");
    assert!(matches!(
        LccTree::from_csv_reader(orphan.as_bytes()),
        Err(ShelfError::LccTable(_))
    ));

    let outside = format!("{SMALL_OUTLINE}MT2000-2100,MT2000-2100,Outside,,,MT1-960\n");
    assert!(matches!(
        LccTree::from_csv_reader(outside.as_bytes()),
        Err(ShelfError::LccTable(_))
    ));
}

#[test]
fn test_render_collapses_exception_subclass() {
    let tree = bundled_tree();
    let ld = tree.subclass_tree("LD").unwrap();
    let rendered = render_tree(&tree, ld, TreeOptions::default());

    let ranges: Vec<_> = rendered.children.iter().map(|c| c.range.as_str()).collect();
    assert_eq!(ranges, vec!["LD13-LD2999", "LD3001-LD7251"]);
    assert_eq!(rendered.children[0].level, "Topic");
}

#[test]
fn test_render_keeps_named_single_child() {
    let tree = LccTree::from_csv_reader(SMALL_OUTLINE.as_bytes()).unwrap();
    let music = tree.class_tree("M").unwrap();
    let rendered = render_tree(&tree, music, TreeOptions::default().include_notes(true));

    // The artificial M subclass holds a real range, so it stays and
    // borrows the class label.
    let artificial = &rendered.children[0];
    assert_eq!(artificial.label, "Music");
    assert_eq!(artificial.children[0].range, "M1-M5000");

    let biography = rendered.find("ML410").unwrap();
    assert_eq!(biography.note.as_deref(), Some("Individual composers A-Z"));
    assert_eq!(rendered.count(), tree.len() - 1);
}

#[test]
fn test_render_max_depth_truncates() {
    let tree = bundled_tree();
    let rendered = render_tree(&tree, tree.root(), TreeOptions::default().max_depth(1));
    assert_eq!(rendered.level, "Classification");
    assert!(rendered.children.iter().all(|class| class.children.is_empty()));
    assert!(rendered.children.iter().all(|class| class.truncated));
}

#[test]
fn test_rendered_tree_serializes() {
    let tree = bundled_tree();
    let rendered = render_tree(&tree, tree.class_tree("Q").unwrap(), TreeOptions::default());
    let json = serde_json::to_value(&rendered).unwrap();
    assert_eq!(json["label"], "Science");
    assert!(json.get("note").is_none());
    assert!(json["children"].as_array().unwrap().len() >= 4);
}
