//! Tests for DOM tree mutation: linking, unlinking, text merging and
//! source locations.

use koala_common::location::{Location, NodeLocation, Position};
use koala_dom::{Attribute, DomTree, ElementData, Namespace, NodeId, NodeType};

fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc_element(ElementData::new(tag, Namespace::Html, Vec::new()))
}

/// A `<div>` under the document holding one element per tag.
fn div_with(tree: &mut DomTree, tags: &[&str]) -> (NodeId, Vec<NodeId>) {
    let div = alloc_element(tree, "div");
    tree.append_child(NodeId::ROOT, div);
    let children = tags
        .iter()
        .map(|tag| {
            let id = alloc_element(tree, tag);
            tree.append_child(div, id);
            id
        })
        .collect();
    (div, children)
}

fn assert_linked(tree: &DomTree, parent: NodeId) {
    let children = tree.children(parent);
    for (i, &child) in children.iter().enumerate() {
        assert_eq!(tree.parent(child), Some(parent));
        let prev = i.checked_sub(1).map(|p| children[p]);
        assert_eq!(tree.prev_sibling(child), prev);
        assert_eq!(tree.next_sibling(child), children.get(i + 1).copied());
    }
}

#[test]
fn test_new_tree_has_document_root() {
    let tree = DomTree::new();
    assert!(matches!(
        tree.get(NodeId::ROOT).unwrap().node_type,
        NodeType::Document
    ));
    assert!(tree.children(NodeId::ROOT).is_empty());
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_remove_child_at_each_position() {
    for index in 0..3 {
        let mut tree = DomTree::new();
        let (div, children) = div_with(&mut tree, &["a", "b", "c"]);
        let removed = children[index];

        tree.remove_child(div, removed);

        let mut expected = children.clone();
        let _ = expected.remove(index);
        assert_eq!(tree.children(div), expected.as_slice());
        assert_linked(&tree, div);
        assert_eq!(tree.parent(removed), None);
        assert_eq!(tree.prev_sibling(removed), None);
        assert_eq!(tree.next_sibling(removed), None);
    }
}

#[test]
fn test_remove_child_ignores_non_children() {
    let mut tree = DomTree::new();
    let (div, children) = div_with(&mut tree, &["a"]);
    let stranger = alloc_element(&mut tree, "b");

    tree.remove_child(div, stranger);
    tree.remove_child(children[0], div);

    assert_eq!(tree.children(div), children.as_slice());
}

#[test]
fn test_insert_before_links_siblings() {
    let mut tree = DomTree::new();
    let (div, children) = div_with(&mut tree, &["a", "c"]);
    let b = alloc_element(&mut tree, "b");
    let first = alloc_element(&mut tree, "first");

    tree.insert_before(div, b, children[1]);
    tree.insert_before(div, first, children[0]);

    assert_eq!(tree.children(div), &[first, children[0], b, children[1]]);
    assert_linked(&tree, div);
}

#[test]
fn test_insert_before_moves_attached_node() {
    let mut tree = DomTree::new();
    let (div, children) = div_with(&mut tree, &["a", "b", "c"]);

    tree.insert_before(div, children[2], children[0]);

    assert_eq!(tree.children(div), &[children[2], children[0], children[1]]);
    assert_linked(&tree, div);
}

#[test]
fn test_append_child_reparents_attached_node() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, first);
    tree.append_child(NodeId::ROOT, second);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(first, child);
    tree.append_child(second, child);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[child]);
    assert_eq!(tree.parent(child), Some(second));
}

// ========== detach ==========

#[test]
fn test_detach_unlinks_siblings() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.detach(b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.parent(b), None);

    // Detaching an orphan is a no-op
    tree.detach(b);
    assert_eq!(tree.children(parent), &[a, c]);
}

// ========== text merging ==========

#[test]
fn test_append_text_merges_adjacent_text() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, parent);

    let first = tree.append_text(parent, "Hello");
    let second = tree.append_text(parent, ", world");

    assert_eq!(first, second);
    assert_eq!(tree.children(parent).len(), 1);
    assert_eq!(tree.as_text(first), Some("Hello, world"));
}

#[test]
fn test_insert_text_before_merges_with_previous_text() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);
    let table = alloc_element(&mut tree, "table");
    tree.append_child(parent, table);

    let a = tree.insert_text_before(parent, "A", table);
    let b = tree.insert_text_before(parent, "B", table);

    assert_eq!(a, b);
    assert_eq!(tree.children(parent), &[a, table]);
    assert_eq!(tree.as_text(a), Some("AB"));
    assert_eq!(tree.text_content(parent), "AB");
}

// ========== element data ==========

#[test]
fn test_element_attribute_lookup() {
    let data = ElementData::new(
        "svg",
        Namespace::Svg,
        vec![
            Attribute::new("viewBox", "0 0 1 1"),
            Attribute {
                name: "href".to_string(),
                value: "#a".to_string(),
                namespace: Some(Namespace::XLink),
                prefix: Some("xlink".to_string()),
            },
        ],
    );
    assert_eq!(data.get_attribute("viewBox"), Some("0 0 1 1"));
    assert_eq!(data.get_attribute("viewbox"), None);
    assert_eq!(data.attrs[1].qualified_name(), "xlink:href");
}

#[test]
fn test_body_ignores_foreign_elements() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let fake = tree.alloc_element(ElementData::new("body", Namespace::Svg, Vec::new()));
    tree.append_child(html, fake);
    assert_eq!(tree.body(), None);

    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, body);
    assert_eq!(tree.body(), Some(body));
}

// ========== locations ==========

#[test]
fn test_update_location_end_only_touches_located_nodes() {
    let mut tree = DomTree::new();
    let located = alloc_element(&mut tree, "p");
    let bare = alloc_element(&mut tree, "p");
    tree.set_location(
        located,
        Some(NodeLocation::from_span(Location::empty(Position::START))),
    );

    let end = Position {
        line: 1,
        col: 8,
        offset: 7,
    };
    tree.update_location_end(located, end, None);
    tree.update_location_end(bare, end, None);

    assert_eq!(tree.location(located).map(|l| l.span.end()), Some(end));
    assert!(tree.location(bare).is_none());
    assert!(matches!(tree.get(NodeId::ROOT).map(|n| &n.node_type), Some(NodeType::Document)));
}
