use crate::models::{Document, NodeId};

/// Asserts the structural invariants of every node reachable from the root,
/// including title and label sub-trees.
///
/// - every child points back to its parent
/// - `next.prev` and `prev.next` agree
/// - no node keeps unparsed raw text next to parsed children
pub fn check(doc: &Document) {
    check_node(doc, doc.root);
    if let Some(t) = doc.header.title {
        check_node(doc, t);
    }
    for f in doc.footnotes() {
        check_node(doc, f.content);
    }
}

fn check_node(doc: &Document, id: NodeId) {
    let n = &doc.tree[id];
    assert!(
        n.raw.is_empty() || n.child.is_none(),
        "node {id:?} ({:?}) has both raw text {:?} and children",
        n.kind,
        n.raw
    );
    if let Some(next) = n.next {
        assert_eq!(
            doc.tree[next].prev,
            Some(id),
            "next.prev mismatch at {id:?} ({:?})",
            n.kind
        );
    }
    if let Some(prev) = n.prev {
        assert_eq!(
            doc.tree[prev].next,
            Some(id),
            "prev.next mismatch at {id:?} ({:?})",
            n.kind
        );
    }
    for c in doc.tree.children(id) {
        assert_eq!(
            doc.tree[c].parent,
            Some(id),
            "child {c:?} of {id:?} ({:?}) has wrong parent",
            n.kind
        );
        check_node(doc, c);
    }
    for sub in [n.title, n.label].into_iter().flatten() {
        assert_eq!(doc.tree[sub].parent, None, "sub-tree {sub:?} is attached");
        check_node(doc, sub);
    }
}
