use std::ops::{Index, IndexMut};

use super::node::{Node, NodeId, NodeKind};

/// Arena storage for document nodes.
///
/// Nodes are never freed individually; a detached node simply stops being
/// reachable from its former parent.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new unattached node.
    pub fn new_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// `child` is detached from its previous position first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        match self.last_child(parent) {
            Some(last) => {
                self[last].next = Some(child);
                self[child].prev = Some(last);
            }
            None => self[parent].child = Some(child),
        }
        self[child].parent = Some(parent);
    }

    /// Inserts `node` as the sibling right before `sibling`.
    ///
    /// `node` is detached from its previous position first.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        self.detach(node);
        let (parent, prev) = (self[sibling].parent, self[sibling].prev);
        match prev {
            Some(p) => self[p].next = Some(node),
            None => {
                if let Some(parent) = parent {
                    self[parent].child = Some(node);
                }
            }
        }
        let n = &mut self[node];
        n.parent = parent;
        n.prev = prev;
        n.next = Some(sibling);
        self[sibling].prev = Some(node);
    }

    /// Unlinks a node from its parent and siblings.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let n = &self[id];
            (n.parent, n.prev, n.next)
        };
        if let Some(p) = prev {
            self[p].next = next;
        } else if let Some(parent) = parent
            && self[parent].child == Some(id)
        {
            self[parent].child = next;
        }
        if let Some(n) = next {
            self[n].prev = prev;
        }
        let n = &mut self[id];
        n.parent = None;
        n.prev = None;
        n.next = None;
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        let mut c = self[id].child?;
        while let Some(n) = self[c].next {
            c = n;
        }
        Some(c)
    }

    /// Iterates over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self[id].child,
        }
    }

    /// Iterates from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self[id].parent,
        }
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self[id].child.is_some()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree[id].next;
        Some(id)
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree[id].parent;
        Some(id)
    }
}
