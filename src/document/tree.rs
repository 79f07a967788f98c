use std::collections::{HashMap, HashSet};

use crate::{
    document::node::{Node, NodeId, NodeKind},
    foundation::error::{EditError, EditResult},
};

/// In-memory edit-decision document.
///
/// Nodes live in an arena and refer to each other through [`NodeId`] parent/child lists.
/// Cross references between subtrees (track to playlist, entry to producer) are plain id
/// strings resolved through an index that covers every node reachable from the root. The
/// index is updated on every attach, detach and `id` change, so lookups never go stale.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty project with an `<mlt>` root.
    pub fn new() -> Self {
        Self::with_root(NodeKind::Mlt)
    }

    /// Empty document with a root of the given kind.
    pub fn with_root(kind: NodeKind) -> Self {
        Self {
            nodes: vec![Node::new(kind)],
            root: NodeId(0),
            ids: HashMap::new(),
        }
    }

    /// Project root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node.
    ///
    /// Panics if `id` was not produced by this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Element kind of `id`.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Attribute value by name.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attr(name)
    }

    /// Ordered children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// First child of `id`.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Last child of `id`.
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Children of `id` with the given kind, in order.
    pub fn children_of_kind<'a>(
        &'a self,
        id: NodeId,
        kind: &'a NodeKind,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.kind(*c) == kind)
    }

    /// Sibling immediately before `id`.
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Position of `id` among its parent's children.
    pub fn child_position(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Look up an attached node by its `id` attribute.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Like [`Document::find`], but a miss is a dangling reference.
    pub fn resolve(&self, id: &str) -> EditResult<NodeId> {
        self.find(id).ok_or_else(|| EditError::unresolved(id))
    }

    /// `true` when `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == self.root {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Allocate a detached node with attributes.
    pub fn create_with_attrs(&mut self, kind: NodeKind, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create(kind);
        self.nodes[id.0].attrs = attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        id
    }

    /// Set (or replace) an attribute.
    ///
    /// Renaming the `id` of an attached node keeps the lookup index in sync and fails with
    /// [`EditError::DuplicateId`] if another attached node already uses the new id.
    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> EditResult<()> {
        let value = value.into();
        if name == "id" && self.is_attached(id) {
            if let Some(other) = self.find(&value)
                && other != id
            {
                return Err(EditError::DuplicateId(value));
            }
            if let Some(old) = self.attr(id, "id").map(str::to_string) {
                self.ids.remove(&old);
            }
            self.ids.insert(value.clone(), id);
        }

        let attrs = &mut self.nodes[id.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => attrs.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let attrs = &mut self.nodes[id.0].attrs;
        let pos = attrs.iter().position(|(k, _)| k == name)?;
        let (_, old) = attrs.remove(pos);
        if name == "id" && self.ids.get(&old) == Some(&id) {
            self.ids.remove(&old);
        }
        Some(old)
    }

    /// Replace the character data of a node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.0].text = Some(text.into());
    }

    /// Value of the first `<property name="name">` child of `id`.
    pub fn property(&self, id: NodeId, name: &str) -> Option<&str> {
        self.children_of_kind(id, &NodeKind::Property)
            .find(|p| self.attr(*p, "name") == Some(name))
            .map(|p| self.node(p).text().unwrap_or(""))
    }

    /// Attribute `name`, falling back to a `<property name="name">` child.
    pub fn param(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attr(id, name).or_else(|| self.property(id, name))
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> EditResult<()> {
        let at = self.children(parent).len();
        self.insert_child(parent, at, child)
    }

    /// Insert a detached node as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> EditResult<()> {
        self.insert_child(parent, 0, child)
    }

    /// Insert a detached node as the sibling immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> EditResult<()> {
        let (parent, pos) = self.parent_and_position(anchor)?;
        self.insert_child(parent, pos, node)
    }

    /// Insert a detached node as the sibling immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> EditResult<()> {
        let (parent, pos) = self.parent_and_position(anchor)?;
        self.insert_child(parent, pos + 1, node)
    }

    /// Insert a detached node at `index` among the children of `parent`.
    ///
    /// Nothing changes on error: the id collision check runs before the child list is touched.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> EditResult<()> {
        if child == self.root || self.parent(child).is_some() {
            return Err(EditError::validation(
                "only detached nodes can be inserted",
            ));
        }
        if index > self.children(parent).len() {
            return Err(EditError::validation(format!(
                "child index {index} out of bounds"
            )));
        }
        let mut cur = Some(parent);
        while let Some(n) = cur {
            if n == child {
                return Err(EditError::validation(
                    "cannot insert a node below itself",
                ));
            }
            cur = self.parent(n);
        }

        if self.is_attached(parent) {
            let incoming = self.subtree_ids(child);
            if let Some(dup) = first_duplicate(&incoming, &self.ids) {
                return Err(EditError::DuplicateId(dup.to_string()));
            }
            self.ids.extend(incoming);
        }

        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Unlink `node` from its parent. The subtree stays allocated and can be reinserted.
    pub fn detach(&mut self, node: NodeId) -> EditResult<()> {
        let (parent, pos) = self.parent_and_position(node)?;
        if self.is_attached(parent) {
            for (id_str, _) in self.subtree_ids(node) {
                self.ids.remove(&id_str);
            }
        }
        self.nodes[parent.0].children.remove(pos);
        self.nodes[node.0].parent = None;
        Ok(())
    }

    /// Deep copy of the subtree at `node`, returned detached.
    pub fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let copy = self.create(self.kind(node).clone());
        self.nodes[copy.0].attrs = self.node(node).attrs.clone();
        self.nodes[copy.0].text = self.node(node).text.clone();
        for child in self.children(node).to_vec() {
            let c = self.deep_clone(child);
            self.nodes[c.0].parent = Some(copy);
            self.nodes[copy.0].children.push(c);
        }
        copy
    }

    /// `id` and all of its descendants in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Count attached nodes of `kind` whose id is `prefix` followed by digits.
    pub fn count_ids_with_prefix(&self, kind: &NodeKind, prefix: &str) -> usize {
        self.ids
            .iter()
            .filter(|(id_str, node)| {
                self.kind(**node) == kind
                    && id_str
                        .strip_prefix(prefix)
                        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            })
            .count()
    }

    fn parent_and_position(&self, node: NodeId) -> EditResult<(NodeId, usize)> {
        let parent = self
            .parent(node)
            .ok_or_else(|| EditError::validation("node has no parent"))?;
        let pos = self
            .children(parent)
            .iter()
            .position(|c| *c == node)
            .ok_or_else(|| EditError::validation("node missing from its parent's children"))?;
        Ok((parent, pos))
    }

    fn subtree_ids(&self, node: NodeId) -> Vec<(String, NodeId)> {
        self.descendants(node)
            .into_iter()
            .filter_map(|n| self.node(n).id().map(|s| (s.to_string(), n)))
            .collect()
    }
}

fn first_duplicate<'a>(
    incoming: &'a [(String, NodeId)],
    existing: &HashMap<String, NodeId>,
) -> Option<&'a str> {
    let mut seen = HashSet::new();
    incoming
        .iter()
        .map(|(id_str, _)| id_str.as_str())
        .find(|id_str| existing.contains_key(*id_str) || !seen.insert(*id_str))
}

#[cfg(test)]
#[path = "../../tests/unit/document/tree.rs"]
mod tests;
