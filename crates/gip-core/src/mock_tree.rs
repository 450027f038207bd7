//! Owned in-memory widget tree.
//!
//! Stands in for a real toolkit in tests and demo targets: nodes live in
//! an arena indexed by [`NodeId`], and [`MockNode`] handles implement
//! [`UiNode`] over a borrow of the arena. Mutation goes through the tree
//! by id, mirroring how a real backend resolves a ref first and then
//! calls toolkit setters on the result.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::element::Geometry;
use crate::node::UiNode;

pub type NodeId = usize;

#[derive(Debug, Clone)]
struct MockWidget {
    type_name: String,
    name: Option<String>,
    visible: bool,
    enabled: bool,
    geometry: Geometry,
    properties: BTreeMap<String, Value>,
    children: Vec<NodeId>,
}

impl MockWidget {
    fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: None,
            visible: true,
            enabled: true,
            geometry: Geometry::default(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockTree {
    nodes: Vec<MockWidget>,
}

impl MockTree {
    pub fn new(root_type: &str) -> Self {
        Self {
            nodes: vec![MockWidget::new(root_type)],
        }
    }

    pub fn root_id(&self) -> NodeId {
        0
    }

    pub fn root(&self) -> MockNode<'_> {
        MockNode {
            tree: self,
            id: self.root_id(),
        }
    }

    pub fn node(&self, id: NodeId) -> MockNode<'_> {
        MockNode { tree: self, id }
    }

    /// Append a child under `parent`, returning the new node's id.
    pub fn add_child(&mut self, parent: NodeId, type_name: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(MockWidget::new(type_name));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) {
        self.nodes[id].name = Some(name.to_string());
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id].visible = visible;
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        self.nodes[id].enabled = enabled;
    }

    pub fn set_geometry(&mut self, id: NodeId, geometry: Geometry) {
        self.nodes[id].geometry = geometry;
    }

    pub fn set_property(&mut self, id: NodeId, key: &str, value: Value) {
        self.nodes[id].properties.insert(key.to_string(), value);
    }

    pub fn property(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.nodes[id].properties.get(key)
    }

    /// Remove a child edge. The node stays in the arena; only tree shape
    /// changes, which is what ref-drift tests need.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.retain(|c| *c != child);
    }
}

/// Cheap handle to one node; the `UiNode` implementation the rest of the
/// crate is tested against.
#[derive(Debug, Clone, Copy)]
pub struct MockNode<'t> {
    tree: &'t MockTree,
    id: NodeId,
}

impl MockNode<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn widget(&self) -> &MockWidget {
        &self.tree.nodes[self.id]
    }
}

impl UiNode for MockNode<'_> {
    fn type_name(&self) -> String {
        self.widget().type_name.clone()
    }

    fn name(&self) -> Option<String> {
        self.widget().name.clone()
    }

    fn visible(&self) -> bool {
        self.widget().visible
    }

    fn enabled(&self) -> bool {
        self.widget().enabled
    }

    fn geometry(&self) -> Geometry {
        self.widget().geometry
    }

    fn properties(&self) -> BTreeMap<String, Value> {
        self.widget().properties.clone()
    }

    fn children(&self) -> Vec<Self> {
        self.widget()
            .children
            .iter()
            .map(|id| MockNode {
                tree: self.tree,
                id: *id,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = MockTree::new("Window");
        let a = tree.add_child(tree.root_id(), "Button");
        let b = tree.add_child(tree.root_id(), "Label");
        let ids: Vec<NodeId> = tree.root().children().iter().map(MockNode::id).collect();
        assert_eq!(ids, [a, b]);
    }

    #[test]
    fn test_mutation_is_visible_through_handles() {
        let mut tree = MockTree::new("Window");
        let input = tree.add_child(tree.root_id(), "LineEdit");
        tree.set_property(input, "text", json!("before"));
        tree.set_property(input, "text", json!("after"));
        assert_eq!(
            tree.node(input).properties()["text"],
            json!("after")
        );
    }

    #[test]
    fn test_remove_child_changes_shape_only() {
        let mut tree = MockTree::new("Window");
        let a = tree.add_child(tree.root_id(), "Button");
        let b = tree.add_child(tree.root_id(), "Button");
        tree.remove_child(tree.root_id(), a);
        let ids: Vec<NodeId> = tree.root().children().iter().map(MockNode::id).collect();
        assert_eq!(ids, [b]);
    }
}
