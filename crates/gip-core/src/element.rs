use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Element position and size in local window coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Serializable mirror of one live element, produced fresh on every
/// snapshot and never mutated afterwards. The `ref` of each node resolves
/// back to the element it was taken from as long as the live tree keeps
/// its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    #[serde(rename = "ref")]
    pub element_ref: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub geometry: Geometry,
    pub properties: BTreeMap<String, Value>,
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Depth-first lookup of a node by its ref.
    pub fn find(&self, element_ref: &str) -> Option<&ElementNode> {
        if self.element_ref == element_ref {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(element_ref))
    }

    /// Total node count including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ElementNode::node_count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn leaf(element_ref: &str, type_name: &str) -> ElementNode {
        ElementNode {
            element_ref: element_ref.to_string(),
            type_name: type_name.to_string(),
            name: None,
            visible: true,
            enabled: true,
            geometry: Geometry::default(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let mut node = leaf("root", "MainWindow");
        node.properties.insert("text".to_string(), json!("hi"));
        let encoded = serde_json::to_string(&node).unwrap();
        assert!(encoded.contains("\"ref\":\"root\""));
        assert!(encoded.contains("\"type\":\"MainWindow\""));
        assert!(encoded.contains("\"properties\":{\"text\":\"hi\"}"));
    }

    #[test]
    fn test_roundtrip_preserves_children_order() {
        let mut root = leaf("root", "Window");
        root.children.push(leaf("root/Button[0]", "Button"));
        root.children.push(leaf("root/Button[1]", "Button"));

        let encoded = serde_json::to_string(&root).unwrap();
        let decoded: ElementNode = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, root);
        assert_eq!(decoded.children[1].element_ref, "root/Button[1]");
    }

    #[test]
    fn test_find_walks_depth_first() {
        let mut root = leaf("root", "Window");
        let mut panel = leaf("root/Panel[0]", "Panel");
        panel.children.push(leaf("root/Panel[0]/Button[0]", "Button"));
        root.children.push(panel);

        assert!(root.find("root/Panel[0]/Button[0]").is_some());
        assert!(root.find("root/Panel[0]/Button[1]").is_none());
        assert_eq!(root.node_count(), 3);
    }
}
