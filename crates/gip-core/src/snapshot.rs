//! Tree Snapshotter: depth-first walk of a live tree into an owned
//! [`ElementNode`] value with a ref assigned to every node.

use crate::element::ElementNode;
use crate::node::UiNode;
use crate::refpath::RefPath;

/// Ref segment for the child at `position` within `children`.
///
/// This is the rule the resolver must agree with: a stable name wins;
/// otherwise the segment is `Type[index]` with `index` counting
/// same-typed siblings (named or not) before this one in traversal order.
pub fn child_segment<N: UiNode>(children: &[N], position: usize) -> String {
    let child = &children[position];
    if let Some(name) = child.name().filter(|n| !n.is_empty()) {
        return name;
    }
    let type_name = child.type_name();
    let nth = children[..position]
        .iter()
        .filter(|sibling| sibling.type_name() == type_name)
        .count();
    RefPath::indexed_segment(&type_name, nth)
}

/// Snapshot the whole tree rooted at `root`. The root node's ref is the
/// bare root marker regardless of the root element's own name.
pub fn snapshot_tree<N: UiNode>(root: &N) -> ElementNode {
    build_node(root, &RefPath::root())
}

fn build_node<N: UiNode>(node: &N, path: &RefPath) -> ElementNode {
    let children = node.children();
    let child_nodes = children
        .iter()
        .enumerate()
        .map(|(position, child)| {
            let child_path = path.child(child_segment(&children, position));
            build_node(child, &child_path)
        })
        .collect();

    ElementNode {
        element_ref: path.to_string(),
        type_name: node.type_name(),
        name: node.name(),
        visible: node.visible(),
        enabled: node.enabled(),
        geometry: node.geometry(),
        properties: node.properties(),
        children: child_nodes,
    }
}
