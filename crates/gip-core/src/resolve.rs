//! Ref Resolver: walk a live tree along a parsed ref.
//!
//! Matching mirrors the snapshotter's segment rule. For each segment the
//! resolver first looks for a child whose stable name equals the segment
//! (first match in traversal order), then falls back to treating it as a
//! `Type[index]` token over the same-typed children. Anything else is
//! `NotFound`; a ref never silently lands on a different element than the
//! one that would have produced it.

use thiserror::Error;

use crate::node::UiNode;
use crate::refpath::RefError;
use crate::refpath::RefPath;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Widget not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    BadRef(#[from] RefError),
}

/// Resolve a parsed ref against the tree rooted at `root`.
pub fn resolve_ref<N: UiNode>(root: &N, path: &RefPath) -> Result<N, ResolveError> {
    let mut current = root.clone();

    for segment in path.segments() {
        let children = current.children();

        if let Some(named) = children
            .iter()
            .find(|child| child.name().as_deref() == Some(segment.as_str()))
        {
            current = named.clone();
            continue;
        }

        let (type_name, index) = RefPath::parse_indexed(segment)
            .ok_or_else(|| ResolveError::NotFound(path.to_string()))?;
        let found = children
            .iter()
            .filter(|child| child.type_name() == type_name)
            .nth(index)
            .ok_or_else(|| ResolveError::NotFound(path.to_string()))?;
        current = found.clone();
    }

    Ok(current)
}

/// Parse and resolve a raw ref string in one step.
pub fn resolve_str<N: UiNode>(root: &N, raw: &str) -> Result<N, ResolveError> {
    let path = RefPath::parse(raw)?;
    resolve_ref(root, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_tree::MockTree;
    use crate::snapshot::snapshot_tree;

    fn sample_tree() -> MockTree {
        let mut tree = MockTree::new("Window");
        let form = tree.add_child(tree.root_id(), "Panel");
        tree.set_name(form, "form");
        let submit = tree.add_child(form, "Button");
        tree.set_name(submit, "submit");
        tree.add_child(form, "Button");
        tree.add_child(form, "Button");
        tree.add_child(tree.root_id(), "Label");
        tree
    }

    #[test]
    fn test_resolves_root() {
        let tree = sample_tree();
        let node = resolve_str(&tree.root(), "root").unwrap();
        assert_eq!(node.id(), tree.root_id());
    }

    #[test]
    fn test_resolves_named_path() {
        let tree = sample_tree();
        let node = resolve_str(&tree.root(), "root/form/submit").unwrap();
        assert_eq!(node.type_name(), "Button");
        assert_eq!(node.name().as_deref(), Some("submit"));
    }

    #[test]
    fn test_resolves_indexed_path_in_traversal_order() {
        let tree = sample_tree();
        // The named submit button occupies Button[0]; the unnamed ones
        // are Button[1] and Button[2].
        let first = resolve_str(&tree.root(), "root/form/Button[1]").unwrap();
        let second = resolve_str(&tree.root(), "root/form/Button[2]").unwrap();
        assert_ne!(first.id(), second.id());
        assert!(first.name().is_none());
    }

    #[test]
    fn test_index_out_of_range_is_not_found() {
        let tree = sample_tree();
        assert_eq!(
            resolve_str(&tree.root(), "root/form/Button[3]").unwrap_err(),
            ResolveError::NotFound("root/form/Button[3]".to_string())
        );
    }

    #[test]
    fn test_unknown_segment_is_not_found() {
        let tree = sample_tree();
        assert!(matches!(
            resolve_str(&tree.root(), "root/form/cancel"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_root_marker_is_bad_ref() {
        let tree = sample_tree();
        assert!(matches!(
            resolve_str(&tree.root(), "form/submit"),
            Err(ResolveError::BadRef(_))
        ));
    }

    #[test]
    fn test_name_shaped_like_token_shadows_indexed_sibling() {
        // A widget literally named "Button[0]" wins the name-first match
        // over the unnamed sibling that token would otherwise address.
        // Documented limitation on RefPath; names shaped like
        // Type[index] are the application author's to avoid.
        let mut tree = MockTree::new("Window");
        let unnamed = tree.add_child(tree.root_id(), "Button");
        let named = tree.add_child(tree.root_id(), "Button");
        tree.set_name(named, "Button[0]");

        let resolved = resolve_str(&tree.root(), "root/Button[0]").unwrap();
        assert_eq!(resolved.id(), named);
        assert_ne!(resolved.id(), unnamed);
    }

    #[test]
    fn test_every_snapshot_ref_resolves_to_its_node() {
        let tree = sample_tree();
        let snapshot = snapshot_tree(&tree.root());

        fn check(tree: &MockTree, node: &crate::ElementNode) {
            let resolved = resolve_str(&tree.root(), &node.element_ref).unwrap();
            assert_eq!(resolved.type_name(), node.type_name);
            assert_eq!(resolved.name(), node.name);
            for child in &node.children {
                check(tree, child);
            }
        }
        check(&tree, &snapshot);
    }
}
