#![deny(clippy::all)]

//! Framework-agnostic element tree model for GIP.
//!
//! The two halves that must never drift apart live here: the Tree
//! Snapshotter ([`snapshot_tree`]) and the Ref Resolver ([`resolve_ref`]).
//! Both walk children in native traversal order and count same-typed
//! siblings with the same rule, which is what makes a ref taken from a
//! snapshot land on the element it was produced from.

mod element;
pub mod mock_tree;
mod node;
mod refpath;
mod resolve;
mod snapshot;

pub use element::ElementNode;
pub use element::Geometry;
pub use node::UiNode;
pub use refpath::RefError;
pub use refpath::RefPath;
pub use resolve::resolve_ref;
pub use resolve::resolve_str;
pub use resolve::ResolveError;
pub use snapshot::child_segment;
pub use snapshot::snapshot_tree;
