use std::collections::BTreeMap;

use serde_json::Value;

use crate::element::Geometry;

/// Read-only view of one live element, implemented per toolkit.
///
/// Implementations are cheap handles (an id plus a borrow of the owning
/// tree is typical), which is why the trait asks for `Clone` and owned
/// children instead of borrowed ones. `children` must return the same
/// order on every call for an unchanged tree; the snapshotter and the
/// resolver both index into it.
pub trait UiNode: Clone {
    /// Runtime type name of the element, e.g. the widget class.
    fn type_name(&self) -> String;

    /// Stable author-assigned identifier, if any.
    fn name(&self) -> Option<String>;

    fn visible(&self) -> bool;

    fn enabled(&self) -> bool;

    fn geometry(&self) -> Geometry;

    /// Toolkit-specific scalar properties (text, checked state, ...).
    fn properties(&self) -> BTreeMap<String, Value>;

    /// Child elements in native traversal order.
    fn children(&self) -> Vec<Self>;
}
