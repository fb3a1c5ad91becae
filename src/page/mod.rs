//! Page model — the capability surface the selection engine sees.
//!
//! The engine never touches a real DOM. The webview serializes its layout
//! into a [`PageSnapshot`]; tests build snapshots by hand. Everything the
//! selection algorithms may ask is on the [`Layout`] trait.

mod node;
mod snapshot;

pub use node::{NodeDescriptor, NodeId, NodeInfo};
pub use snapshot::PageSnapshot;

use crate::geom::{Point, Rect};

/// What the selection engine may ask about the rendered page.
pub trait Layout {
    /// Topmost rendered element at a viewport point, if any.
    fn element_at(&self, point: Point) -> Option<NodeId>;

    /// Bounding box in viewport coordinates. Empty for stale ids.
    fn bounds_of(&self, id: NodeId) -> Rect;

    fn parent_of(&self, id: NodeId) -> Option<NodeId>;

    /// Document root or the topmost body container — never part of a stack.
    fn is_root_container(&self, id: NodeId) -> bool;

    /// A node injected by this tool (highlight, hover, info, toast).
    fn is_overlay(&self, id: NodeId) -> bool;

    /// Invisible per computed style (zero opacity, hidden, display-none).
    fn is_invisible(&self, id: NodeId) -> bool;

    fn descriptor_of(&self, id: NodeId) -> NodeDescriptor;

    /// Current scroll offsets, for viewport → page coordinates.
    fn scroll_offsets(&self) -> (f64, f64);

    /// Screen position of the viewport's top-left corner, for viewport →
    /// screen coordinates.
    fn viewport_origin(&self) -> (f64, f64);

    fn device_pixel_ratio(&self) -> f64;
}
