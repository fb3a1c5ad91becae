//! The serialized layout snapshot posted by the webview, and hit testing
//! over it.

use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect};
use crate::page::{Layout, NodeDescriptor, NodeId, NodeInfo};

/// One frame of the page's layout: every element's geometry and style flags
/// in document order, plus the scroll/viewport metrics needed to turn
/// viewport coordinates into page and screen coordinates.
///
/// Node ids are indices into this snapshot. A later snapshot may be smaller
/// than the ids a running selection still holds; all accessors treat such
/// ids as missing rather than panicking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    nodes: Vec<NodeInfo>,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    #[serde(default = "unit_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub viewport_width: f64,
    #[serde(default)]
    pub viewport_height: f64,
    /// Screen position of the viewport's top-left corner, used by the
    /// screen-crop backend to map viewport boxes onto the monitor image.
    #[serde(default)]
    pub screen_x: f64,
    #[serde(default)]
    pub screen_y: f64,
}

fn unit_ratio() -> f64 {
    1.0
}

impl PageSnapshot {
    /// Snapshot with no scrolling and a 1.0 pixel ratio.
    pub fn new(nodes: Vec<NodeInfo>) -> Self {
        Self {
            nodes,
            scroll_x: 0.0,
            scroll_y: 0.0,
            device_pixel_ratio: 1.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
            screen_x: 0.0,
            screen_y: 0.0,
        }
    }

    pub fn with_scroll(mut self, x: f64, y: f64) -> Self {
        self.scroll_x = x;
        self.scroll_y = y;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(id.index())
    }
}

impl Layout for PageSnapshot {
    /// Topmost rendered element at the point. Reverse document order stands
    /// in for paint order: the walker serializes in document order, so the
    /// last match is the one painted on top.
    fn element_at(&self, point: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| !node.is_unrendered() && node.rect.contains(point))
            .map(|(i, _)| NodeId(i as u32))
    }

    fn bounds_of(&self, id: NodeId) -> Rect {
        self.get(id)
            .map(|n| n.rect)
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    fn is_root_container(&self, id: NodeId) -> bool {
        match self.get(id) {
            Some(node) => {
                let tag = node.tag.to_ascii_lowercase();
                tag == "html" || tag == "body"
            }
            // A stale id stops ancestor walks instead of extending them.
            None => true,
        }
    }

    fn is_overlay(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.overlay)
    }

    fn is_invisible(&self, id: NodeId) -> bool {
        self.get(id).map_or(true, |n| n.is_invisible())
    }

    fn descriptor_of(&self, id: NodeId) -> NodeDescriptor {
        self.get(id)
            .map(|n| n.descriptor())
            .unwrap_or_else(|| NodeDescriptor {
                tag: "element".to_string(),
                id: None,
                first_class: None,
            })
    }

    fn scroll_offsets(&self) -> (f64, f64) {
        (self.scroll_x, self.scroll_y)
    }

    fn viewport_origin(&self) -> (f64, f64) {
        (self.screen_x, self.screen_y)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(l: f64, t: f64, w: f64, h: f64) -> Rect {
        Rect::new(l, t, w, h)
    }

    fn simple_page() -> PageSnapshot {
        PageSnapshot::new(vec![
            NodeInfo::new("html", None, rect(0.0, 0.0, 1280.0, 720.0)),
            NodeInfo::new("body", Some(NodeId(0)), rect(0.0, 0.0, 1280.0, 720.0)),
            NodeInfo::new("section", Some(NodeId(1)), rect(100.0, 100.0, 600.0, 400.0)),
            NodeInfo::new("div", Some(NodeId(2)), rect(150.0, 150.0, 200.0, 100.0)),
        ])
    }

    #[test]
    fn element_at_returns_deepest_match() {
        let page = simple_page();
        assert_eq!(page.element_at(Point::new(160.0, 160.0)), Some(NodeId(3)));
        assert_eq!(page.element_at(Point::new(120.0, 120.0)), Some(NodeId(2)));
        assert_eq!(page.element_at(Point::new(10.0, 10.0)), Some(NodeId(1)));
    }

    #[test]
    fn element_at_skips_unrendered_nodes() {
        let mut page = simple_page();
        // Hide the div; the section underneath becomes the hit.
        {
            let nodes = vec![
                page.get(NodeId(0)).unwrap().clone(),
                page.get(NodeId(1)).unwrap().clone(),
                page.get(NodeId(2)).unwrap().clone(),
                NodeInfo {
                    display_none: true,
                    ..page.get(NodeId(3)).unwrap().clone()
                },
            ];
            page = PageSnapshot::new(nodes);
        }
        assert_eq!(page.element_at(Point::new(160.0, 160.0)), Some(NodeId(2)));
    }

    #[test]
    fn element_at_misses_outside_everything() {
        let page = simple_page();
        assert_eq!(page.element_at(Point::new(5000.0, 5000.0)), None);
    }

    #[test]
    fn root_containers_by_tag() {
        let page = simple_page();
        assert!(page.is_root_container(NodeId(0)));
        assert!(page.is_root_container(NodeId(1)));
        assert!(!page.is_root_container(NodeId(2)));
    }

    #[test]
    fn stale_ids_are_missing_not_fatal() {
        let page = simple_page();
        let stale = NodeId(99);
        assert_eq!(page.bounds_of(stale), rect(0.0, 0.0, 0.0, 0.0));
        assert_eq!(page.parent_of(stale), None);
        assert!(page.is_root_container(stale));
        assert!(page.is_invisible(stale));
    }

    #[test]
    fn snapshot_deserializes_from_walker_shape() {
        let raw = r#"{
            "nodes": [
                {"parent": null, "tag": "html", "rect": {"left": 0, "top": 0, "width": 800, "height": 600}},
                {"parent": 0, "tag": "body", "rect": {"left": 0, "top": 0, "width": 800, "height": 600}},
                {"parent": 1, "tag": "div", "id": "app", "classes": ["shell"],
                 "rect": {"left": 10, "top": 10, "width": 300, "height": 200},
                 "opacity": 0.5, "overlay": false}
            ],
            "scrollX": 0, "scrollY": 120, "devicePixelRatio": 2,
            "viewportWidth": 800, "viewportHeight": 600
        }"#;
        let page: PageSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.scroll_offsets(), (0.0, 120.0));
        assert_eq!(page.device_pixel_ratio(), 2.0);
        let desc = page.descriptor_of(NodeId(2));
        assert_eq!(desc.label(), "div#app.shell");
    }
}
