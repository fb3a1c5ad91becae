//! Hit-stack construction — the ordered set of ancestors eligible for
//! selection under a cursor point.

use crate::geom::Point;
use crate::page::{Layout, NodeId};

/// Elements narrower or shorter than this never enter a stack.
pub const MIN_STACK_DIMENSION: f64 = 20.0;

/// Build the hit stack for a cursor point, innermost qualifying ancestor
/// first.
///
/// Walks from the topmost element under the point up the ancestor chain,
/// keeping every ancestor whose box is at least 20×20 px and still contains
/// the point. The walk stops (exclusive) at the document's root containers.
/// If nothing qualifies but an element was hit, that element alone forms
/// the stack, so a hit never produces an empty stack.
///
/// Pure function of the layout snapshot; an empty return means the cursor
/// was over nothing and the caller should leave its state untouched.
pub fn build_stack(layout: &dyn Layout, point: Point) -> Vec<NodeId> {
    let Some(hit) = layout.element_at(point) else {
        return Vec::new();
    };

    let mut stack = Vec::new();
    let mut cursor = Some(hit);
    while let Some(id) = cursor {
        if layout.is_root_container(id) {
            break;
        }
        let rect = layout.bounds_of(id);
        if rect.spans_at_least(MIN_STACK_DIMENSION) && rect.contains(point) {
            stack.push(id);
        }
        cursor = layout.parent_of(id);
    }

    if stack.is_empty() {
        stack.push(hit);
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use crate::page::{NodeInfo, PageSnapshot};

    fn rect(l: f64, t: f64, w: f64, h: f64) -> Rect {
        Rect::new(l, t, w, h)
    }

    /// html > body > section (1000x800) > div (400x300) > span (15x15).
    fn nested_page() -> PageSnapshot {
        PageSnapshot::new(vec![
            NodeInfo::new("html", None, rect(0.0, 0.0, 1280.0, 900.0)),
            NodeInfo::new("body", Some(NodeId(0)), rect(0.0, 0.0, 1280.0, 900.0)),
            NodeInfo::new("section", Some(NodeId(1)), rect(0.0, 0.0, 1000.0, 800.0)),
            NodeInfo::new("div", Some(NodeId(2)), rect(50.0, 50.0, 400.0, 300.0)),
            NodeInfo::new("span", Some(NodeId(3)), rect(60.0, 60.0, 15.0, 15.0)),
        ])
    }

    #[test]
    fn undersized_hit_is_skipped_in_favor_of_ancestors() {
        let page = nested_page();
        let stack = build_stack(&page, Point::new(65.0, 65.0));
        // The 15x15 span is under threshold: the div is the most specific
        // qualifying target, then the section.
        assert_eq!(stack, vec![NodeId(3), NodeId(2)]);
    }

    #[test]
    fn stack_is_innermost_first_and_point_containing() {
        let page = nested_page();
        let point = Point::new(100.0, 100.0);
        let stack = build_stack(&page, point);
        assert_eq!(stack, vec![NodeId(3), NodeId(2)]);
        for id in &stack {
            let rect = page.bounds_of(*id);
            assert!(rect.contains(point));
            assert!(rect.spans_at_least(MIN_STACK_DIMENSION));
        }
    }

    #[test]
    fn root_containers_never_enter_the_stack() {
        let page = nested_page();
        let stack = build_stack(&page, Point::new(900.0, 700.0));
        assert_eq!(stack, vec![NodeId(2)]);
    }

    #[test]
    fn lone_tiny_element_falls_back_to_itself() {
        let page = PageSnapshot::new(vec![
            NodeInfo::new("html", None, rect(0.0, 0.0, 800.0, 600.0)),
            NodeInfo::new("body", Some(NodeId(0)), rect(0.0, 0.0, 800.0, 600.0)),
            NodeInfo::new("button", Some(NodeId(1)), rect(10.0, 10.0, 16.0, 16.0)),
        ]);
        let stack = build_stack(&page, Point::new(12.0, 12.0));
        assert_eq!(stack, vec![NodeId(2)]);
    }

    #[test]
    fn no_element_under_cursor_yields_empty_stack() {
        let page = PageSnapshot::new(vec![
            NodeInfo::new("html", None, rect(0.0, 0.0, 100.0, 100.0)),
            NodeInfo::new("body", Some(NodeId(0)), rect(0.0, 0.0, 100.0, 100.0)),
        ]);
        // body is hit but is a root container, so it falls back to the hit
        // element itself.
        assert_eq!(build_stack(&page, Point::new(50.0, 50.0)), vec![NodeId(1)]);
        // Truly outside everything: empty.
        assert!(build_stack(&page, Point::new(500.0, 500.0)).is_empty());
    }

    #[test]
    fn ancestor_not_containing_the_point_is_skipped() {
        // An absolutely positioned child pokes out of its parent; hovering
        // the overhang must not select the parent.
        let page = PageSnapshot::new(vec![
            NodeInfo::new("html", None, rect(0.0, 0.0, 800.0, 600.0)),
            NodeInfo::new("body", Some(NodeId(0)), rect(0.0, 0.0, 800.0, 600.0)),
            NodeInfo::new("div", Some(NodeId(1)), rect(0.0, 0.0, 100.0, 100.0)),
            NodeInfo::new("aside", Some(NodeId(2)), rect(150.0, 150.0, 60.0, 60.0)),
        ]);
        let stack = build_stack(&page, Point::new(160.0, 160.0));
        assert_eq!(stack, vec![NodeId(3)]);
    }
}
