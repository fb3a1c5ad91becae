//! Viewport geometry shared by the page model, the selection engine and the
//! capture pipeline.

use serde::{Deserialize, Serialize};

/// A cursor position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in viewport coordinates, mirroring the
/// left/top/width/height shape of `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Edge-inclusive containment, matching DOM hit testing.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// True when both dimensions are at least `min` pixels.
    pub fn spans_at_least(&self, min: f64) -> bool {
        self.width >= min && self.height >= min
    }

    /// The same box shifted by the given offsets (viewport → page
    /// coordinates when passed the scroll offsets).
    pub fn offset_by(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// A capture target this small cannot produce a meaningful image.
    pub fn is_degenerate(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }
}
