//! Nodes of the serialized page model.

use serde::{Deserialize, Serialize};

use crate::geom::Rect;

/// Identity of a node within one [`super::PageSnapshot`]. Index-based, so
/// equality is the snapshot's version of reference equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One element as reported by the webview walker, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub parent: Option<NodeId>,
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Bounding box in viewport coordinates.
    pub rect: Rect,
    /// Computed opacity; 0.0 renders nothing.
    #[serde(default = "opaque")]
    pub opacity: f64,
    #[serde(default)]
    pub visibility_hidden: bool,
    #[serde(default)]
    pub display_none: bool,
    /// Marks highlight/hover/info/toast nodes injected by this tool, so the
    /// selection engine never targets its own furniture.
    #[serde(default)]
    pub overlay: bool,
}

fn opaque() -> f64 {
    1.0
}

impl NodeInfo {
    /// A visible content node with default style, for building snapshots by
    /// hand in tests.
    pub fn new(tag: &str, parent: Option<NodeId>, rect: Rect) -> Self {
        Self {
            parent,
            tag: tag.to_string(),
            id: String::new(),
            classes: Vec::new(),
            rect,
            opacity: 1.0,
            visibility_hidden: false,
            display_none: false,
            overlay: false,
        }
    }

    /// Invisible per computed style: nothing a capture could show.
    pub fn is_invisible(&self) -> bool {
        self.display_none || self.visibility_hidden || self.opacity == 0.0
    }

    /// Removed from rendering entirely, as opposed to merely transparent.
    pub fn is_unrendered(&self) -> bool {
        self.display_none || self.visibility_hidden
    }

    pub fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            tag: self.tag.to_lowercase(),
            id: (!self.id.is_empty()).then(|| self.id.clone()),
            first_class: self.classes.first().cloned().filter(|c| !c.is_empty()),
        }
    }
}

/// The identifying bits of an element that survive into filenames and the
/// info display: tag name, first id, first class token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub tag: String,
    pub id: Option<String>,
    pub first_class: Option<String>,
}

impl NodeDescriptor {
    /// Selector-style label: `div#main.card`.
    pub fn label(&self) -> String {
        let mut label = self.tag.clone();
        if let Some(id) = &self.id {
            label.push('#');
            label.push_str(id);
        }
        if let Some(class) = &self.first_class {
            label.push('.');
            label.push_str(class);
        }
        label
    }
}
