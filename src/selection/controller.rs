//! Selection session state machine.
//!
//! Pure core: every input handler returns the list of effects the host must
//! apply (overlay updates, a debounce timer to arm, a confirmed capture).
//! Nothing here touches the webview or the clock, so the whole machine runs
//! under test against a synthetic snapshot.

use std::time::Duration;

use crate::capture::{CaptureMode, CaptureRequest};
use crate::geom::{Point, Rect};
use crate::i18n::Notice;
use crate::page::{Layout, NodeId};
use crate::selection::stack::build_stack;

/// Tuning knobs. The delays are defaults carried over from the original
/// behavior, not correctness requirements.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Coalescing window for pointer-move stack rebuilds.
    pub rebuild_debounce: Duration,
    /// How long the element info box stays up.
    pub info_ttl: Duration,
    /// How long transient notices stay up.
    pub toast_ttl: Duration,
    /// Minimum element size for the cosmetic hover preview.
    pub min_hover_dimension: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            rebuild_debounce: Duration::from_millis(50),
            info_ttl: Duration::from_secs(2),
            toast_ttl: Duration::from_secs(3),
            min_hover_dimension: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Inactive,
    Selecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    /// Content-scroll-up gesture: narrow toward the descendant.
    Up,
    /// Content-scroll-down gesture: widen toward the ancestor.
    Down,
}

impl WheelDirection {
    pub fn from_delta_y(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            WheelDirection::Down
        } else {
            WheelDirection::Up
        }
    }
}

/// Overlay-facing effects. All geometry is in page coordinates, ready to be
/// applied to absolutely positioned overlay nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    /// The overlay layer begins intercepting wheel/click input.
    SessionStarted,
    ShowHover { rect: Rect },
    HideHover,
    ShowHighlight { rect: Rect },
    ShowInfo {
        label: String,
        level: usize,
        total: usize,
        width: u32,
        height: u32,
        ttl: Duration,
    },
    Toast { notice: Notice, ttl: Duration },
    /// Remove highlight, hover and info nodes. Toasts expire on their own
    /// TTL.
    ClearOverlays,
}

/// What a handler asks the host to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Ui(UiEffect),
    /// Arm (or re-arm) the rebuild timer; a firing with a stale `seq` must
    /// be dropped.
    ScheduleRebuild { seq: u64, delay: Duration },
    /// Exactly one per confirmed selection.
    Confirm(CaptureRequest),
}

/// Owns all selection state for one app instance. Constructed once and kept
/// inside the session object — there is no ambient global.
pub struct SelectionController {
    config: SelectionConfig,
    phase: Phase,
    mode: CaptureMode,
    stack: Vec<NodeId>,
    index: usize,
    current: Option<NodeId>,
    pending_point: Option<Point>,
    /// Bumped on every move and on stop; stale rebuild timers no-op.
    move_seq: u64,
}

impl SelectionController {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            phase: Phase::Inactive,
            mode: CaptureMode::Vector,
            stack: Vec::new(),
            index: 0,
            current: None,
            pending_point: None,
            move_seq: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_selecting(&self) -> bool {
        self.phase == Phase::Selecting
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Session capture mode; takes effect on the next confirmation.
    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn stack(&self) -> &[NodeId] {
        &self.stack
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Enter selection mode. A second call while already selecting changes
    /// nothing — no duplicate session, no extra effects.
    pub fn start(&mut self, mode: CaptureMode) -> Vec<Effect> {
        if self.is_selecting() {
            return Vec::new();
        }
        self.phase = Phase::Selecting;
        self.mode = mode;
        log::info!("selection session started (mode '{}')", mode);
        vec![
            Effect::Ui(UiEffect::SessionStarted),
            Effect::Ui(UiEffect::Toast {
                notice: Notice::SelectionHint,
                ttl: self.config.toast_ttl,
            }),
        ]
    }

    /// Pointer moved: immediate hover preview, debounced stack rebuild.
    pub fn pointer_moved(&mut self, point: Point, layout: &dyn Layout) -> Vec<Effect> {
        if !self.is_selecting() {
            return Vec::new();
        }

        let mut effects = vec![Effect::Ui(self.hover_preview(point, layout))];

        self.move_seq += 1;
        self.pending_point = Some(point);
        effects.push(Effect::ScheduleRebuild {
            seq: self.move_seq,
            delay: self.config.rebuild_debounce,
        });
        effects
    }

    /// The cosmetic preview tracking the raw element under the cursor.
    /// Suppressed for the tool's own overlay nodes, invisible elements, and
    /// anything smaller than the hover threshold.
    fn hover_preview(&self, point: Point, layout: &dyn Layout) -> UiEffect {
        let Some(hit) = layout.element_at(point) else {
            return UiEffect::HideHover;
        };
        if layout.is_overlay(hit) || layout.is_invisible(hit) {
            return UiEffect::HideHover;
        }
        let rect = layout.bounds_of(hit);
        if !rect.spans_at_least(self.config.min_hover_dimension) {
            return UiEffect::HideHover;
        }
        let (sx, sy) = layout.scroll_offsets();
        UiEffect::ShowHover {
            rect: rect.offset_by(sx, sy),
        }
    }

    /// The debounce timer fired. Only the latest move's timer does any
    /// work; anything older — or a timer outliving the session — is stale.
    pub fn rebuild_due(&mut self, seq: u64, layout: &dyn Layout) -> Vec<Effect> {
        if !self.is_selecting() || seq != self.move_seq {
            return Vec::new();
        }
        let Some(point) = self.pending_point.take() else {
            return Vec::new();
        };

        let Some(hit) = layout.element_at(point) else {
            // Cursor over nothing: keep whatever highlight was last shown.
            return Vec::new();
        };
        if layout.is_overlay(hit) {
            // The highlight must not decorate itself.
            return Vec::new();
        }

        let stack = build_stack(layout, point);
        if stack.is_empty() {
            return Vec::new();
        }

        self.stack = stack;
        // The candidate set changed under the cursor; always restart at the
        // most specific element.
        self.index = 0;
        self.current = Some(self.stack[0]);
        self.focus_effects(layout)
    }

    /// Wheel input re-indexes the existing stack; it never re-queries
    /// layout, so the candidate set cannot shift mid-cycle.
    pub fn wheel(&mut self, direction: WheelDirection, layout: &dyn Layout) -> Vec<Effect> {
        if !self.is_selecting() || self.stack.len() <= 1 {
            return Vec::new();
        }

        self.index = match direction {
            WheelDirection::Down => (self.index + 1).min(self.stack.len() - 1),
            WheelDirection::Up => self.index.saturating_sub(1),
        };
        self.current = Some(self.stack[self.index]);
        self.focus_effects(layout)
    }

    fn focus_effects(&self, layout: &dyn Layout) -> Vec<Effect> {
        let Some(current) = self.current else {
            return Vec::new();
        };
        let rect = layout.bounds_of(current);
        let (sx, sy) = layout.scroll_offsets();
        let descriptor = layout.descriptor_of(current);
        vec![
            Effect::Ui(UiEffect::ShowHighlight {
                rect: rect.offset_by(sx, sy),
            }),
            Effect::Ui(UiEffect::HideHover),
            Effect::Ui(UiEffect::ShowInfo {
                label: descriptor.label(),
                level: self.index + 1,
                total: self.stack.len(),
                width: rect.width.round() as u32,
                height: rect.height.round() as u32,
                ttl: self.config.info_ttl,
            }),
        ]
    }

    /// Click confirms the current element: one `CaptureRequest`, then the
    /// session ends. The capture itself runs after the controller is
    /// already Inactive.
    pub fn click(&mut self, layout: &dyn Layout) -> Vec<Effect> {
        if !self.is_selecting() {
            return Vec::new();
        }
        let Some(node) = self.current else {
            return Vec::new();
        };

        let viewport_rect = layout.bounds_of(node);
        let (sx, sy) = layout.scroll_offsets();
        let (ox, oy) = layout.viewport_origin();
        let request = CaptureRequest {
            node,
            descriptor: layout.descriptor_of(node),
            viewport_rect,
            page_rect: viewport_rect.offset_by(sx, sy),
            screen_rect: viewport_rect.offset_by(ox, oy),
            device_pixel_ratio: layout.device_pixel_ratio(),
        };

        let mut effects = vec![
            Effect::Ui(UiEffect::Toast {
                notice: Notice::Capturing { mode: self.mode },
                ttl: self.config.toast_ttl,
            }),
            Effect::Confirm(request),
        ];
        effects.extend(self.stop());
        effects
    }

    /// Escape cancels the session.
    pub fn escape_pressed(&mut self) -> Vec<Effect> {
        if !self.is_selecting() {
            return Vec::new();
        }
        let mut effects = self.stop();
        effects.push(Effect::Ui(UiEffect::Toast {
            notice: Notice::SelectionCancelled,
            ttl: self.config.toast_ttl,
        }));
        effects
    }

    /// Tear the session down. Idempotent; invalidates any armed rebuild
    /// timer, so no handler observes the session after this returns.
    pub fn stop(&mut self) -> Vec<Effect> {
        if self.phase == Phase::Inactive {
            return Vec::new();
        }
        self.phase = Phase::Inactive;
        self.stack.clear();
        self.index = 0;
        self.current = None;
        self.pending_point = None;
        self.move_seq = self.move_seq.wrapping_add(1);
        log::info!("selection session stopped");
        vec![Effect::Ui(UiEffect::ClearOverlays)]
    }
}
