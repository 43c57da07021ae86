//! Pointer/Drag Controller.
//!
//! Tracks pointer-down → move → up/cancel sequences for one card at a time,
//! turning them into position updates, and distinguishes a drag from a click
//! by a small movement threshold.
//!
//! Two write-throughs to the layout store can happen per gesture: the z-bump
//! on pointer-down (so the grabbed card rises immediately) and the position
//! commit on pointer-end.

use std::rc::Rc;

use crate::store::LayoutStore;
use crate::types::{CardId, Point};

/// Movement beyond this many cells on either axis marks the gesture as a drag,
/// which suppresses the click that follows on pointer-up.
pub const DRAG_THRESHOLD: f32 = 3.0;

struct Gesture {
    id: CardId,
    /// Pointer position at pointer-down.
    pointer_origin: Point,
    /// Card top-left at pointer-down; deltas apply to this.
    card_origin: Point,
    /// Live drag position, set on the first move.
    live: Option<Point>,
}

pub struct DragController {
    store: Rc<LayoutStore>,
    gesture: Option<Gesture>,
    did_drag: bool,
}

impl DragController {
    pub fn new(store: Rc<LayoutStore>) -> Self {
        Self {
            store,
            gesture: None,
            did_drag: false,
        }
    }

    /// Card currently being dragged, if any.
    pub fn dragging(&self) -> Option<CardId> {
        self.gesture.as_ref().map(|g| g.id)
    }

    /// Live drag position, if the pointer has moved since pointer-down.
    pub fn live_position(&self) -> Option<Point> {
        self.gesture.as_ref().and_then(|g| g.live)
    }

    /// Whether the last gesture crossed the drag threshold.
    pub fn did_drag(&self) -> bool {
        self.did_drag
    }

    /// Consume the did-drag flag. The click router calls this on pointer-up;
    /// a true result means the click must not toggle focus.
    pub fn take_did_drag(&mut self) -> bool {
        std::mem::take(&mut self.did_drag)
    }

    /// Begin a gesture on `id`. Records the pointer and card origins, clears
    /// the did-drag flag, and immediately bumps the card's z-index through the
    /// store so it rises above its neighbors before any movement.
    ///
    /// A second pointer-down while a gesture is live is ignored (only the
    /// first touch point is tracked).
    pub fn pointer_down(&mut self, id: CardId, pointer: Point, card_top_left: Point) {
        if self.gesture.is_some() {
            return;
        }

        self.did_drag = false;
        self.gesture = Some(Gesture {
            id,
            pointer_origin: pointer,
            card_origin: card_top_left,
            live: None,
        });

        let mut next = self.store.snapshot().unwrap_or_default();
        next.bump_z(id);
        self.store.save(next);
    }

    /// Track a pointer move. No-op unless a gesture is live.
    pub fn pointer_move(&mut self, pointer: Point) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };

        let dx = pointer.x - gesture.pointer_origin.x;
        let dy = pointer.y - gesture.pointer_origin.y;
        if dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD {
            self.did_drag = true;
        }
        gesture.live = Some(Point::new(
            gesture.card_origin.x + dx,
            gesture.card_origin.y + dy,
        ));
    }

    /// End the gesture. Commits the live position into the store when one
    /// exists; always clears the gesture bookkeeping. The did-drag flag
    /// survives for the click router to consume.
    pub fn pointer_end(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if let Some(live) = gesture.live {
            let mut next = self.store.snapshot().unwrap_or_default();
            next.positions.insert(gesture.id, live);
            self.store.save(next);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
