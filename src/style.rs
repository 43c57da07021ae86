//! Style Resolver.
//!
//! A pure function from a card's current interaction state to a
//! rectangle-and-transform descriptor. It holds no state of its own and is
//! recomputed on every frame; the precedence is:
//!
//! 1. focused + open (centered, enlarged, top layer)
//! 2. focused + opening/closing (parked at the captured origin)
//! 3. dragging (live position, dampened rotation, drag layer)
//! 4. persisted override (post-drag resting state)
//! 5. static default anchor

use crate::state::{DragController, FocusController, FocusPhase};
use crate::store::LayoutState;
use crate::types::{Card, CardId, EdgeAnchor, Point, Transition, Viewport};

// =============================================================================
// Layers & transform constants
// =============================================================================

/// Reserved layer for the focused card, above every normal card.
pub const FOCUS_LAYER_Z: i32 = 1000;

/// Layer for the card under the pointer, above resting cards but below the
/// focus layer.
pub const DRAG_LAYER_Z: i32 = 500;

/// Scale applied to non-media cards when fully open.
pub const FOCUS_SCALE: f32 = 1.5;

/// Media cards widen instead of scaling, so embedded content renders at
/// native fidelity.
pub const MEDIA_FOCUS_WIDTH: f32 = 60.0;

/// Slight lift while dragging.
pub const DRAG_SCALE: f32 = 1.02;

/// Resting rotation is dampened to this fraction while dragging.
pub const DRAG_ROTATION_FACTOR: f32 = 0.3;

// =============================================================================
// Descriptor
// =============================================================================

/// Where the card's frame sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedPos {
    /// Explicit top-left in viewport coordinates.
    At(Point),
    /// Anchored to the right edge: offset from the right, top offset.
    Right { right: f32, top: f32 },
    /// Centered at the viewport midpoint.
    Centered,
}

/// The resolved draw descriptor for one card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStyle {
    pub pos: ResolvedPos,
    pub width: f32,
    pub rotation: f32,
    pub scale: f32,
    pub z: i32,
    pub transition: Transition,
}

/// Interaction inputs to the resolver, assembled once per frame.
pub struct StyleCtx<'a> {
    pub focus_phase: FocusPhase,
    pub focused: Option<CardId>,
    pub focus_origin: Option<Point>,
    pub dragging: Option<CardId>,
    pub live_position: Option<Point>,
    pub layout: &'a LayoutState,
    pub viewport: Viewport,
}

impl<'a> StyleCtx<'a> {
    pub fn new(
        focus: &FocusController,
        drag: &DragController,
        layout: &'a LayoutState,
        viewport: Viewport,
    ) -> Self {
        Self {
            focus_phase: focus.phase(),
            focused: focus.focused(),
            focus_origin: focus.origin(),
            dragging: drag.dragging(),
            live_position: drag.live_position(),
            layout,
            viewport,
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// A card's static anchor position, resolved against the viewport.
pub fn default_pos(card: &Card, viewport: Viewport) -> ResolvedPos {
    let top = card.placement.top_pct / 100.0 * viewport.height;
    match card.placement.edge {
        EdgeAnchor::Left(pct) => ResolvedPos::At(Point::new(pct / 100.0 * viewport.width, top)),
        EdgeAnchor::Right(pct) => ResolvedPos::Right {
            right: pct / 100.0 * viewport.width,
            top,
        },
    }
}

/// Resolve the draw descriptor for `card` under the current interaction state.
pub fn resolve(card: &Card, ctx: &StyleCtx) -> CardStyle {
    let placement = card.placement;

    // 1 & 2: focus phases win over everything.
    if ctx.focused == Some(card.id) && ctx.focus_phase != FocusPhase::Idle {
        return match ctx.focus_phase {
            FocusPhase::Open => CardStyle {
                pos: ResolvedPos::Centered,
                width: if card.is_media() {
                    MEDIA_FOCUS_WIDTH
                } else {
                    placement.width
                },
                rotation: 0.0,
                scale: if card.is_media() { 1.0 } else { FOCUS_SCALE },
                z: FOCUS_LAYER_Z,
                transition: Transition::SMOOTH,
            },
            // Opening parks the card at its origin with no transition so the
            // starting frame renders once before the flip to Open; Closing
            // animates back to the same origin.
            FocusPhase::Opening | FocusPhase::Closing => CardStyle {
                pos: ctx
                    .focus_origin
                    .map(ResolvedPos::At)
                    .unwrap_or_else(|| default_pos(card, ctx.viewport)),
                width: placement.width,
                rotation: placement.rotation,
                scale: 1.0,
                z: FOCUS_LAYER_Z,
                transition: if ctx.focus_phase == FocusPhase::Closing {
                    Transition::SMOOTH
                } else {
                    Transition::empty()
                },
            },
            FocusPhase::Idle => unreachable!(),
        };
    }

    // 3: live drag tracks the pointer 1:1.
    if ctx.dragging == Some(card.id) {
        if let Some(live) = ctx.live_position {
            return CardStyle {
                pos: ResolvedPos::At(live),
                width: placement.width,
                rotation: placement.rotation * DRAG_ROTATION_FACTOR,
                scale: DRAG_SCALE,
                z: DRAG_LAYER_Z,
                transition: Transition::empty(),
            };
        }
    }

    // 4 & 5: resting, with or without a persisted override.
    let z = ctx.layout.z_for(card.id, placement.stack);
    let pos = match ctx.layout.positions.get(&card.id) {
        Some(p) => ResolvedPos::At(*p),
        None => default_pos(card, ctx.viewport),
    };
    CardStyle {
        pos,
        width: placement.width,
        rotation: placement.rotation,
        scale: 1.0,
        z,
        transition: Transition::empty(),
    }
}

// =============================================================================
// Tests
// =============================================================================
