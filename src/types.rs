//! Core types for fragment-desk.
//!
//! These types define the foundation that everything builds on: the static
//! card descriptors, viewport geometry, and the flag sets shared between the
//! style resolver and the render surface.

use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers & geometry
// =============================================================================

/// Stable identifier of a card in the static dataset.
pub type CardId = u32;

/// A 2D point in viewport coordinates (one unit = one terminal cell).
///
/// Used both for live pointer/drag positions and for persisted placement
/// overrides, so it round-trips through the layout record as plain `{x, y}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Current viewport dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport midpoint, the target of the focus-open animation.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

// =============================================================================
// Card descriptors
// =============================================================================

/// What a card holds. Media cards render a thumbnail/embed instead of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Quote,
    Note,
    Media,
}

/// Horizontal edge a card's default placement is anchored to.
///
/// Values are percentages of the viewport width (0-100), measured from the
/// named edge. Vertical placement is always a top offset percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeAnchor {
    Left(f32),
    Right(f32),
}

/// A card's static resting placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top offset as a percentage of viewport height (0-100).
    pub top_pct: f32,
    /// Horizontal anchor edge and offset percentage.
    pub edge: EdgeAnchor,
    /// Resting width in cells.
    pub width: f32,
    /// Resting rotation in degrees (dampened while dragging, reset when open).
    pub rotation: f32,
    /// Default stack order. Always below [`crate::store::BASE_MAX_Z`].
    pub stack: i32,
}

bitflags::bitflags! {
    /// Decorative flags rendered on the card chrome.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CardFlags: u8 {
        const TAPE = 1 << 0;
        const PIN = 1 << 1;
    }
}

/// Immutable static card descriptor. Built once at startup, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
    pub placement: Placement,
    pub text: Option<&'static str>,
    pub attribution: Option<&'static str>,
    /// External video URL for media cards; resolved via [`crate::media`].
    pub media_url: Option<&'static str>,
    pub flags: CardFlags,
    /// Font-size override in points. Purely presentational.
    pub font_size: Option<f32>,
}

impl Card {
    pub fn is_media(&self) -> bool {
        self.kind == CardKind::Media
    }
}

// =============================================================================
// Transition flags
// =============================================================================

bitflags::bitflags! {
    /// Which style properties animate when the descriptor changes.
    ///
    /// Empty means the card snaps instantly (drag tracking, the pre-animation
    /// frame of a focus-open).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Transition: u8 {
        const POSITION = 1 << 0;
        const TRANSFORM = 1 << 1;
        const WIDTH = 1 << 2;
    }
}

impl Transition {
    /// The full smooth-transition set used by the focus animation.
    pub const SMOOTH: Self = Self::POSITION.union(Self::TRANSFORM).union(Self::WIDTH);
}

// =============================================================================
// Tests
// =============================================================================
