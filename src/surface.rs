//! Render Surface.
//!
//! Walks the static card dataset in insertion order and composes the layout
//! store, drag/focus controllers, and style resolver into draw-ready
//! [`CardVisual`]s. The surface owns no state: stacking is expressed purely
//! through each visual's z value (the painter sorts at paint time), never by
//! reordering the iteration.
//!
//! Also hosts the [`HitGrid`] used for O(1) pointer-to-card lookup.

use crate::media;
use crate::style::{self, CardStyle, ResolvedPos, StyleCtx};
use crate::types::{Card, CardId, CardKind, Viewport};

/// Narrowest frame we will draw, borders included.
const MIN_FRAME_WIDTH: u16 = 8;

// =============================================================================
// Visuals
// =============================================================================

/// Screen-space frame of a card in cells. `x`/`y` may be negative while a
/// card is dragged past the viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    /// Top-left corner as a point, the origin captured on focus.
    pub fn top_left(&self) -> crate::types::Point {
        crate::types::Point::new(self.x as f32, self.y as f32)
    }
}

/// What the media card shows in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaView {
    /// Resting view: thumbnail asset plus a play affordance.
    Thumbnail { thumbnail: String },
    /// Fully open view: the embedded player.
    Embed { embed: String },
    /// No recognizable video reference; static placeholder, no assets.
    Placeholder,
}

/// One card, resolved and measured, ready for the painter.
#[derive(Debug, Clone, PartialEq)]
pub struct CardVisual<'a> {
    pub card: &'a Card,
    pub style: CardStyle,
    pub rect: Rect,
    /// Present only for media cards.
    pub media: Option<MediaView>,
}

/// Compose the frame's visuals. Output order is dataset insertion order.
pub fn compose<'a>(cards: &'a [Card], ctx: &StyleCtx) -> Vec<CardVisual<'a>> {
    cards
        .iter()
        .map(|card| {
            let style = style::resolve(card, ctx);
            let rect = frame_rect(card, &style, ctx.viewport);
            let media = card.is_media().then(|| media_view(card, ctx));
            CardVisual {
                card,
                style,
                rect,
                media,
            }
        })
        .collect()
}

/// The media body for the card's current focus state. The embed only appears
/// while the card is focused and fully open; closing falls back to the
/// thumbnail.
fn media_view(card: &Card, ctx: &StyleCtx) -> MediaView {
    let Some(id) = card.media_url.and_then(media::video_id) else {
        return MediaView::Placeholder;
    };
    let fully_open =
        ctx.focused == Some(card.id) && ctx.focus_phase == crate::state::FocusPhase::Open;
    if fully_open {
        MediaView::Embed {
            embed: media::embed_url(id),
        }
    } else {
        MediaView::Thumbnail {
            thumbnail: media::thumbnail_url(id),
        }
    }
}

/// Measure a card's screen frame from its resolved style.
pub fn frame_rect(card: &Card, style: &CardStyle, viewport: Viewport) -> Rect {
    let w = ((style.width * style.scale).round() as i32)
        .clamp(MIN_FRAME_WIDTH as i32, u16::MAX as i32) as u16;
    let inner = w.saturating_sub(4).max(1) as usize;

    let body_lines: u16 = match card.kind {
        // Media body keeps a rough 4:1 cell aspect for the 16:9 frame.
        CardKind::Media => (w / 4).clamp(5, 16),
        CardKind::Quote | CardKind::Note => {
            let text_lines = card
                .text
                .map(|t| textwrap::wrap(t, inner).len() as u16)
                .unwrap_or(1);
            text_lines + if card.attribution.is_some() { 1 } else { 0 }
        }
    };
    let h = body_lines + 2;

    let (x, y) = match style.pos {
        ResolvedPos::At(p) => (p.x.round() as i32, p.y.round() as i32),
        ResolvedPos::Right { right, top } => (
            (viewport.width - right).round() as i32 - w as i32,
            top.round() as i32,
        ),
        ResolvedPos::Centered => (
            ((viewport.width - w as f32) / 2.0).round() as i32,
            ((viewport.height - h as f32) / 2.0).round() as i32,
        ),
    };

    Rect { x, y, w, h }
}

// =============================================================================
// Hit grid - O(1) pointer-to-card lookup
// =============================================================================

const EMPTY_CELL: CardId = CardId::MAX;

/// A grid of viewport cells, each holding the id of the topmost card covering
/// it. Refilled from the frame's visuals in ascending z order so later (higher)
/// cards overwrite lower ones.
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<CardId>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY_CELL; width as usize * height as usize],
        }
    }

    /// Resize the grid, clearing all contents.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(width as usize * height as usize, EMPTY_CELL);
    }

    pub fn clear(&mut self) {
        self.cells.fill(EMPTY_CELL);
    }

    /// Fill a frame with a card id, clipped to the grid.
    pub fn fill_rect(&mut self, rect: Rect, id: CardId) {
        let x0 = rect.x.max(0) as u16;
        let y0 = rect.y.max(0) as u16;
        let x1 = (rect.x + rect.w as i32).clamp(0, self.width as i32) as u16;
        let y1 = (rect.y + rect.h as i32).clamp(0, self.height as i32) as u16;
        for y in y0..y1 {
            for x in x0..x1.min(self.width) {
                let idx = y as usize * self.width as usize + x as usize;
                if idx < self.cells.len() {
                    self.cells[idx] = id;
                }
            }
        }
    }

    /// Rebuild from the frame's visuals, lowest z first so the topmost card
    /// wins every cell it covers.
    pub fn fill_from_visuals(&mut self, visuals: &[CardVisual]) {
        self.clear();
        let mut order: Vec<usize> = (0..visuals.len()).collect();
        order.sort_by_key(|&i| visuals[i].style.z);
        for i in order {
            self.fill_rect(visuals[i].rect, visuals[i].card.id);
        }
    }

    /// The card covering a cell, if any.
    pub fn get(&self, x: u16, y: u16) -> Option<CardId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let id = self.cells[y as usize * self.width as usize + x as usize];
        (id != EMPTY_CELL).then_some(id)
    }
}

// =============================================================================
// Tests
// =============================================================================
