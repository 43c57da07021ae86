//! Terminal runtime.
//!
//! Owns the cooperative event loop: crossterm input events feed the drag and
//! focus controllers, every tick advances the focus machine and recomposes the
//! surface, and the painter draws the visuals back to the terminal. All state
//! transitions happen on this one thread, on discrete callbacks.
//!
//! The painter sorts by z at paint time; the surface itself never reorders.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::state::{DragController, FocusController};
use crate::store::{LayoutState, LayoutStore};
use crate::style::StyleCtx;
use crate::surface::{self, CardVisual, HitGrid, MediaView, Rect};
use crate::types::{Card, CardFlags, CardId, CardKind, Point, Viewport};

/// Paint cadence when no input is pending (~60fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// =============================================================================
// App - input routing over the controllers
// =============================================================================

/// The active pointer-down, kept until the matching release.
struct Press {
    card: Option<CardId>,
    /// Top-left of the pressed card at press time; the focus origin.
    top_left: Point,
}

pub struct App {
    cards: Vec<Card>,
    store: Rc<LayoutStore>,
    drag: DragController,
    focus: FocusController,
    viewport: Viewport,
    hit: HitGrid,
    /// Screen frames from the last composed frame, for origin capture.
    rects: HashMap<CardId, Rect>,
    press: Option<Press>,
}

impl App {
    pub fn new(cards: Vec<Card>, store: Rc<LayoutStore>, viewport: Viewport) -> Self {
        store.load(&cards);
        let mut app = Self {
            drag: DragController::new(store.clone()),
            focus: FocusController::new(),
            hit: HitGrid::new(viewport.width as u16, viewport.height as u16),
            rects: HashMap::new(),
            press: None,
            cards,
            store,
            viewport,
        };
        // Seed the hit grid and frames before the first input arrives.
        let _ = app.frame(Instant::now());
        app
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport::new(width as f32, height as f32);
        self.hit.resize(width, height);
    }

    /// Route a mouse event. Only the left button participates; other buttons
    /// and extra touch points are ignored.
    pub fn handle_mouse(&mut self, ev: MouseEvent, now: Instant) {
        let pointer = Point::new(ev.column as f32, ev.row as f32);
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let card = self.hit.get(ev.column, ev.row);
                let top_left = card
                    .and_then(|id| self.rects.get(&id))
                    .map(|r| r.top_left())
                    .unwrap_or(pointer);
                self.press = Some(Press { card, top_left });

                if let Some(id) = card {
                    // The focused card is not grabbable while the focus
                    // machine is engaged; its click routes to close instead.
                    if self.focus.is_idle() || self.focus.focused() != Some(id) {
                        self.drag.pointer_down(id, pointer, top_left);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.drag.pointer_move(pointer),
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag.pointer_end();
                let dragged = self.drag.take_did_drag();
                if let Some(press) = self.press.take() {
                    if dragged {
                        debug!(card = ?press.card, "drag committed, click suppressed");
                    } else {
                        match press.card {
                            Some(id) => {
                                self.focus.toggle(id, press.top_left, now);
                            }
                            // Overlay click: close whatever is open.
                            None => {
                                self.focus.request_close(now);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Route a key event. Returns true when the app should quit.
    pub fn handle_key(&mut self, ev: KeyEvent, now: Instant) -> bool {
        if ev.kind != KeyEventKind::Press {
            return false;
        }
        match ev.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') if ev.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => {
                self.focus.request_close(now);
            }
            // Reset the arrangement through the ordinary save path.
            KeyCode::Char('r') => self.store.save(LayoutState::default()),
            _ => {}
        }
        false
    }

    /// One frame: recompose the surface, refresh the hit grid and cached
    /// frames, then advance the focus machine. Advancing after composition is
    /// what makes the opening frame real: a click's Opening phase is composed
    /// once with the card parked at its captured origin, and only the next
    /// frame renders it centered. Returns the visuals for the painter.
    pub fn frame(&mut self, now: Instant) -> Vec<CardVisual<'_>> {
        let layout = self.store.snapshot().unwrap_or_default();
        let ctx = StyleCtx::new(&self.focus, &self.drag, &layout, self.viewport);
        let visuals = surface::compose(&self.cards, &ctx);
        self.rects = visuals.iter().map(|v| (v.card.id, v.rect)).collect();
        self.hit.fill_from_visuals(&visuals);
        self.focus.advance(now);
        visuals
    }
}

// =============================================================================
// Event loop
// =============================================================================

/// Run the app against the real terminal until quit.
pub fn run(mut app: App) -> Result<()> {
    let mut out = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(out, EnterAlternateScreen, EnableMouseCapture, Hide)?;

    let result = event_loop(&mut app, &mut out);

    execute!(out, Show, DisableMouseCapture, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn event_loop(app: &mut App, out: &mut impl Write) -> Result<()> {
    loop {
        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => {
                    if app.handle_key(key, Instant::now()) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                Event::Resize(w, h) => app.resize(w, h),
                _ => {}
            }
        }
        let viewport = app.viewport();
        let visuals = app.frame(Instant::now());
        paint(out, &visuals, viewport)?;
    }
}

// =============================================================================
// Painter
// =============================================================================

const TAPE_MARK: &str = "▒▒▒▒";
const PIN_MARK: char = '◉';

fn kind_color(kind: CardKind) -> Color {
    match kind {
        CardKind::Quote => Color::Rgb {
            r: 222,
            g: 205,
            b: 160,
        },
        CardKind::Note => Color::Rgb {
            r: 168,
            g: 200,
            b: 220,
        },
        CardKind::Media => Color::Rgb {
            r: 212,
            g: 165,
            b: 200,
        },
    }
}

/// Paint all visuals, lowest z first so higher cards overdraw lower ones.
pub fn paint(out: &mut impl Write, visuals: &[CardVisual], viewport: Viewport) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), ResetColor)?;

    let mut order: Vec<usize> = (0..visuals.len()).collect();
    order.sort_by_key(|&i| visuals[i].style.z);
    for &i in &order {
        draw_card(out, &visuals[i], viewport)?;
    }

    if viewport.height >= 1.0 {
        let hint_row = (viewport.height as u16).saturating_sub(1);
        queue!(
            out,
            MoveTo(0, hint_row),
            SetForegroundColor(Color::DarkGrey),
            Print(" drag cards to arrange · click to focus · r reset · q quit"),
            ResetColor
        )?;
    }
    out.flush()
}

fn draw_card(out: &mut impl Write, visual: &CardVisual, viewport: Viewport) -> io::Result<()> {
    let rect = visual.rect;
    let vw = viewport.width as i32;
    let vh = viewport.height as i32;
    if rect.x + rect.w as i32 <= 0 || rect.y + rect.h as i32 <= 0 || rect.x >= vw || rect.y >= vh {
        return Ok(());
    }

    let rows = card_rows(visual);
    queue!(out, SetForegroundColor(kind_color(visual.card.kind)))?;
    for (dy, row) in rows.iter().enumerate() {
        let y = rect.y + dy as i32;
        if y < 0 || y >= vh {
            continue;
        }
        if let Some((x, clipped)) = visible_slice(row, rect.x, vw) {
            queue!(out, MoveTo(x, y as u16), Print(clipped))?;
        }
    }
    queue!(out, ResetColor)?;
    Ok(())
}

/// Render a card's rows: rounded border, body, decorations.
fn card_rows(visual: &CardVisual) -> Vec<String> {
    let rect = visual.rect;
    let w = rect.w as usize;
    let inner = w.saturating_sub(2);

    let mut top: String = format!("╭{}╮", "─".repeat(inner));
    if visual.card.flags.contains(CardFlags::TAPE) && inner > TAPE_MARK.chars().count() + 2 {
        let at = (w - TAPE_MARK.chars().count()) / 2;
        top = splice(&top, at, TAPE_MARK);
    }
    if visual.card.flags.contains(CardFlags::PIN) && w >= 2 {
        top = splice(&top, w - 2, &PIN_MARK.to_string());
    }

    let mut rows = vec![top];
    for line in body_lines(visual, inner.saturating_sub(2).max(1)) {
        rows.push(format!("│ {} │", pad(&line, inner.saturating_sub(2))));
    }
    rows.push(format!("╰{}╯", "─".repeat(inner)));

    // Body shorter than the measured frame is padded with blank rows.
    while rows.len() < rect.h as usize {
        let idx = rows.len() - 1;
        rows.insert(idx, format!("│{}│", " ".repeat(inner)));
    }
    rows
}

fn body_lines(visual: &CardVisual, width: usize) -> Vec<String> {
    match &visual.media {
        Some(MediaView::Thumbnail { thumbnail }) => {
            let mut lines = vec![String::new(), center("▶", width), String::new()];
            if let Some(attribution) = visual.card.attribution {
                lines.push(truncate(attribution, width));
            }
            lines.push(truncate(thumbnail, width));
            lines
        }
        Some(MediaView::Embed { embed }) => {
            let mut lines = vec![
                String::new(),
                center("▶ ▶ ▶", width),
                String::new(),
                center("[ playing ]", width),
                String::new(),
            ];
            lines.push(truncate(embed, width));
            if let Some(attribution) = visual.card.attribution {
                lines.push(truncate(attribution, width));
            }
            lines
        }
        Some(MediaView::Placeholder) => {
            vec![String::new(), center("( no preview )", width), String::new()]
        }
        None => {
            let mut lines: Vec<String> = visual
                .card
                .text
                .map(|t| {
                    textwrap::wrap(t, width.max(1))
                        .into_iter()
                        .map(|l| l.into_owned())
                        .collect()
                })
                .unwrap_or_default();
            if let Some(attribution) = visual.card.attribution {
                lines.push(right_align(&format!("— {attribution}"), width));
            }
            lines
        }
    }
}

// =============================================================================
// Row helpers
// =============================================================================

fn display_width(s: &str) -> usize {
    s.chars().filter_map(UnicodeWidthChar::width).sum()
}

fn pad(s: &str, width: usize) -> String {
    let current = display_width(s);
    if current >= width {
        truncate(s, width)
    } else {
        format!("{s}{}", " ".repeat(width - current))
    }
}

fn truncate(s: &str, width: usize) -> String {
    let mut acc = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        acc.push(ch);
    }
    if used < width {
        acc.push_str(&" ".repeat(width - used));
    }
    acc
}

fn center(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        return truncate(s, width);
    }
    let left = (width - w) / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(width - w - left))
}

fn right_align(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        return truncate(s, width);
    }
    format!("{}{}", " ".repeat(width - w), s)
}

/// Replace cells of `row` starting at char index `at` with `mark`.
fn splice(row: &str, at: usize, mark: &str) -> String {
    let chars: Vec<char> = row.chars().collect();
    let mark_chars: Vec<char> = mark.chars().collect();
    let mut result = chars.clone();
    for (i, &c) in mark_chars.iter().enumerate() {
        if at + i < result.len() {
            result[at + i] = c;
        }
    }
    result.into_iter().collect()
}

/// Clip a row against the left/right viewport edges. Returns the screen x and
/// the visible substring, or None when nothing is visible.
fn visible_slice(row: &str, x: i32, vw: i32) -> Option<(u16, String)> {
    if x >= vw {
        return None;
    }
    let skip = (-x).max(0) as usize;
    let start_x = x.max(0);
    let budget = (vw - start_x) as usize;

    let mut acc = String::new();
    let mut seen = 0usize;
    let mut used = 0usize;
    for ch in row.chars() {
        let w = ch.width().unwrap_or(0);
        if seen < skip {
            seen += w;
            continue;
        }
        if used + w > budget {
            break;
        }
        used += w;
        acc.push(ch);
    }
    if acc.is_empty() {
        None
    } else {
        Some((start_x as u16, acc))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use crate::state::{CLOSE_SETTLE, FocusPhase};
    use crate::store::{BASE_MAX_Z, MemStorage};
    use crate::style::ResolvedPos;

    const VIEWPORT: Viewport = Viewport::new(200.0, 100.0);

    fn app() -> App {
        let store = Rc::new(LayoutStore::new(Box::new(MemStorage::new())));
        App::new(dataset::cards(), store, VIEWPORT)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    fn down(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    fn drag_to(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
    }

    fn up(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Up(MouseButton::Left), column, row)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    /// Card 19 defaults to top 16%, left 5% of the 200x100 test viewport.
    const CARD_19_AT: (u16, u16) = (12, 17);

    #[test]
    fn test_click_composes_origin_frame_before_centering() {
        let t0 = Instant::now();
        let mut app = app();

        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(up(CARD_19_AT.0, CARD_19_AT.1), t0);
        assert_eq!(app.focus.phase(), FocusPhase::Opening);
        assert_eq!(app.focus.focused(), Some(19));
        // Origin captured from the card frame, not the pointer.
        assert_eq!(app.focus.origin(), Some(Point::new(10.0, 16.0)));

        // The first composed frame after the click parks the card at its
        // captured origin with no transition; the flip to Open happens only
        // after it has been composed.
        let visuals = app.frame(t0);
        let v19 = visuals.iter().find(|v| v.card.id == 19).unwrap();
        assert_eq!(v19.style.pos, ResolvedPos::At(Point::new(10.0, 16.0)));
        assert!(v19.style.transition.is_empty());
        drop(visuals);
        assert_eq!(app.focus.phase(), FocusPhase::Open);

        // The second frame renders it centered.
        let visuals = app.frame(t0);
        let v19 = visuals.iter().find(|v| v.card.id == 19).unwrap();
        assert_eq!(v19.style.pos, ResolvedPos::Centered);
    }

    #[test]
    fn test_drag_beyond_threshold_suppresses_focus() {
        let t0 = Instant::now();
        let mut app = app();

        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(drag_to(30, 30), t0);
        app.handle_mouse(up(30, 30), t0);

        assert!(app.focus.is_idle());
        let state = app.store.snapshot().unwrap();
        // top-left (10,16) moved by the pointer delta (18,13).
        assert_eq!(state.positions.get(&19), Some(&Point::new(28.0, 29.0)));
        assert!(state.max_z > BASE_MAX_Z);
    }

    #[test]
    fn test_motionless_click_only_bumps_z() {
        let t0 = Instant::now();
        let mut app = app();

        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(up(CARD_19_AT.0, CARD_19_AT.1), t0);

        let state = app.store.snapshot().unwrap();
        assert!(state.positions.is_empty());
        assert_eq!(state.z_indexes.get(&19), Some(&(BASE_MAX_Z + 1)));
    }

    #[test]
    fn test_overlay_click_closes_and_card_returns_to_anchor() {
        let t0 = Instant::now();
        let mut app = app();

        // Open card 19.
        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(up(CARD_19_AT.0, CARD_19_AT.1), t0);
        let _ = app.frame(t0);
        assert_eq!(app.focus.phase(), FocusPhase::Open);

        // Click an empty corner of the desk.
        app.handle_mouse(down(199, 99), t0);
        app.handle_mouse(up(199, 99), t0);
        assert_eq!(app.focus.phase(), FocusPhase::Closing);

        // After the settle delay the machine goes idle and card 19 sits back
        // at its static anchor (it has no position override).
        let settled = t0 + CLOSE_SETTLE + Duration::from_millis(10);
        let _ = app.frame(settled);
        assert!(app.focus.is_idle());
        let visuals = app.frame(settled);
        let v19 = visuals.iter().find(|v| v.card.id == 19).unwrap();
        assert_eq!(v19.style.pos, ResolvedPos::At(Point::new(10.0, 16.0)));
        // The z bumped by the opening click persists past the close.
        assert_eq!(v19.style.z, BASE_MAX_Z + 1);
    }

    #[test]
    fn test_second_click_on_open_card_closes_it() {
        let t0 = Instant::now();
        let mut app = app();

        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(up(CARD_19_AT.0, CARD_19_AT.1), t0);
        // Origin frame, then the centered frame (which fills the hit grid).
        let _ = app.frame(t0);
        let _ = app.frame(t0);

        // The open card is centered now; click the viewport midpoint.
        app.handle_mouse(down(100, 50), t0);
        app.handle_mouse(up(100, 50), t0);
        assert_eq!(app.focus.phase(), FocusPhase::Closing);
    }

    #[test]
    fn test_focused_card_is_not_grabbable() {
        let t0 = Instant::now();
        let mut app = app();

        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(up(CARD_19_AT.0, CARD_19_AT.1), t0);
        let _ = app.frame(t0);
        assert_eq!(app.focus.phase(), FocusPhase::Open);
        let _ = app.frame(t0);

        // Press on the centered card: no drag gesture starts.
        app.handle_mouse(down(100, 50), t0);
        assert!(app.drag.dragging().is_none());
        app.handle_mouse(up(100, 50), t0);
    }

    #[test]
    fn test_esc_closes_open_card() {
        let t0 = Instant::now();
        let mut app = app();

        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(up(CARD_19_AT.0, CARD_19_AT.1), t0);
        let _ = app.frame(t0);

        assert!(!app.handle_key(key(KeyCode::Esc), t0));
        assert_eq!(app.focus.phase(), FocusPhase::Closing);
    }

    #[test]
    fn test_reset_clears_overrides_through_save_path() {
        let t0 = Instant::now();
        let mut app = app();

        app.handle_mouse(down(CARD_19_AT.0, CARD_19_AT.1), t0);
        app.handle_mouse(drag_to(40, 40), t0);
        app.handle_mouse(up(40, 40), t0);
        assert!(!app.store.snapshot().unwrap().positions.is_empty());

        assert!(!app.handle_key(key(KeyCode::Char('r')), t0));
        assert_eq!(app.store.snapshot(), Some(LayoutState::default()));
    }

    #[test]
    fn test_quit_keys() {
        let t0 = Instant::now();
        let mut app = app();
        assert!(app.handle_key(key(KeyCode::Char('q')), t0));
        assert!(app.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            t0
        ));
        assert!(!app.handle_key(key(KeyCode::Char('x')), t0));
    }

    #[test]
    fn test_paint_smoke() {
        let t0 = Instant::now();
        let mut app = app();
        let viewport = app.viewport();
        let visuals = app.frame(t0);
        let mut buf: Vec<u8> = Vec::new();
        paint(&mut buf, &visuals, viewport).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Emily Dickinson"));
        assert!(text.contains("▶"));
    }

    #[test]
    fn test_paint_survives_degenerate_viewport() {
        // A terminal can report a zero-height viewport through resize.
        let mut buf: Vec<u8> = Vec::new();
        paint(&mut buf, &[], Viewport::new(0.0, 0.0)).unwrap();
        paint(&mut buf, &[], Viewport::new(80.0, 0.0)).unwrap();
    }

    #[test]
    fn test_visible_slice_clipping() {
        assert_eq!(visible_slice("hello", 0, 10), Some((0, "hello".into())));
        assert_eq!(visible_slice("hello", -2, 10), Some((0, "llo".into())));
        assert_eq!(visible_slice("hello", 8, 10), Some((8, "he".into())));
        assert_eq!(visible_slice("hello", 10, 10), None);
        assert_eq!(visible_slice("hi", -5, 10), None);
    }
}
