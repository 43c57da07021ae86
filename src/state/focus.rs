//! Focus Controller.
//!
//! A four-phase machine driving the enlarge/restore animation of a single
//! focused card:
//!
//! ```text
//! Idle --press--> Opening --frame--> Open --press--> Closing --450ms--> Idle
//! ```
//!
//! `Opening` exists so the card is rendered once at its captured origin before
//! the flip to `Open`; the flip on the next frame callback is what animates,
//! instead of an instant jump. `Closing` runs the reverse animation and
//! settles back to `Idle` after the declared transition time.
//!
//! Focus state is purely transient. Nothing here touches the layout store.

use std::time::{Duration, Instant};

use crate::types::{CardId, Point};

/// How long the closing animation runs before the machine settles to idle.
/// Matches the transition duration the style resolver declares.
pub const CLOSE_SETTLE: Duration = Duration::from_millis(450);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPhase {
    #[default]
    Idle,
    /// Target chosen; card still rendered at its captured origin.
    Opening,
    /// Card centered and enlarged.
    Open,
    /// Reverse animation back to the origin.
    Closing,
}

#[derive(Default)]
pub struct FocusController {
    phase: FocusPhase,
    focused: Option<CardId>,
    origin: Option<Point>,
    settle_at: Option<Instant>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FocusPhase {
        self.phase
    }

    pub fn focused(&self) -> Option<CardId> {
        self.focused
    }

    /// The card's on-screen top-left captured at focus time.
    pub fn origin(&self) -> Option<Point> {
        self.origin
    }

    pub fn is_idle(&self) -> bool {
        self.phase == FocusPhase::Idle
    }

    /// Begin focusing `id`, capturing its current top-left as the animation
    /// origin. Rejected unless the machine is idle: one focus gesture at a
    /// time, no replace-in-flight.
    pub fn request_focus(&mut self, id: CardId, origin: Point) -> bool {
        if self.phase != FocusPhase::Idle {
            return false;
        }
        self.phase = FocusPhase::Opening;
        self.focused = Some(id);
        self.origin = Some(origin);
        true
    }

    /// Begin the reverse animation. Only valid while fully open; this is the
    /// path for a second click on the card, an overlay click, or Esc.
    pub fn request_close(&mut self, now: Instant) -> bool {
        if self.phase != FocusPhase::Open {
            return false;
        }
        self.phase = FocusPhase::Closing;
        self.settle_at = Some(now + CLOSE_SETTLE);
        true
    }

    /// Click routing for a card: focus it when idle, close it when it is the
    /// open card. Anything else (mid-animation, a different card while one is
    /// open) is ignored.
    pub fn toggle(&mut self, id: CardId, origin: Point, now: Instant) -> bool {
        match self.phase {
            FocusPhase::Idle => self.request_focus(id, origin),
            FocusPhase::Open if self.focused == Some(id) => self.request_close(now),
            _ => false,
        }
    }

    /// Frame callback. Flips `Opening -> Open` (the paint after the origin
    /// frame) and settles `Closing -> Idle` once the deadline has passed.
    pub fn advance(&mut self, now: Instant) {
        match self.phase {
            FocusPhase::Opening => self.phase = FocusPhase::Open,
            FocusPhase::Closing => {
                if self.settle_at.is_some_and(|at| now >= at) {
                    self.phase = FocusPhase::Idle;
                    self.focused = None;
                    self.origin = None;
                    self.settle_at = None;
                }
            }
            _ => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let t0 = Instant::now();
        let mut focus = FocusController::new();
        assert!(focus.is_idle());

        // Click while idle: Opening immediately.
        assert!(focus.request_focus(19, Point::new(5.0, 16.0)));
        assert_eq!(focus.phase(), FocusPhase::Opening);
        assert_eq!(focus.focused(), Some(19));
        assert_eq!(focus.origin(), Some(Point::new(5.0, 16.0)));

        // Next frame: Open.
        focus.advance(t0);
        assert_eq!(focus.phase(), FocusPhase::Open);

        // Click again: Closing immediately.
        assert!(focus.request_close(t0));
        assert_eq!(focus.phase(), FocusPhase::Closing);
        // The focused id survives through the closing animation.
        assert_eq!(focus.focused(), Some(19));

        // Not yet settled one tick before the deadline.
        focus.advance(t0 + Duration::from_millis(449));
        assert_eq!(focus.phase(), FocusPhase::Closing);

        // Settled at the deadline, everything cleared.
        focus.advance(t0 + CLOSE_SETTLE);
        assert!(focus.is_idle());
        assert_eq!(focus.focused(), None);
        assert_eq!(focus.origin(), None);
    }

    #[test]
    fn test_focus_rejected_unless_idle() {
        let t0 = Instant::now();
        let mut focus = FocusController::new();
        focus.request_focus(19, Point::default());

        // Opening.
        assert!(!focus.request_focus(22, Point::default()));
        focus.advance(t0);

        // Open.
        assert!(!focus.request_focus(22, Point::default()));
        focus.request_close(t0);

        // Closing.
        assert!(!focus.request_focus(22, Point::default()));
        assert_eq!(focus.focused(), Some(19));

        // Idle again: accepted.
        focus.advance(t0 + CLOSE_SETTLE);
        assert!(focus.request_focus(22, Point::default()));
    }

    #[test]
    fn test_toggle_routes_by_phase() {
        let t0 = Instant::now();
        let mut focus = FocusController::new();

        assert!(focus.toggle(19, Point::default(), t0));
        assert_eq!(focus.phase(), FocusPhase::Opening);

        // Toggling mid-animation does nothing.
        assert!(!focus.toggle(19, Point::default(), t0));
        focus.advance(t0);

        // A different card while open does not switch focus.
        assert!(!focus.toggle(22, Point::default(), t0));
        assert_eq!(focus.phase(), FocusPhase::Open);
        assert_eq!(focus.focused(), Some(19));

        // The open card toggles closed.
        assert!(focus.toggle(19, Point::default(), t0));
        assert_eq!(focus.phase(), FocusPhase::Closing);
    }

    #[test]
    fn test_close_rejected_unless_open() {
        let t0 = Instant::now();
        let mut focus = FocusController::new();
        assert!(!focus.request_close(t0));

        focus.request_focus(19, Point::default());
        // Opening, not yet open.
        assert!(!focus.request_close(t0));

        focus.advance(t0);
        assert!(focus.request_close(t0));
        // Already closing.
        assert!(!focus.request_close(t0));
    }

    #[test]
    fn test_advance_is_idempotent_when_idle_or_open() {
        let t0 = Instant::now();
        let mut focus = FocusController::new();
        focus.advance(t0);
        assert!(focus.is_idle());

        focus.request_focus(19, Point::default());
        focus.advance(t0);
        focus.advance(t0 + Duration::from_secs(5));
        assert_eq!(focus.phase(), FocusPhase::Open);
    }
}
