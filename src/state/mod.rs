//! Transient interaction state.
//!
//! The drag and focus controllers own the per-gesture state the layout store
//! never sees: the live drag, the did-drag flag, and the focus animation
//! phase. Both are plain single-threaded objects driven by discrete input
//! callbacks from the runtime.

pub mod drag;
pub mod focus;

pub use drag::{DRAG_THRESHOLD, DragController};
pub use focus::{CLOSE_SETTLE, FocusController, FocusPhase};
