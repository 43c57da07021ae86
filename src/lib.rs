//! fragment-desk - a terminal desk of draggable fragment cards.
//!
//! A small collection of quotes, notes and one media clip laid out like
//! papers on a desk. Cards can be dragged anywhere and the arrangement
//! persists across sessions; clicking a card enlarges it to the center of
//! the screen, clicking again (or Esc) sends it back.
//!
//! # Architecture
//!
//! - [`dataset`] - the compiled-in card collection and default anchors
//! - [`store`] - the persisted layout (positions, z order) with change
//!   notification
//! - [`state`] - transient interaction state: drag gestures and the focus
//!   animation machine
//! - [`style`] - the pure per-card style resolver
//! - [`surface`] - frame composition, measurement and pointer hit testing
//! - [`runtime`] - the crossterm event loop and painter
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use fragment_desk::{dataset, runtime, store, types::Viewport};
//!
//! let storage = store::FileStorage::new(store::FileStorage::default_dir());
//! let layout = Rc::new(store::LayoutStore::new(Box::new(storage)));
//! let app = runtime::App::new(dataset::cards(), layout, Viewport::new(120.0, 40.0));
//! runtime::run(app)?;
//! ```

pub mod dataset;
pub mod media;
pub mod runtime;
pub mod state;
pub mod store;
pub mod style;
pub mod surface;
pub mod types;

pub use types::*;
