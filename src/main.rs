use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use fragment_desk::dataset;
use fragment_desk::runtime::{self, App};
use fragment_desk::store::{FileStorage, LayoutStore};
use fragment_desk::types::Viewport;

fn main() -> Result<()> {
    let state_dir = FileStorage::default_dir();
    fs::create_dir_all(&state_dir)
        .with_context(|| format!("create state dir {}", state_dir.display()))?;
    init_logging(&state_dir)?;

    let store = Rc::new(LayoutStore::new(Box::new(FileStorage::new(
        state_dir.clone(),
    ))));

    let (width, height) = crossterm::terminal::size().context("query terminal size")?;
    let app = App::new(
        dataset::cards(),
        store,
        Viewport::new(width as f32, height as f32),
    );
    runtime::run(app)
}

/// Log to a file in the state dir so the alternate screen stays clean.
/// Filter via `FRAGMENT_DESK_LOG` (defaults to `info`).
fn init_logging(state_dir: &Path) -> Result<()> {
    let log_path = state_dir.join("fragment-desk.log");
    let file = fs::File::create(&log_path)
        .with_context(|| format!("open log file {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FRAGMENT_DESK_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
