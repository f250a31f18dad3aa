//! Display subsystem: page contract, orchestrator, transient overlay, and
//! the concrete cluster pages.

pub mod orchestrator;
pub mod overlay;
pub mod page;
pub mod pages;

pub use orchestrator::{DisplayOrchestrator, DisplayState};
pub use overlay::{OverlayColors, TransientOverlay};
pub use page::{Page, PageHandle, RefreshHandle};
