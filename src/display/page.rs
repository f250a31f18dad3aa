//! The page contract and the shared dirty flag.
//!
//! A page owns its display-ready values and knows how to paint them. The
//! orchestrator only calls the three hooks below and never looks inside.

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::app::ports::RefreshSink;

/// One screen of the cluster.
pub trait Page<D: DrawTarget<Color = Rgb565>> {
    /// Page became current. Pages typically flag their base layout for a
    /// full repaint here.
    fn on_enter(&mut self, _surface: &mut D) {}

    /// Page is about to stop being current.
    fn on_exit(&mut self, _surface: &mut D) {}

    /// Paint the page. Called only when a repaint is due.
    fn render(&mut self, surface: &mut D);
}

/// Non-owning handle the orchestrator keeps; sensors hold another clone of
/// the same `Rc` through their view.
pub type PageHandle<D> = Rc<RefCell<dyn Page<D>>>;

/// Cloneable "content changed" flag.
///
/// Setting it never touches the panel, so sensors and command handlers can
/// hold a clone and call it before the display is up.
#[derive(Clone, Default)]
pub struct RefreshHandle(Rc<Cell<bool>>);

impl RefreshHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and clear.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self) {
        self.0.set(true);
    }
}

impl RefreshSink for RefreshHandle {
    fn request_refresh(&self) {
        self.set();
    }
}
