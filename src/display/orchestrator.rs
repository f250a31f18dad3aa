//! Display orchestrator: decides once per loop tick whether, and what, to
//! repaint.
//!
//! ```text
//!                 begin() ok
//!   Uninitialized ──────────▶ Ready ◀──────────▶ Suspended
//!                               │   set_suspended
//!                               └─ overlay active / inactive
//! ```
//!
//! A repaint happens when the dirty flag is set, or when a non-zero
//! `refresh_interval_ms` has elapsed since the last one. With an interval of
//! 0 the panel is only touched when something asked for it, which keeps
//! self-updating pages flicker-free.

use std::vec::Vec;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};
use log::{debug, error, info};
use profont::PROFONT_24_POINT;

use super::overlay::{OverlayColors, TransientOverlay};
use super::page::{PageHandle, RefreshHandle};
use crate::app::ports::{Clock, Panel};
use crate::config::DisplayConfig;
use crate::error::DisplayError;

const PLACEHOLDER_TEXT: &str = "Miata";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Uninitialized,
    Ready,
    Suspended,
}

pub struct DisplayOrchestrator<P: Panel> {
    config: DisplayConfig,
    background: Rgb565,
    panel: P,
    surface: Option<P::Surface>,
    allocation_failed: bool,
    pages: Vec<PageHandle<P::Surface>>,
    current: usize,
    dirty: RefreshHandle,
    last_render_ms: u32,
    suspended: bool,
    overlay: TransientOverlay,
}

impl<P: Panel> DisplayOrchestrator<P> {
    pub fn new(config: DisplayConfig, panel: P) -> Self {
        Self {
            config,
            background: Rgb565::from(RawU16::new(config.background_rgb565)),
            panel,
            surface: None,
            allocation_failed: false,
            pages: Vec::new(),
            current: 0,
            dirty: RefreshHandle::new(),
            last_render_ms: 0,
            suspended: false,
            overlay: TransientOverlay::default(),
        }
    }

    /// Bring the panel up. Idempotent once it succeeded; a failed
    /// allocation is reported once and never retried.
    pub fn begin(&mut self, clock: &impl Clock) -> Result<(), DisplayError> {
        if self.surface.is_some() {
            return Ok(());
        }
        if self.allocation_failed {
            return Err(DisplayError::AllocationFailed);
        }

        let mut surface = match self.panel.allocate(&self.config) {
            Ok(s) => s,
            Err(e) => {
                error!("display: {e}");
                self.allocation_failed = true;
                return Err(e);
            }
        };

        self.panel.set_backlight(true);
        surface.clear(self.background).ok();
        if let Some(page) = self.pages.get(self.current) {
            page.borrow_mut().on_enter(&mut surface);
        }
        self.surface = Some(surface);

        self.suspended = false;
        self.overlay.cancel();
        self.dirty.set();
        self.last_render_ms = clock.now_ms();
        info!(
            "display: ready ({}x{}, rotation {}, {} pages)",
            self.config.width,
            self.config.height,
            self.config.rotation,
            self.pages.len()
        );
        Ok(())
    }

    /// One cooperative tick. Returns `true` if the surface was repainted.
    pub fn tick(&mut self, clock: &impl Clock) -> bool {
        if self.surface.is_none() || self.suspended {
            return false;
        }
        let now = clock.now_ms();

        if self.overlay.is_expired(now) {
            if self.overlay.clear() {
                self.reset_page_layout();
            }
            self.dirty.set();
        }

        let interval_due = self.config.refresh_interval_ms > 0
            && now.wrapping_sub(self.last_render_ms) >= self.config.refresh_interval_ms;
        let dirty = self.dirty.take();
        if !dirty && !interval_due {
            return false;
        }

        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        match self.pages.get(self.current) {
            Some(page) => page.borrow_mut().render(surface),
            None => draw_placeholder(surface, self.background),
        }
        self.overlay.draw(surface);
        self.last_render_ms = now;
        true
    }

    /// Append a page. The first page added to a running display is entered
    /// straight away.
    pub fn add_page(&mut self, page: PageHandle<P::Surface>) {
        self.pages.push(page);
        if self.pages.len() == 1 {
            if let Some(surface) = self.surface.as_mut() {
                self.pages[0].borrow_mut().on_enter(surface);
                self.dirty.set();
            }
        }
    }

    pub fn next_page(&mut self) {
        if self.pages.len() <= 1 {
            return;
        }
        let next = (self.current + 1) % self.pages.len();
        self.transition_to(next);
    }

    pub fn previous_page(&mut self) {
        if self.pages.len() <= 1 {
            return;
        }
        let previous = match self.current {
            0 => self.pages.len() - 1,
            i => i - 1,
        };
        self.transition_to(previous);
    }

    /// Jump to `index`. Out of range is ignored; the current page just gets
    /// a redraw.
    pub fn show_page(&mut self, index: usize) {
        if index >= self.pages.len() || self.surface.is_none() {
            return;
        }
        if index == self.current {
            self.dirty.set();
            return;
        }
        self.transition_to(index);
    }

    fn transition_to(&mut self, index: usize) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.pages[self.current].borrow_mut().on_exit(surface);
        debug!("display: page {} -> {}", self.current, index);
        self.current = index;
        self.pages[self.current].borrow_mut().on_enter(surface);
        self.dirty.set();
    }

    /// Flag the current page for a repaint on the next tick.
    pub fn request_refresh(&self) {
        self.dirty.set();
    }

    /// Shared handle to the dirty flag, for sensors and pages.
    pub fn refresh_handle(&self) -> RefreshHandle {
        self.dirty.clone()
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        if self.suspended == suspended {
            return;
        }
        self.suspended = suspended;
        self.panel.set_backlight(!suspended);
        if suspended {
            self.overlay.cancel();
            info!("display: suspended");
        } else {
            // Whatever was on the panel when it went dark is stale.
            self.reset_page_layout();
            self.dirty.set();
            info!("display: resumed");
        }
    }

    /// Show `text` over the current page. An empty `text` clears the
    /// overlay; `duration_ms` of 0 keeps it up until cleared.
    pub fn show_transient_message(
        &mut self,
        text: &str,
        duration_ms: u32,
        colors: OverlayColors,
        clock: &impl Clock,
    ) {
        if self.surface.is_none() || self.suspended {
            return;
        }
        if text.is_empty() {
            if self.overlay.clear() {
                self.reset_page_layout();
            }
        } else {
            self.overlay.show(text, duration_ms, colors, clock.now_ms());
        }
        self.dirty.set();
    }

    /// Clear to the background and let the current page repaint its base
    /// layout on the next render.
    fn reset_page_layout(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear(self.background).ok();
        if let Some(page) = self.pages.get(self.current) {
            page.borrow_mut().on_enter(surface);
        }
    }

    pub fn state(&self) -> DisplayState {
        match (self.surface.is_some(), self.suspended) {
            (false, _) => DisplayState::Uninitialized,
            (true, false) => DisplayState::Ready,
            (true, true) => DisplayState::Suspended,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn current_page_index(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn overlay(&self) -> &TransientOverlay {
        &self.overlay
    }

    pub fn last_render_ms(&self) -> u32 {
        self.last_render_ms
    }

    pub fn surface(&self) -> Option<&P::Surface> {
        self.surface.as_ref()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

fn draw_placeholder<D: DrawTarget<Color = Rgb565>>(surface: &mut D, background: Rgb565) {
    surface.clear(background).ok();
    let style = MonoTextStyle::new(&PROFONT_24_POINT, Rgb565::WHITE);
    let center = surface.bounding_box().center();
    Text::with_alignment(PLACEHOLDER_TEXT, center, style, Alignment::Center)
        .draw(surface)
        .ok();
}
