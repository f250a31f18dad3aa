//! Engine speed page.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use super::{
    clear_band, draw_centered, status_y, title_y, value_y, PagePalette, STATUS_FONT, TITLE_FONT,
    VALUE_FONT,
};
use crate::app::ports::TachometerView;
use crate::display::page::Page;
use crate::sensors::tachometer::TachStatus;

pub struct TachPage {
    title: &'static str,
    rpm: f32,
    status: &'static str,
    palette: PagePalette,
    layout_dirty: bool,
}

impl Default for TachPage {
    fn default() -> Self {
        Self {
            title: "Tacho",
            rpm: 0.0,
            status: TachStatus::AwaitingSignal.label(),
            palette: PagePalette {
                background: Rgb565::BLACK,
                title: Rgb565::WHITE,
                value: Rgb565::RED,
                status: Rgb565::YELLOW,
            },
            layout_dirty: true,
        }
    }
}

impl TachPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    pub fn status_text(&self) -> &'static str {
        self.status
    }

    /// Whole-rpm text as shown on the panel.
    pub fn rpm_text(&self) -> String<12> {
        let mut s = String::new();
        // Fits: i32 is at most 11 chars.
        write!(s, "{}", self.rpm as i32).ok();
        s
    }

    fn draw_base_layout<D: DrawTarget<Color = Rgb565>>(&mut self, surface: &mut D) {
        surface.clear(self.palette.background).ok();
        let height = surface.bounding_box().size.height as i32;
        draw_centered(surface, self.title, title_y(height), TITLE_FONT, self.palette.title);
        self.layout_dirty = false;
    }
}

impl TachometerView for TachPage {
    fn set_rpm(&mut self, rpm: f32) {
        self.rpm = rpm;
    }

    fn set_status(&mut self, status: TachStatus) {
        self.status = status.label();
    }
}

impl<D: DrawTarget<Color = Rgb565>> Page<D> for TachPage {
    fn on_enter(&mut self, _surface: &mut D) {
        self.layout_dirty = true;
    }

    fn render(&mut self, surface: &mut D) {
        if self.layout_dirty {
            self.draw_base_layout(surface);
        }
        let height = surface.bounding_box().size.height as i32;
        let bg = self.palette.background;

        let y = value_y(height);
        clear_band(surface, y, VALUE_FONT, bg);
        draw_centered(surface, &self.rpm_text(), y, VALUE_FONT, self.palette.value);

        let y = status_y(height);
        clear_band(surface, y, STATUS_FONT, bg);
        draw_centered(surface, self.status, y, STATUS_FONT, self.palette.status);
    }
}
