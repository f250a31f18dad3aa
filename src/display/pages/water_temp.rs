//! Coolant temperature page.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use super::{
    clear_band, draw_centered, status_y, title_y, value_y, PagePalette, STATUS_FONT, TITLE_FONT,
    VALUE_FONT,
};
use crate::app::ports::TemperatureView;
use crate::display::page::Page;
use crate::sensors::temperature::TempStatus;

pub struct WaterTempPage {
    title: &'static str,
    celsius: Option<f32>,
    status: &'static str,
    palette: PagePalette,
    layout_dirty: bool,
}

impl Default for WaterTempPage {
    fn default() -> Self {
        Self {
            title: "Water",
            celsius: None,
            status: "",
            palette: PagePalette {
                background: Rgb565::BLACK,
                title: Rgb565::WHITE,
                value: Rgb565::GREEN,
                status: Rgb565::YELLOW,
            },
            layout_dirty: true,
        }
    }
}

impl WaterTempPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn celsius(&self) -> Option<f32> {
        self.celsius
    }

    pub fn status_text(&self) -> &'static str {
        self.status
    }

    /// "87 C", or "-- C" before the first reading.
    pub fn temperature_text(&self) -> String<16> {
        let mut s = String::new();
        // Fits: i32 plus " C" is at most 13 chars.
        match self.celsius {
            Some(c) => write!(s, "{} C", c as i32).ok(),
            None => write!(s, "-- C").ok(),
        };
        s
    }
}

impl TemperatureView for WaterTempPage {
    fn set_temperature(&mut self, celsius: f32) {
        self.celsius = Some(celsius);
    }

    fn set_status(&mut self, status: TempStatus) {
        self.status = status.label();
    }
}

impl<D: DrawTarget<Color = Rgb565>> Page<D> for WaterTempPage {
    fn on_enter(&mut self, _surface: &mut D) {
        self.layout_dirty = true;
    }

    fn render(&mut self, surface: &mut D) {
        let height = surface.bounding_box().size.height as i32;
        let bg = self.palette.background;

        if self.layout_dirty {
            surface.clear(bg).ok();
            draw_centered(surface, self.title, title_y(height), TITLE_FONT, self.palette.title);
            self.layout_dirty = false;
        }

        let y = value_y(height);
        clear_band(surface, y, VALUE_FONT, bg);
        draw_centered(surface, &self.temperature_text(), y, VALUE_FONT, self.palette.value);

        let y = status_y(height);
        clear_band(surface, y, STATUS_FONT, bg);
        draw_centered(surface, self.status, y, STATUS_FONT, self.palette.status);
    }
}
