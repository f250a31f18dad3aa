//! Title plus a few lines of text. Used as the boot log screen.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::String;

use super::{draw_centered, title_y, STATUS_FONT, TITLE_FONT};
use crate::display::page::Page;

pub const MAX_BODY_BYTES: usize = 256;

const LINE_HEIGHT: i32 = 22;
const BODY_TOP: i32 = 90;

pub struct StaticTextPage {
    title: &'static str,
    body: String<MAX_BODY_BYTES>,
    background: Rgb565,
    title_color: Rgb565,
    body_color: Rgb565,
}

impl StaticTextPage {
    pub fn new(title: &'static str, body: &str) -> Self {
        let mut page = Self {
            title,
            body: String::new(),
            background: Rgb565::BLACK,
            title_color: Rgb565::WHITE,
            body_color: Rgb565::CYAN,
        };
        page.set_body(body);
        page
    }

    /// Replace the body; anything past the buffer is dropped.
    pub fn set_body(&mut self, body: &str) {
        self.body.clear();
        push_truncated(&mut self.body, body);
    }

    /// Add one line at the end of the body.
    pub fn append_line(&mut self, line: &str) {
        if !self.body.is_empty() {
            push_truncated(&mut self.body, "\n");
        }
        push_truncated(&mut self.body, line);
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

fn push_truncated<const N: usize>(dst: &mut String<N>, src: &str) {
    for ch in src.chars() {
        if dst.push(ch).is_err() {
            break;
        }
    }
}

impl<D: DrawTarget<Color = Rgb565>> Page<D> for StaticTextPage {
    fn render(&mut self, surface: &mut D) {
        surface.clear(self.background).ok();
        let height = surface.bounding_box().size.height as i32;
        draw_centered(surface, self.title, title_y(height), TITLE_FONT, self.title_color);

        for (i, line) in self.body.lines().enumerate() {
            let y = BODY_TOP + i as i32 * LINE_HEIGHT;
            if y > height {
                break;
            }
            draw_centered(surface, line, y, STATUS_FONT, self.body_color);
        }
    }
}
