//! Concrete pages for the round 240x240 panel.
//!
//! All pages share the same three-band layout:
//!
//! ```text
//!        ┌──────────────┐
//!        │    TITLE     │   drawn once per layout reset
//!        │              │
//!        │    VALUE     │   band cleared + redrawn every render
//!        │              │
//!        │    status    │   band cleared + redrawn every render
//!        └──────────────┘
//! ```
//!
//! Text is kept inside a safe margin so nothing is cut off by the round
//! bezel.

pub mod static_text;
pub mod tach;
pub mod water_temp;

pub use static_text::StaticTextPage;
pub use tach::TachPage;
pub use water_temp::WaterTempPage;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use profont::{PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

/// Inset from the panel edge that stays inside the round glass.
pub const SAFE_MARGIN: i32 = 24;

pub const TITLE_FONT: &MonoFont<'static> = &PROFONT_18_POINT;
pub const VALUE_FONT: &MonoFont<'static> = &PROFONT_24_POINT;
pub const STATUS_FONT: &MonoFont<'static> = &PROFONT_14_POINT;

const CENTERED_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

/// Colour set of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePalette {
    pub background: Rgb565,
    pub title: Rgb565,
    pub value: Rgb565,
    pub status: Rgb565,
}

/// Vertical centre of each band for a surface of `height` pixels.
pub(crate) fn title_y(_height: i32) -> i32 {
    SAFE_MARGIN + 20
}

pub(crate) fn value_y(height: i32) -> i32 {
    height / 2
}

pub(crate) fn status_y(height: i32) -> i32 {
    height - SAFE_MARGIN - 30
}

/// Draw `text` horizontally centred on `y`, nudged back inside the safe
/// margin if it would spill over.
pub(crate) fn draw_centered<D: DrawTarget<Color = Rgb565>>(
    surface: &mut D,
    text: &str,
    y: i32,
    font: &'static MonoFont<'static>,
    color: Rgb565,
) {
    if text.is_empty() {
        return;
    }
    let width = surface.bounding_box().size.width as i32;
    let style = MonoTextStyle::new(font, color);
    let mut position = Point::new(width / 2, y);

    let extent = Text::with_text_style(text, position, style, CENTERED_MIDDLE).bounding_box();
    let left = extent.top_left.x;
    let right = left + extent.size.width as i32;
    if left < SAFE_MARGIN {
        position.x += SAFE_MARGIN - left;
    } else if right > width - SAFE_MARGIN {
        position.x -= right - (width - SAFE_MARGIN);
    }

    Text::with_text_style(text, position, style, CENTERED_MIDDLE)
        .draw(surface)
        .ok();
}

/// Blank the band a line of `font` centred on `y` occupies.
pub(crate) fn clear_band<D: DrawTarget<Color = Rgb565>>(
    surface: &mut D,
    y: i32,
    font: &MonoFont<'_>,
    background: Rgb565,
) {
    let width = surface.bounding_box().size.width as i32 - SAFE_MARGIN * 2;
    if width <= 0 {
        return;
    }
    let height = font.character_size.height;
    let top = (y - height as i32 / 2).max(0);
    Rectangle::new(Point::new(SAFE_MARGIN, top), Size::new(width as u32, height))
        .into_styled(PrimitiveStyle::with_fill(background))
        .draw(surface)
        .ok();
}
