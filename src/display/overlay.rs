//! Transient status overlay ("Lights ON", "Awake", ...).
//!
//! The overlay is a centered, padded box sized to its text and clamped to
//! the surface. It is painted after the current page, so it sits on top of
//! the page's last paint; the orchestrator resets the page layout when the
//! overlay goes away.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyleBuilder, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use heapless::String;
use profont::PROFONT_18_POINT;

/// Longest message kept; longer text is cut at a char boundary.
pub const MAX_OVERLAY_CHARS: usize = 48;

/// Space between the text and the box edge, in pixels.
const PADDING: u32 = 10;
const BORDER_WIDTH: u32 = 2;

const CENTERED_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayColors {
    pub text: Rgb565,
    pub background: Rgb565,
    pub border: Rgb565,
}

impl Default for OverlayColors {
    fn default() -> Self {
        Self {
            text: Rgb565::WHITE,
            background: Rgb565::BLACK,
            border: Rgb565::WHITE,
        }
    }
}

/// Overlay sub-state of the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct TransientOverlay {
    text: String<MAX_OVERLAY_CHARS>,
    shown_at_ms: u32,
    /// 0 = until cleared.
    duration_ms: u32,
    active: bool,
    /// Set once the overlay has been shown; the page under it needs its
    /// base layout repainted when it goes away.
    requires_page_reset: bool,
    colors: OverlayColors,
}

impl TransientOverlay {
    /// Replace whatever is showing and restart the timer.
    pub fn show(&mut self, text: &str, duration_ms: u32, colors: OverlayColors, now_ms: u32) {
        self.text = truncate(text);
        self.shown_at_ms = now_ms;
        self.duration_ms = duration_ms;
        self.colors = colors;
        self.active = true;
        self.requires_page_reset = true;
    }

    /// Deactivate. Returns `true` if the page underneath needs a layout
    /// reset.
    pub fn clear(&mut self) -> bool {
        let reset = self.active && self.requires_page_reset;
        self.active = false;
        self.requires_page_reset = false;
        reset
    }

    /// Drop the overlay without asking for a page reset (used on suspend).
    pub fn cancel(&mut self) {
        self.active = false;
        self.requires_page_reset = false;
    }

    pub fn is_expired(&self, now_ms: u32) -> bool {
        self.active
            && self.duration_ms > 0
            && now_ms.wrapping_sub(self.shown_at_ms) >= self.duration_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Paint on top of whatever is on the surface.
    pub fn draw<D: DrawTarget<Color = Rgb565>>(&self, surface: &mut D) {
        if !self.active || self.text.is_empty() {
            return;
        }
        let char_style = MonoTextStyle::new(&PROFONT_18_POINT, self.colors.text);
        let measured = Text::with_text_style(&self.text, Point::zero(), char_style, CENTERED_MIDDLE)
            .bounding_box()
            .size;
        let frame = overlay_frame(measured, surface.bounding_box(), PADDING);

        let box_style = PrimitiveStyleBuilder::new()
            .fill_color(self.colors.background)
            .stroke_color(self.colors.border)
            .stroke_width(BORDER_WIDTH)
            .build();
        frame.into_styled(box_style).draw(surface).ok();

        Text::with_text_style(&self.text, frame.center(), char_style, CENTERED_MIDDLE)
            .draw(surface)
            .ok();
    }
}

/// Box of `text + 2*padding`, centered in `bounds` and never larger than it.
pub fn overlay_frame(text: Size, bounds: Rectangle, padding: u32) -> Rectangle {
    let width = text
        .width
        .saturating_add(padding.saturating_mul(2))
        .min(bounds.size.width);
    let height = text
        .height
        .saturating_add(padding.saturating_mul(2))
        .min(bounds.size.height);
    let size = Size::new(width, height);
    let offset = Point::new(
        ((bounds.size.width - width) / 2) as i32,
        ((bounds.size.height - height) / 2) as i32,
    );
    Rectangle::new(bounds.top_left + offset, size)
}

fn truncate(text: &str) -> String<MAX_OVERLAY_CHARS> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
