//! Host doubles shared by the unit tests.

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;

use crate::app::ports::{
    AnalogPort, Clock, Panel, RefreshSink, TachometerView, TemperatureView,
};
use crate::config::DisplayConfig;
use crate::display::page::Page;
use crate::error::DisplayError;
use crate::sensors::tachometer::TachStatus;
use crate::sensors::temperature::TempStatus;

/// Clock the test moves by hand.
pub struct ManualClock {
    ms: Cell<u32>,
    us: Cell<u32>,
}

impl ManualClock {
    pub fn new(ms: u32) -> Self {
        Self {
            ms: Cell::new(ms),
            us: Cell::new(ms.wrapping_mul(1000)),
        }
    }

    pub fn advance_ms(&self, ms: u32) {
        self.ms.set(self.ms.get().wrapping_add(ms));
        self.us.set(self.us.get().wrapping_add(ms.wrapping_mul(1000)));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.ms.get()
    }

    fn now_us(&self) -> u32 {
        self.us.get()
    }
}

/// Counts `request_refresh` calls; clones share the count.
#[derive(Clone, Default)]
pub struct CountingRefresh(Rc<Cell<u32>>);

impl CountingRefresh {
    pub fn count(&self) -> u32 {
        self.0.get()
    }
}

impl RefreshSink for CountingRefresh {
    fn request_refresh(&self) {
        self.0.set(self.0.get() + 1);
    }
}

#[derive(Default)]
pub struct RecordingTachView {
    pub rpm: Option<f32>,
    pub status: Option<TachStatus>,
    pub rpm_writes: u32,
}

impl TachometerView for RecordingTachView {
    fn set_rpm(&mut self, rpm: f32) {
        self.rpm = Some(rpm);
        self.rpm_writes += 1;
    }

    fn set_status(&mut self, status: TachStatus) {
        self.status = Some(status);
    }
}

#[derive(Default)]
pub struct RecordingTempView {
    pub temperature: Option<f32>,
    pub status: Option<TempStatus>,
    pub temperature_writes: u32,
}

impl TemperatureView for RecordingTempView {
    fn set_temperature(&mut self, celsius: f32) {
        self.temperature = Some(celsius);
        self.temperature_writes += 1;
    }

    fn set_status(&mut self, status: TempStatus) {
        self.status = Some(status);
    }
}

/// ADC that returns a settable count; clones share state.
#[derive(Clone, Default)]
pub struct FixedAdc {
    count: Rc<Cell<u16>>,
    reads: Rc<Cell<u32>>,
    last_pin: Rc<Cell<i32>>,
}

impl FixedAdc {
    pub fn new(count: u16) -> Self {
        let adc = Self::default();
        adc.set(count);
        adc
    }

    pub fn set(&self, count: u16) {
        self.count.set(count);
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }

    pub fn last_pin(&self) -> i32 {
        self.last_pin.get()
    }
}

impl AnalogPort for FixedAdc {
    fn read_analog(&mut self, pin: i32) -> u16 {
        self.reads.set(self.reads.get() + 1);
        self.last_pin.set(pin);
        self.count.get()
    }
}

/// Delay that records the total requested time instead of sleeping.
#[derive(Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// ---------------------------------------------------------------------------
// Display doubles
// ---------------------------------------------------------------------------

pub const SURFACE_W: u32 = 240;
pub const SURFACE_H: u32 = 240;

/// In-memory 240x240 frame buffer.
pub struct MockSurface {
    pub frame: Vec<Rgb565>,
    pub clears: u32,
    pub pixels_drawn: u64,
}

impl Default for MockSurface {
    fn default() -> Self {
        Self {
            frame: vec![Rgb565::BLACK; (SURFACE_W * SURFACE_H) as usize],
            clears: 0,
            pixels_drawn: 0,
        }
    }
}

impl MockSurface {
    pub fn pixel(&self, x: u32, y: u32) -> Rgb565 {
        self.frame[(y * SURFACE_W + x) as usize]
    }
}

impl OriginDimensions for MockSurface {
    fn size(&self) -> Size {
        Size::new(SURFACE_W, SURFACE_H)
    }
}

impl DrawTarget for MockSurface {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < SURFACE_W && (p.y as u32) < SURFACE_H {
                self.frame[(p.y as u32 * SURFACE_W + p.x as u32) as usize] = color;
                self.pixels_drawn += 1;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clears += 1;
        self.frame.fill(color);
        Ok(())
    }
}

/// Panel that hands out a [`MockSurface`] and records backlight changes.
#[derive(Default)]
pub struct MockPanel {
    pub fail: bool,
    pub allocations: u32,
    pub backlight: Option<bool>,
}

impl Panel for MockPanel {
    type Surface = MockSurface;

    fn allocate(&mut self, _config: &DisplayConfig) -> Result<MockSurface, DisplayError> {
        self.allocations += 1;
        if self.fail {
            return Err(DisplayError::AllocationFailed);
        }
        Ok(MockSurface::default())
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = Some(on);
    }
}

/// Hook counters for one page; clones share them.
#[derive(Clone, Default)]
pub struct PageLog {
    pub renders: Rc<Cell<u32>>,
    pub enters: Rc<Cell<u32>>,
    pub exits: Rc<Cell<u32>>,
}

/// Page that fills the whole surface with one colour and counts hooks.
pub struct RecordingPage {
    pub color: Rgb565,
    pub log: PageLog,
}

impl RecordingPage {
    pub fn new(color: Rgb565) -> (Rc<RefCell<Self>>, PageLog) {
        let log = PageLog::default();
        let page = Rc::new(RefCell::new(Self {
            color,
            log: log.clone(),
        }));
        (page, log)
    }
}

impl<D: DrawTarget<Color = Rgb565>> Page<D> for RecordingPage {
    fn on_enter(&mut self, _surface: &mut D) {
        self.log.enters.set(self.log.enters.get() + 1);
    }

    fn on_exit(&mut self, _surface: &mut D) {
        self.log.exits.set(self.log.exits.get() + 1);
    }

    fn render(&mut self, surface: &mut D) {
        self.log.renders.set(self.log.renders.get() + 1);
        surface.clear(self.color).ok();
    }
}
