//! DisplayOrchestrator against a recording panel: lifecycle, repaint
//! scheduling, overlays and suspend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cluster::app::ports::{RefreshSink, TachometerView};
use cluster::config::DisplayConfig;
use cluster::display::overlay::OverlayColors;
use cluster::display::page::{Page, PageHandle};
use cluster::display::pages::TachPage;
use cluster::display::{DisplayOrchestrator, DisplayState};
use cluster::error::DisplayError;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::mock_hw::{ManualClock, RecordingPanel, RecordingSurface};

/// Page that counts its hooks.
#[derive(Default)]
struct CountingPage {
    renders: Rc<Cell<u32>>,
    enters: Rc<Cell<u32>>,
}

impl Page<RecordingSurface> for CountingPage {
    fn on_enter(&mut self, _surface: &mut RecordingSurface) {
        self.enters.set(self.enters.get() + 1);
    }

    fn render(&mut self, surface: &mut RecordingSurface) {
        self.renders.set(self.renders.get() + 1);
        surface.clear(Rgb565::BLUE).ok();
    }
}

fn counting_page() -> (PageHandle<RecordingSurface>, Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let page = CountingPage::default();
    let renders = page.renders.clone();
    let enters = page.enters.clone();
    (Rc::new(RefCell::new(page)), renders, enters)
}

#[test]
fn event_driven_repaint_only_when_dirty() {
    let (panel, log) = RecordingPanel::new();
    let clock = ManualClock::at_ms(0);
    let mut display = DisplayOrchestrator::new(DisplayConfig::default(), panel);
    let (page, renders, enters) = counting_page();
    display.add_page(page);

    display.begin(&clock).unwrap();
    assert_eq!(display.state(), DisplayState::Ready);
    assert_eq!(log.backlight.get(), Some(true));
    assert_eq!(enters.get(), 1);

    assert!(display.tick(&clock));
    for _ in 0..10 {
        clock.advance_ms(50);
        assert!(!display.tick(&clock));
    }
    assert_eq!(renders.get(), 1);

    display.refresh_handle().request_refresh();
    assert!(display.tick(&clock));
    assert_eq!(renders.get(), 2);
}

#[test]
fn periodic_refresh_interval() {
    let (panel, _log) = RecordingPanel::new();
    let clock = ManualClock::at_ms(0);
    let config = DisplayConfig {
        refresh_interval_ms: 100,
        ..DisplayConfig::default()
    };
    let mut display = DisplayOrchestrator::new(config, panel);
    let (page, renders, _) = counting_page();
    display.add_page(page);
    display.begin(&clock).unwrap();
    display.tick(&clock);

    clock.advance_ms(99);
    assert!(!display.tick(&clock));
    clock.advance_ms(1);
    assert!(display.tick(&clock));
    assert_eq!(renders.get(), 2);
}

#[test]
fn allocation_failure_is_final() {
    let (panel, log) = RecordingPanel::failing();
    let clock = ManualClock::at_ms(0);
    let mut display = DisplayOrchestrator::new(DisplayConfig::default(), panel);

    assert_eq!(display.begin(&clock), Err(DisplayError::AllocationFailed));
    assert_eq!(display.begin(&clock), Err(DisplayError::AllocationFailed));
    assert_eq!(log.allocations.get(), 1);
    assert!(!display.tick(&clock));

    // Everything else is a quiet no-op.
    display.next_page();
    display.show_transient_message("hi", 1000, OverlayColors::default(), &clock);
    assert!(!display.overlay().is_active());
}

#[test]
fn overlay_expiry_resets_the_page() {
    let (panel, log) = RecordingPanel::new();
    let clock = ManualClock::at_ms(0);
    let mut display = DisplayOrchestrator::new(DisplayConfig::default(), panel);
    let (page, renders, enters) = counting_page();
    display.add_page(page);
    display.begin(&clock).unwrap();
    display.tick(&clock);

    display.show_transient_message("Lights ON", 2000, OverlayColors::default(), &clock);
    let pixels_before = log.pixels.get();
    assert!(display.tick(&clock));
    assert!(log.pixels.get() > pixels_before, "overlay box drawn");

    clock.advance_ms(1999);
    assert!(!display.tick(&clock));
    assert!(display.overlay().is_active());

    clock.advance_ms(1);
    assert!(display.tick(&clock));
    assert!(!display.overlay().is_active());
    assert_eq!(enters.get(), 2, "page layout reset on expiry");
    assert_eq!(renders.get(), 3);
}

#[test]
fn suspend_goes_dark_and_resume_repaints() {
    let (panel, log) = RecordingPanel::new();
    let clock = ManualClock::at_ms(0);
    let mut display = DisplayOrchestrator::new(DisplayConfig::default(), panel);
    let (page, renders, _) = counting_page();
    display.add_page(page);
    display.begin(&clock).unwrap();
    display.tick(&clock);

    display.set_suspended(true);
    assert_eq!(display.state(), DisplayState::Suspended);
    assert_eq!(log.backlight.get(), Some(false));
    display.request_refresh();
    assert!(!display.tick(&clock));

    display.set_suspended(false);
    assert_eq!(log.backlight.get(), Some(true));
    assert!(display.tick(&clock));
    assert_eq!(renders.get(), 2);
}

#[test]
fn tach_page_renders_on_the_panel() {
    let (panel, log) = RecordingPanel::new();
    let clock = ManualClock::at_ms(0);
    let mut display = DisplayOrchestrator::new(DisplayConfig::default(), panel);
    let tach = Rc::new(RefCell::new(TachPage::new()));
    let handle: PageHandle<RecordingSurface> = tach.clone();
    display.add_page(handle);
    display.begin(&clock).unwrap();
    display.tick(&clock);

    let clears = log.clears.get();
    let pixels = log.pixels.get();
    tach.borrow_mut().set_rpm(4200.0);
    display.request_refresh();
    assert!(display.tick(&clock));
    assert!(log.pixels.get() > pixels);
    // Value updates repaint bands, not the whole screen.
    assert_eq!(log.clears.get(), clears);
}
