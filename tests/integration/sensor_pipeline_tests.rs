//! Sensor pipeline: simulated ISR edges and ADC counts through the sensors
//! into real cluster pages.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use cluster::config::{TachConfig, TemperatureConfig};
use cluster::display::page::RefreshHandle;
use cluster::display::pages::{TachPage, WaterTempPage};
use cluster::sensors::calibration::CalibrationCurve;
use cluster::sensors::{PulseCounter, TachStatus, TachometerSensor, TempStatus, TemperatureSensor};

use super::mock_hw::{ManualClock, NoDelay, ScriptedAdc};

/// Fire `count` edges `spacing_us` apart, advancing the clock.
fn pulse_train(counter: &PulseCounter, clock: &ManualClock, count: u32, spacing_us: u32) {
    for _ in 0..count {
        counter.on_edge(clock);
        clock.advance_us(spacing_us);
    }
}

#[test]
fn tach_tracks_engine_speed_across_windows() {
    let counter = PulseCounter::new(0);
    let clock = ManualClock::at_ms(1_000);
    let page = Rc::new(RefCell::new(TachPage::new()));
    let refresh = RefreshHandle::new();
    let mut tach = TachometerSensor::new(TachConfig::default(), &counter, page.clone(), refresh.clone());
    tach.begin(&clock);

    // 3000 rpm at 2 pulses/rev = 100 Hz: 25 edges in a 250 ms window.
    pulse_train(&counter, &clock, 25, 10_000);
    assert_eq!(tach.update(&clock), Some(3000.0));
    assert!(refresh.take());
    assert_eq!(page.borrow().rpm_text().as_str(), "3000");

    // Same speed next window: inside the threshold, nothing propagated.
    pulse_train(&counter, &clock, 25, 10_000);
    assert_eq!(tach.update(&clock), None);
    assert!(!refresh.is_set());

    // Up to 6000 rpm.
    pulse_train(&counter, &clock, 50, 5_000);
    assert_eq!(tach.update(&clock), Some(6000.0));
    assert_eq!(tach.status(), TachStatus::Redline);
    assert_eq!(page.borrow().status_text(), "Shift pls");
}

#[test]
fn edges_racing_drain_are_counted_once() {
    static COUNTER: PulseCounter = PulseCounter::new(0);
    const EDGES: u32 = 200_000;

    COUNTER.set_armed(true);
    let done = Arc::new(AtomicBool::new(false));
    let producer = {
        let done = done.clone();
        thread::spawn(move || {
            let mut accepted = 0u32;
            for t in 0..EDGES {
                if COUNTER.on_edge_at(t) {
                    accepted += 1;
                }
            }
            done.store(true, Ordering::Release);
            accepted
        })
    };

    let mut drained = 0u32;
    while !done.load(Ordering::Acquire) {
        drained += COUNTER.drain();
    }
    let accepted = producer.join().unwrap();
    drained += COUNTER.drain();

    assert_eq!(accepted, EDGES);
    assert_eq!(drained, accepted);
}

#[test]
fn bounce_is_rejected_by_min_edge_interval() {
    let counter = PulseCounter::new(0);
    let clock = ManualClock::at_ms(0);
    let page = Rc::new(RefCell::new(TachPage::new()));
    let mut tach = TachometerSensor::new(TachConfig::default(), &counter, page.clone(), RefreshHandle::new());
    tach.begin(&clock);

    // Each real edge followed by a bounce 200 µs later.
    for _ in 0..25 {
        counter.on_edge(&clock);
        clock.advance_us(200);
        counter.on_edge(&clock);
        clock.advance_us(9_800);
    }
    assert_eq!(tach.update(&clock), Some(3000.0));
}

#[test]
fn sleeping_tach_ignores_edges() {
    let counter = PulseCounter::new(0);
    let clock = ManualClock::at_ms(0);
    let page = Rc::new(RefCell::new(TachPage::new()));
    let mut tach = TachometerSensor::new(TachConfig::default(), &counter, page.clone(), RefreshHandle::new());
    tach.begin(&clock);

    tach.set_enabled(false, &clock);
    pulse_train(&counter, &clock, 40, 10_000);
    assert_eq!(counter.pending(), 0);
    assert_eq!(tach.update(&clock), None);
    assert_eq!(page.borrow().status_text(), "Sleeping");

    tach.set_enabled(true, &clock);
    assert_eq!(page.borrow().status_text(), "Awaiting tach signal");
    pulse_train(&counter, &clock, 5, 50_000);
    // 5 edges over 250 ms: 600 rpm, idle.
    assert_eq!(tach.update(&clock), Some(600.0));
    assert_eq!(page.borrow().status_text(), "Idle");
}

#[test]
fn coolant_warms_up_through_the_curve() {
    let adc = ScriptedAdc::new(0);
    adc.set_ohms(2300.0);
    let clock = ManualClock::at_ms(0);
    let page = Rc::new(RefCell::new(WaterTempPage::new()));
    let refresh = RefreshHandle::new();
    let mut coolant = TemperatureSensor::new(
        TemperatureConfig::default(),
        CalibrationCurve::miata_coolant(),
        adc.clone(),
        NoDelay,
        page.clone(),
        refresh.clone(),
    );
    coolant.begin(&clock);

    let first = coolant.update(&clock).unwrap();
    assert!((first - 20.0).abs() < 0.5);
    assert_eq!(page.borrow().status_text(), "Warming up");
    assert_eq!(adc.reads(), 16);

    // Not yet due.
    adc.set_ohms(250.0);
    clock.advance_ms(100);
    assert_eq!(coolant.update(&clock), None);

    // 250 Ω sits between the 80 °C and 100 °C breakpoints.
    clock.advance_ms(400);
    let warm = coolant.update(&clock).unwrap();
    assert!((warm - 88.3).abs() < 0.5);
    assert_eq!(coolant.status(), TempStatus::Normal);
    assert_eq!(page.borrow().temperature_text().as_str(), "88 C");
}

#[test]
fn open_sender_reports_and_recovers() {
    let adc = ScriptedAdc::new(4095);
    let clock = ManualClock::at_ms(0);
    let page = Rc::new(RefCell::new(WaterTempPage::new()));
    let mut coolant = TemperatureSensor::new(
        TemperatureConfig::default(),
        CalibrationCurve::miata_coolant(),
        adc.clone(),
        NoDelay,
        page.clone(),
        RefreshHandle::new(),
    );
    coolant.begin(&clock);

    assert_eq!(coolant.update(&clock), None);
    assert_eq!(page.borrow().status_text(), "Sensor error");
    assert_eq!(page.borrow().temperature_text().as_str(), "-- C");

    adc.set_ohms(250.0);
    clock.advance_ms(TemperatureConfig::default().sample_interval_ms);
    let back = coolant.update(&clock).unwrap();
    assert!((back - 88.3).abs() < 0.5);
    assert_eq!(page.borrow().status_text(), "");
}
