//! Integration tests for the full ClusterService: boot, per-tick
//! orchestration, commands and low-power mode, driven through mock ports.

use cluster::app::commands::CommandError;
use cluster::app::events::AppEvent;
use cluster::app::service::{ClusterService, BOOT_PAGE, TACH_PAGE, WATER_PAGE};
use cluster::config::SystemConfig;
use cluster::error::DisplayError;
use cluster::sensors::PulseCounter;

use super::mock_hw::{
    ManualClock, NoDelay, PanelLog, RecordingLights, RecordingPanel, RecordingSink, ScriptedAdc,
};

type Service<'a> = ClusterService<'a, RecordingPanel, ScriptedAdc, NoDelay>;

struct Rig<'a> {
    app: Service<'a>,
    clock: ManualClock,
    adc: ScriptedAdc,
    sink: RecordingSink,
    lights: RecordingLights,
    panel: std::rc::Rc<PanelLog>,
}

fn boot(counter: &PulseCounter) -> Rig<'_> {
    let (panel, log) = RecordingPanel::new();
    let adc = ScriptedAdc::new(0);
    adc.set_ohms(300.0);
    let clock = ManualClock::at_ms(10);
    let mut sink = RecordingSink::new();
    let mut app = ClusterService::new(SystemConfig::default(), counter, panel, adc.clone(), NoDelay);
    app.begin(&clock, &mut sink).unwrap();
    app.boot_log("Display ready", &clock);
    app.start(&clock, &mut sink);
    Rig {
        app,
        clock,
        adc,
        sink,
        lights: RecordingLights::default(),
        panel: log,
    }
}

impl Rig<'_> {
    fn line(&mut self, line: &str) {
        self.app
            .handle_line(line, &mut self.lights, &self.clock, &mut self.sink);
    }

    fn tick(&mut self) -> bool {
        self.app.tick(&self.clock, &mut self.sink)
    }

    /// Feed a steady pulse train for one tach window and tick.
    fn run_window(&mut self, counter: &PulseCounter, edges: u32) {
        let window_us = 250_000;
        let spacing = window_us / edges.max(1);
        for _ in 0..edges {
            counter.on_edge(&self.clock);
            self.clock.advance_us(spacing);
        }
        self.clock.advance_us(window_us - spacing * edges);
        self.tick();
    }
}

#[test]
fn boot_sequence_shows_log_then_tach() {
    let counter = PulseCounter::new(0);
    let rig = boot(&counter);

    assert_eq!(rig.app.boot_page().borrow().body(), "Booting\nDisplay ready");
    assert_eq!(rig.app.display().current_page_index(), TACH_PAGE);
    assert_eq!(rig.app.display().page_count(), 3);
    assert_eq!(rig.panel.allocations.get(), 1);
    assert_eq!(rig.sink.last(), Some(AppEvent::Started));
    assert!(!rig.app.lights_on());
}

#[test]
fn headless_when_panel_fails() {
    let counter = PulseCounter::new(0);
    let (panel, _log) = RecordingPanel::failing();
    let clock = ManualClock::at_ms(0);
    let mut sink = RecordingSink::new();
    let mut app: Service<'_> =
        ClusterService::new(SystemConfig::default(), &counter, panel, ScriptedAdc::new(1000), NoDelay);

    assert_eq!(app.begin(&clock, &mut sink), Err(DisplayError::AllocationFailed));
    app.start(&clock, &mut sink);

    // Sensors still run and telemetry still flows.
    assert!(!app.tick(&clock, &mut sink));
    assert!(app.coolant().last_celsius().is_some());
    clock.advance_ms(500);
    app.tick(&clock, &mut sink);
    assert!(matches!(sink.last(), Some(AppEvent::Telemetry(_))));
}

#[test]
fn engine_run_updates_pages_and_telemetry() {
    let counter = PulseCounter::new(0);
    let mut rig = boot(&counter);

    // First tick samples the coolant straight away.
    assert!(rig.tick());
    let water = rig.app.water_page().borrow().celsius().unwrap();
    assert!((water - 80.0).abs() < 0.5);

    rig.run_window(&counter, 20); // 2400 rpm
    assert_eq!(rig.app.tach_page().borrow().rpm_text().as_str(), "2400");

    rig.run_window(&counter, 20);
    let telemetry = rig
        .sink
        .events
        .borrow()
        .iter()
        .rev()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .unwrap();
    assert_eq!(telemetry.rpm, 2400);
    assert_eq!(telemetry.page, TACH_PAGE);
    assert!(telemetry.water_c.is_some());
    let json = telemetry.to_json().unwrap();
    assert!(json.starts_with(r#"{"rpm":2400,"water_c":"#));
}

#[test]
fn coolant_change_repaints_only_its_page_values() {
    let counter = PulseCounter::new(0);
    let mut rig = boot(&counter);
    rig.tick();
    rig.line("PAGE:1");
    assert_eq!(rig.app.display().current_page_index(), WATER_PAGE);

    rig.adc.set_ohms(180.0);
    rig.clock.advance_ms(500);
    assert!(rig.tick());
    assert_eq!(rig.app.water_page().borrow().temperature_text().as_str(), "100 C");
}

#[test]
fn command_link_session() {
    let counter = PulseCounter::new(0);
    let mut rig = boot(&counter);

    rig.app.handle_command(
        cluster::app::commands::AppCommand::ClientConnected,
        &mut rig.lights,
        &rig.clock,
        &mut rig.sink,
    );
    assert_eq!(rig.app.display().overlay().text(), "Connected");

    rig.line("lights");
    rig.line("LIGHTS:OFF");
    assert_eq!(rig.lights.calls, vec![true, false]);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::LightsChanged(_))),
        2
    );

    rig.line("menu");
    assert_eq!(rig.app.display().current_page_index(), BOOT_PAGE);
    rig.line("PAGE:9");
    assert_eq!(rig.app.display().current_page_index(), BOOT_PAGE);
    rig.line("PAGE:x");
    assert_eq!(
        rig.sink.last(),
        Some(AppEvent::CommandRejected(CommandError::BadPageIndex))
    );
    assert_eq!(rig.app.display().overlay().text(), "Unknown cmd");

    rig.line("MSG:Check oil");
    assert_eq!(rig.app.display().overlay().text(), "Check oil");
    rig.line("MSG:");
    assert!(!rig.app.display().overlay().is_active());

    // Overlay expires after the configured duration.
    rig.line("MSG:Hello");
    rig.clock.advance_ms(SystemConfig::default().overlay_duration_ms);
    rig.tick();
    assert!(!rig.app.display().overlay().is_active());
}

#[test]
fn sleep_and_wake_cycle() {
    let counter = PulseCounter::new(0);
    let mut rig = boot(&counter);
    rig.run_window(&counter, 25);
    assert_eq!(rig.app.tach().last_rpm(), 3000.0);

    rig.line("SLEEP");
    assert!(rig.app.is_low_power());
    assert_eq!(rig.panel.backlight.get(), Some(false));
    assert_eq!(rig.app.tach_page().borrow().rpm(), 0.0);

    // Nothing counted, sampled or painted while asleep.
    let reads = rig.adc.reads();
    rig.run_window(&counter, 25);
    rig.clock.advance_ms(1000);
    assert!(!rig.tick());
    assert_eq!(rig.adc.reads(), reads);
    assert_eq!(counter.pending(), 0);
    assert!(rig.app.build_telemetry().low_power);

    rig.line("WAKE");
    assert!(!rig.app.is_low_power());
    assert_eq!(rig.panel.backlight.get(), Some(true));
    assert_eq!(rig.app.display().overlay().text(), "Awake");
    assert!(rig.tick());

    rig.run_window(&counter, 25);
    assert_eq!(rig.app.tach().last_rpm(), 3000.0);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::LowPowerChanged(_))),
        2
    );
}
