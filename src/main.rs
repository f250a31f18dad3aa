//! Miata cluster firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  AdcAdapter     GpioLights    Gc9a01Panel    Esp32TimeAdapter  │
//! │  (AnalogPort)   (LightsPort)  (Panel)        (Clock)           │
//! │  LogEventSink   EdgeBinding (tach ISR → PulseCounter)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ClusterService (pure logic)                 │    │
//! │  │  TachometerSensor · TemperatureSensor · Display        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Command link: console lines → AppCommand                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::io::BufRead;
use std::sync::mpsc;

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripherals::Peripherals;
use log::{error, info, warn};

use cluster::adapters::edge_binding::EdgeBinding;
use cluster::adapters::hardware::{AdcAdapter, GpioLights};
use cluster::adapters::log_sink::LogEventSink;
use cluster::adapters::panel::{Gc9a01Panel, PanelPeripherals};
use cluster::adapters::time::Esp32TimeAdapter;
use cluster::app::service::ClusterService;
use cluster::config::SystemConfig;
use cluster::drivers::hw_init;
use cluster::pins;
use cluster::sensors::PulseCounter;

/// Shared with the tach ISR for the lifetime of the firmware.
static PULSE_COUNTER: PulseCounter = PulseCounter::new(0);

const CMD_LINK_STACK: usize = 4096;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Miata cluster v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    hw_init::init_peripherals()?;

    let config = SystemConfig::default();
    config.validate()?;

    // ── 2. Construct adapters ─────────────────────────────────
    let peripherals = Peripherals::take()?;
    let io = peripherals.pins;
    let panel = Gc9a01Panel::new(
        PanelPeripherals {
            spi: peripherals.spi2,
            sclk: io.gpio18.downgrade_output(),
            sdo: io.gpio23.downgrade_output(),
            cs: io.gpio5.downgrade_output(),
            dc: io.gpio16.downgrade_output(),
            rst: io.gpio17.downgrade_output(),
        },
        pins::TFT_BACKLIGHT_GPIO,
    );

    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let mut lights = GpioLights::new(pins::LIGHTS_GPIO);

    // ── 3. App service ────────────────────────────────────────
    let mut app = ClusterService::new(config.clone(), &PULSE_COUNTER, panel, AdcAdapter::new(), Ets);

    match app.begin(&clock, &mut sink) {
        Ok(()) => app.boot_log("Display ready", &clock),
        // Sensors and telemetry keep running without a panel.
        Err(e) => error!("Display unavailable ({}), continuing headless", e),
    }

    let _binding = EdgeBinding::claim(&PULSE_COUNTER, config.tach.signal_pin)?;
    app.boot_log("Tach bound", &clock);

    // ── 4. Command link ───────────────────────────────────────
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::Builder::new()
        .name("cmd-link".into())
        .stack_size(CMD_LINK_STACK)
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("cmd-link: read failed: {}", e);
                        break;
                    }
                }
            }
        })?;
    app.boot_log("Awaiting commands", &clock);

    app.start(&clock, &mut sink);
    info!("System ready. Entering main loop.");

    // ── 5. Main loop ──────────────────────────────────────────
    loop {
        while let Ok(line) = rx.try_recv() {
            app.handle_line(&line, &mut lights, &clock, &mut sink);
        }
        app.tick(&clock, &mut sink);
        FreeRtos::delay_ms(app.config().loop_period_ms);
    }
}
