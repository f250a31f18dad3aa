//! GC9A01 round panel adapter (firmware only).
//!
//! Implements [`Panel`] over SPI2 with `mipidsi`. The peripherals are
//! handed over once; a second `allocate` reports
//! [`DisplayError::AlreadyAllocated`]. Any driver failure during bring-up
//! is mapped to [`DisplayError::AllocationFailed`].

#[cfg(target_os = "espidf")]
pub use esp::{Gc9a01Display, Gc9a01Panel, PanelPeripherals};

use crate::config::DisplayConfig;

/// Quarter turns to degrees, clamped into 0..=270.
pub fn rotation_degrees(config: &DisplayConfig) -> u16 {
    u16::from(config.rotation % 4) * 90
}

#[cfg(target_os = "espidf")]
mod esp {
    use display_interface_spi::SPIInterface;
    use esp_idf_hal::delay::Delay;
    use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Output, PinDriver};
    use esp_idf_hal::spi::{config, SpiDeviceDriver, SpiDriver, SPI2};
    use esp_idf_hal::units::FromValueType;
    use log::{error, info};
    use mipidsi::models::GC9A01;
    use mipidsi::options::{ColorInversion, Orientation, Rotation};
    use mipidsi::Builder;

    use super::rotation_degrees;
    use crate::app::ports::Panel;
    use crate::config::DisplayConfig;
    use crate::drivers::hw_init;
    use crate::error::DisplayError;

    type Spi = SpiDeviceDriver<'static, SpiDriver<'static>>;
    type Pin = PinDriver<'static, AnyOutputPin, Output>;

    pub type Gc9a01Display = mipidsi::Display<SPIInterface<Spi, Pin>, GC9A01, Pin>;

    /// Everything the panel needs, moved out of `Peripherals` at boot.
    pub struct PanelPeripherals {
        pub spi: SPI2,
        pub sclk: AnyOutputPin,
        pub sdo: AnyOutputPin,
        pub cs: AnyOutputPin,
        pub dc: AnyOutputPin,
        pub rst: AnyOutputPin,
    }

    pub struct Gc9a01Panel {
        peripherals: Option<PanelPeripherals>,
        backlight_pin: i32,
    }

    impl Gc9a01Panel {
        pub fn new(peripherals: PanelPeripherals, backlight_pin: i32) -> Self {
            Self {
                peripherals: Some(peripherals),
                backlight_pin,
            }
        }
    }

    fn failed<E: core::fmt::Debug>(stage: &'static str) -> impl FnOnce(E) -> DisplayError {
        move |e| {
            error!("panel: {} failed: {:?}", stage, e);
            DisplayError::AllocationFailed
        }
    }

    impl Panel for Gc9a01Panel {
        type Surface = Gc9a01Display;

        fn allocate(&mut self, config: &DisplayConfig) -> Result<Gc9a01Display, DisplayError> {
            let p = self.peripherals.take().ok_or(DisplayError::AlreadyAllocated)?;

            let driver = SpiDriver::new(
                p.spi,
                p.sclk,
                p.sdo,
                None::<AnyIOPin>,
                &config::DriverConfig::new(),
            )
            .map_err(failed("spi bus"))?;
            let spi = SpiDeviceDriver::new(
                driver,
                Some(p.cs),
                &config::Config::new().baudrate(40.MHz().into()),
            )
            .map_err(failed("spi device"))?;
            let dc = PinDriver::output(p.dc).map_err(failed("dc pin"))?;
            let rst = PinDriver::output(p.rst).map_err(failed("reset pin"))?;

            let rotation = match rotation_degrees(config) {
                90 => Rotation::Deg90,
                180 => Rotation::Deg180,
                270 => Rotation::Deg270,
                _ => Rotation::Deg0,
            };

            let display = Builder::new(GC9A01, SPIInterface::new(spi, dc))
                .reset_pin(rst)
                .display_size(config.width, config.height)
                .orientation(Orientation::new().rotate(rotation))
                .invert_colors(ColorInversion::Inverted)
                .init(&mut Delay::new_default())
                .map_err(failed("gc9a01 init"))?;

            info!("panel: GC9A01 {}x{} up", config.width, config.height);
            Ok(display)
        }

        fn set_backlight(&mut self, on: bool) {
            hw_init::gpio_write(self.backlight_pin, on);
        }
    }
}
