//! One-shot hardware peripheral initialization.
//!
//! Configures the coolant ADC channel, the lights and backlight outputs,
//! the tach input and the GPIO ISR service using raw ESP-IDF sys calls.
//! Called once from `main()` before the loop starts. On the host every
//! entry point is a logging no-op so the rest of the crate links.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;
use crate::sensors::pulse_counter::PulseCounter;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrAttachFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrAttachFailed(rc) => write!(f, "tach ISR attach failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
        init_tach_input()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path. `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation covers the full 0-3.3 V divider swing.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::COOLANT_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH{}=coolant)", pins::COOLANT_ADC_CHANNEL);
    Ok(())
}

/// One raw conversion. A failed read returns 0, which the coolant sensor
/// reports as a saturated reading.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

/// Simulated coolant divider tap, roughly 50 °C on the stock sender.
#[cfg(not(target_os = "espidf"))]
pub const SIM_COOLANT_COUNTS: u16 = 658;

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    SIM_COOLANT_COUNTS
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::LIGHTS_GPIO, pins::TFT_BACKLIGHT_GPIO];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin as gpio_num_t, 0) };
    }

    info!("hw_init: GPIO outputs configured (lights, backlight)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output configured in
    // init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin as gpio_num_t, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    log::debug!("hw_init(sim): gpio {} <- {}", pin, high);
}

// ── Tach input + ISR ──────────────────────────────────────────

/// GPIO 34-39 have no internal pulls; the tach conditioner drives the
/// line push-pull.
#[cfg(target_os = "espidf")]
unsafe fn init_tach_input() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::TACH_SIGNAL_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    // ESP_ERR_INVALID_STATE means the service is already installed.
    let ret = unsafe { gpio_install_isr_service(0) };
    if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
        return Err(HwInitError::IsrInstallFailed(ret));
    }

    info!("hw_init: tach input configured (GPIO{}, rising edge)", pins::TACH_SIGNAL_GPIO);
    Ok(())
}

/// Rising-edge handler. `arg` is the `&'static PulseCounter` registered in
/// [`attach_tach_isr`].
#[cfg(target_os = "espidf")]
unsafe extern "C" fn tach_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: arg was produced from a &'static PulseCounter and is never
    // freed. esp_timer_get_time is an RTC counter read; safe in ISR context.
    let counter = unsafe { &*(arg as *const PulseCounter) };
    let now_us = unsafe { esp_timer_get_time() } as u32;
    counter.on_edge_at(now_us);
}

/// Route rising edges on `pin` to `counter`.
#[cfg(target_os = "espidf")]
pub fn attach_tach_isr(pin: i32, counter: &'static PulseCounter) -> Result<(), HwInitError> {
    let arg = core::ptr::from_ref(counter).cast_mut().cast::<core::ffi::c_void>();
    // SAFETY: the handler only touches the PulseCounter through its
    // critical section; the pointer outlives the registration.
    unsafe {
        gpio_set_intr_type(pin as gpio_num_t, gpio_int_type_t_GPIO_INTR_POSEDGE);
        let ret = gpio_isr_handler_add(pin as gpio_num_t, Some(tach_gpio_isr), arg);
        if ret != ESP_OK {
            return Err(HwInitError::IsrAttachFailed(ret));
        }
        gpio_intr_enable(pin as gpio_num_t);
    }
    info!("hw_init: tach ISR attached on GPIO{}", pin);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn attach_tach_isr(pin: i32, _counter: &'static PulseCounter) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): tach ISR on GPIO{} skipped", pin);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn detach_tach_isr(pin: i32) {
    // SAFETY: removing a handler that may not exist is harmless.
    unsafe {
        gpio_intr_disable(pin as gpio_num_t);
        gpio_isr_handler_remove(pin as gpio_num_t);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn detach_tach_isr(_pin: i32) {}
