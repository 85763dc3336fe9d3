//! One-shot hardware peripheral initialization.
//!
//! Configures the current-sense ADC channels, relay outputs and the
//! ultrasonic trigger/echo pins using raw ESP-IDF sys calls.  Called once
//! from `main()` before the control loop starts.
//!
//! On host builds every helper is backed by atomics so adapters and
//! drivers can be exercised in tests (`sim_*` functions).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::Error;
#[cfg(target_os = "espidf")]
use crate::pins;
use crate::sensors::current::ADC_READ_FAILED;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::AdcInitFailed(_) => Error::Init("ADC1"),
            HwInitError::GpioConfigFailed(_) => Error::Init("GPIO"),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
        init_gpio_inputs()?;
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
/// main-loop ADC read path.  `init_adc()` completes before the loop starts.
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

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for ch in [
        pins::PUMP_1_SENSE_ADC_CH,
        pins::PUMP_2_SENSE_ADC_CH,
        pins::AIR_PUMP_SENSE_ADC_CH,
    ] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ch, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!("hw_init: ADC1 configured (current sense CH0/CH3/CH6)");
    Ok(())
}

/// Raw 12-bit read.  A failed conversion reads as [`ADC_READ_FAILED`].
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return ADC_READ_FAILED;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> u16 {
    use core::sync::atomic::Ordering;

    let ch = channel as usize % sim::ADC_CHANNELS;
    if sim::ADC_FAULTS.load(Ordering::Relaxed) & (1 << ch) != 0 {
        return ADC_READ_FAILED;
    }
    sim::ADC[ch].load(Ordering::Relaxed)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::PUMP_1_GPIO,
        pins::PUMP_2_GPIO,
        pins::AIR_PUMP_GPIO,
        pins::LEVEL_TRIG_GPIO,
    ];
    // Relays start de-energised.
    let idle_level = u32::from(pins::RELAY_ACTIVE_LOW);

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
        let level = if pin == pins::LEVEL_TRIG_GPIO { 0 } else { idle_level };
        unsafe { gpio_set_level(pin, level) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

/// Drive an output pin.  Returns the raw ESP-IDF error code on failure.
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was configured in init_gpio_outputs(). Main-loop only.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    let bit = 1u64 << (pin as u64 % 64);
    if high {
        sim::GPIO_LEVELS.fetch_or(bit, core::sync::atomic::Ordering::Relaxed);
    } else {
        sim::GPIO_LEVELS.fetch_and(!bit, core::sync::atomic::Ordering::Relaxed);
    }
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::LEVEL_ECHO_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    info!("hw_init: echo input configured");
    Ok(())
}

// ── Ultrasonic echo ───────────────────────────────────────────

/// Fire a 10 µs trigger pulse and time the echo.
///
/// Busy-waits for at most `2 * timeout_us`; `None` on timeout.  Only call
/// this from the coarse water-level cadence.
#[cfg(target_os = "espidf")]
pub fn echo_pulse_us(timeout_us: u64) -> Option<u64> {
    // SAFETY: trig/echo were configured in init_peripherals(); these are
    // register accesses and ROM busy-waits on the main task.
    unsafe {
        gpio_set_level(pins::LEVEL_TRIG_GPIO, 0);
        esp_rom_delay_us(2);
        gpio_set_level(pins::LEVEL_TRIG_GPIO, 1);
        esp_rom_delay_us(10);
        gpio_set_level(pins::LEVEL_TRIG_GPIO, 0);

        let wait_start = esp_timer_get_time() as u64;
        while gpio_get_level(pins::LEVEL_ECHO_GPIO) == 0 {
            if esp_timer_get_time() as u64 - wait_start > timeout_us {
                return None;
            }
        }
        let rise = esp_timer_get_time() as u64;
        while gpio_get_level(pins::LEVEL_ECHO_GPIO) != 0 {
            if esp_timer_get_time() as u64 - rise > timeout_us {
                return None;
            }
        }
        Some(esp_timer_get_time() as u64 - rise)
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn echo_pulse_us(_timeout_us: u64) -> Option<u64> {
    match sim::ECHO_US.load(core::sync::atomic::Ordering::Relaxed) {
        0 => None,
        us => Some(us),
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU16, AtomicU64};

    pub const ADC_CHANNELS: usize = 10;

    pub static ADC: [AtomicU16; ADC_CHANNELS] = [const { AtomicU16::new(0) }; ADC_CHANNELS];
    /// Bit per channel; set bits fail their conversion.
    pub static ADC_FAULTS: AtomicU16 = AtomicU16::new(0);
    pub static GPIO_LEVELS: AtomicU64 = AtomicU64::new(0);
    /// 0 = no echo.
    pub static ECHO_US: AtomicU64 = AtomicU64::new(0);
}

/// Set the value the simulated ADC returns for `channel`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    sim::ADC[channel as usize % sim::ADC_CHANNELS].store(raw, core::sync::atomic::Ordering::Relaxed);
}

/// Make conversions on `channel` fail (or succeed again).
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_adc(channel: u32, failed: bool) {
    let bit = 1u16 << (channel as usize % sim::ADC_CHANNELS);
    if failed {
        sim::ADC_FAULTS.fetch_or(bit, core::sync::atomic::Ordering::Relaxed);
    } else {
        sim::ADC_FAULTS.fetch_and(!bit, core::sync::atomic::Ordering::Relaxed);
    }
}

/// Current simulated level of an output pin.
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    sim::GPIO_LEVELS.load(core::sync::atomic::Ordering::Relaxed) & (1u64 << (pin as u64 % 64)) != 0
}

/// Set the simulated echo width; `None` simulates a timeout.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_echo_us(us: Option<u64>) {
    sim::ECHO_US.store(us.unwrap_or(0), core::sync::atomic::Ordering::Relaxed);
}
