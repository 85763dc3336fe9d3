//! ESP32 time adapter.
//!
//! Implements [`ClockPort`] for the controller.
//!
//! - **`target_os = "espidf"`**: wall clock from `gettimeofday()` (kept
//!   in sync by SNTP outside this crate), uptime from the ESP-IDF
//!   high-resolution timer.
//! - **`not(target_os = "espidf")`**: `std::time::SystemTime` and
//!   `std::time::Instant` for host-side runs and simulation.
//!
//! Local time is derived from epoch seconds plus a fixed UTC offset; no
//! timezone database, no DST.

use crate::app::ports::{ClockPort, ClockReading};

const SECS_PER_DAY: i64 = 86_400;

/// Seconds since local midnight for `epoch_secs` shifted by `utc_offset_secs`.
pub fn seconds_of_day(epoch_secs: u64, utc_offset_secs: i32) -> u32 {
    let local = epoch_secs as i64 + i64::from(utc_offset_secs);
    local.rem_euclid(SECS_PER_DAY) as u32
}

/// `(hour, minute, second)` of local time.
pub fn local_hms(epoch_secs: u64, utc_offset_secs: i32) -> (u8, u8, u8) {
    let s = seconds_of_day(epoch_secs, utc_offset_secs);
    ((s / 3600) as u8, (s / 60 % 60) as u8, (s % 60) as u8)
}

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    utc_offset_secs: i32,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Esp32TimeAdapter {
    pub fn new(utc_offset_secs: i32) -> Self {
        Self {
            utc_offset_secs,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    fn local(&self) -> (u8, u8, u8) {
        local_hms(self.epoch_secs(), self.utc_offset_secs)
    }
}

impl ClockPort for Esp32TimeAdapter {
    fn current_hour(&self) -> u8 {
        self.local().0
    }

    fn current_minute(&self) -> u8 {
        self.local().1
    }

    fn current_second(&self) -> u8 {
        self.local().2
    }

    /// Wall-clock seconds.  Reads 0-based boot time until SNTP has set
    /// the clock; the schedule runs on that until then.
    #[cfg(target_os = "espidf")]
    fn epoch_secs(&self) -> u64 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: gettimeofday writes into the provided timeval only.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec.max(0) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    fn epoch_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// One clock read for every field.
    fn now(&self) -> ClockReading {
        let epoch_secs = self.epoch_secs();
        let (hour, minute, second) = local_hms(epoch_secs, self.utc_offset_secs);
        ClockReading {
            hour,
            minute,
            second,
            epoch_secs,
            uptime_ms: self.uptime_ms(),
        }
    }
}
