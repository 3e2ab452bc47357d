use core::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::info;

/// Survives deep sleep in RTC slow memory; reset on power loss.
#[link_section = ".rtc.data.boot_count"]
static BOOT_COUNT: AtomicU32 = AtomicU32::new(0);

pub fn persisted_boot_count() -> u32 {
    BOOT_COUNT.load(Ordering::Relaxed)
}

pub fn persist_boot_count(count: u32) {
    BOOT_COUNT.store(count, Ordering::Relaxed);
}

/// Arm the wake-up timer and power down. Only the RTC domain keeps running.
pub fn enter_deep_sleep(duration: Duration) -> ! {
    let micros = duration.as_micros().min(u64::MAX as u128) as u64;
    info!("Setup ESP32 to sleep for every {} Seconds", duration.as_secs());
    unsafe {
        esp_idf_sys::esp_sleep_enable_timer_wakeup(micros);
        esp_idf_sys::esp_deep_sleep_start()
    }
}
