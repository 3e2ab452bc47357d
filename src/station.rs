use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use log::info;

use crate::config::{StationConfig, WifiCredentials};
use crate::http_client::HttpClient;
use crate::network::{wait_for_association, Network};
use crate::render::{clear_screen, draw_weather, init_display};
use crate::surface::DisplaySurface;
use crate::weather::{WeatherClient, WeatherRecord};

/// Sleep between `poll` calls in polling mode.
pub const POLL_TICK_MS: u32 = 1_000;

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since construction.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// State that outlives a single refresh. Only `boot_count` survives deep
/// sleep; the caller persists it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessState {
    pub boot_count: u32,
    pub last_refresh_ms: Option<u64>,
}

impl ProcessState {
    pub fn resume(boot_count: u32) -> Self {
        Self {
            boot_count,
            last_refresh_ms: None,
        }
    }
}

/// True when nothing has been drawn yet or `interval_ms` has passed since the
/// last refresh. Tolerates the millisecond counter wrapping.
pub fn refresh_due(now_ms: u64, last_refresh_ms: Option<u64>, interval_ms: u64) -> bool {
    match last_refresh_ms {
        None => true,
        Some(last) => now_ms.wrapping_sub(last) >= interval_ms,
    }
}

pub struct StationParts<N, H, S, D, C> {
    pub network: N,
    pub http: H,
    pub surface: S,
    pub delay: D,
    pub clock: C,
}

/// The boot / fetch / render cycle over injected hardware.
pub struct Station<N, H, S, D, C> {
    network: N,
    http: H,
    surface: S,
    delay: D,
    clock: C,
    weather: WeatherClient,
    credentials: WifiCredentials,
    refresh_interval: Duration,
    state: ProcessState,
}

impl<N, H, S, D, C> Station<N, H, S, D, C>
where
    N: Network,
    H: HttpClient,
    S: DisplaySurface,
    D: DelayNs,
    C: Clock,
{
    pub fn new(config: &StationConfig, parts: StationParts<N, H, S, D, C>, state: ProcessState) -> Self {
        Self {
            network: parts.network,
            http: parts.http,
            surface: parts.surface,
            delay: parts.delay,
            clock: parts.clock,
            weather: WeatherClient::new(config.api_key.clone(), config.latitude, config.longitude),
            credentials: config.wifi.clone(),
            refresh_interval: config.refresh_interval,
            state,
        }
    }

    /// Count the boot, bring up Wi-Fi (blocking until associated) and leave
    /// the display initialized and blank.
    pub fn boot(&mut self) -> anyhow::Result<()> {
        self.state.boot_count = self.state.boot_count.wrapping_add(1);
        info!("Boot number: {}", self.state.boot_count);
        info!(
            "Refreshing every {} seconds",
            self.refresh_interval.as_secs()
        );

        info!("Initializing WiFi...");
        wait_for_association(&mut self.network, &mut self.delay, &self.credentials)?;
        match self.network.ip_address() {
            Some(ip) => info!("IP address: {}", ip),
            None => info!("IP address: unknown"),
        }

        init_display(&mut self.surface);
        clear_screen(&mut self.surface);
        Ok(())
    }

    /// One fetch and one render.
    pub fn refresh(&mut self) -> WeatherRecord {
        let record = self.weather.fetch(&mut self.http);
        draw_weather(&mut self.surface, &record);
        self.state.last_refresh_ms = Some(self.clock.now_ms());
        record
    }

    /// Refresh if the interval has elapsed. Returns whether it did.
    pub fn poll(&mut self) -> bool {
        let interval_ms = self.refresh_interval.as_millis() as u64;
        if !refresh_due(self.clock.now_ms(), self.state.last_refresh_ms, interval_ms) {
            return false;
        }
        self.refresh();
        true
    }

    /// Deep-sleep cycle: boot, draw once, and report how long to sleep.
    pub fn run_once(&mut self) -> anyhow::Result<Duration> {
        self.boot()?;
        self.refresh();
        info!("Going to sleep now");
        Ok(self.refresh_interval)
    }

    /// Polling mode: boot, draw, then refresh on the interval forever.
    pub fn run_polling(&mut self) -> anyhow::Result<()> {
        self.boot()?;
        self.refresh();
        loop {
            self.poll();
            self.delay.delay_ms(POLL_TICK_MS);
        }
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn network(&self) -> &N {
        &self.network
    }
}
