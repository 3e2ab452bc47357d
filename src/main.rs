#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    host::run()
}

// ── Firmware (ESP32 + Waveshare 2.9") ───────────────────────────────

#[cfg(target_os = "espidf")]
mod firmware {
    use std::time::Duration;

    use anyhow::Result;
    use esp_idf_hal::delay::Delay;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs};
    use log::info;

    use epd_weather_station::config::{self, StationConfig};
    use epd_weather_station::epd::EpdSurface;
    use epd_weather_station::http_client::EspHttpClient;
    use epd_weather_station::power;
    use epd_weather_station::station::{MonotonicClock, ProcessState, Station, StationParts};
    use epd_weather_station::wifi::EspNetwork;

    /// Lets a serial monitor attach before the first log line.
    const SERIAL_SETTLE: Duration = Duration::from_millis(3_000);

    type FirmwareStation = Station<EspNetwork, EspHttpClient, EpdSurface, Delay, MonotonicClock>;

    pub fn run() -> Result<()> {
        esp_idf_sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        std::thread::sleep(SERIAL_SETTLE);

        info!("BOOT epd-weather-station v{}", env!("CARGO_PKG_VERSION"));

        // ── 1. Peripherals ──
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs_partition = EspDefaultNvsPartition::take()?;

        // ── 2. NVS config ──
        let nvs = EspNvs::new(nvs_partition.clone(), config::NS, true)?;
        let cfg = StationConfig::load(&nvs);

        // ── 3. Drivers ──
        let network = EspNetwork::new(peripherals.modem, sysloop, Some(nvs_partition))?;
        let http = EspHttpClient::new()?;
        let surface = EpdSurface::new(peripherals.spi2, &cfg.pins)?;

        let mut station = Station::new(
            &cfg,
            StationParts {
                network,
                http,
                surface,
                delay: Delay::new_default(),
                clock: MonotonicClock::new(),
            },
            ProcessState::resume(power::persisted_boot_count()),
        );

        run_station(&mut station)
    }

    #[cfg(feature = "polling")]
    fn run_station(station: &mut FirmwareStation) -> Result<()> {
        info!("Polling mode: staying awake between refreshes");
        station.run_polling()
    }

    #[cfg(not(feature = "polling"))]
    fn run_station(station: &mut FirmwareStation) -> Result<()> {
        let sleep_for = station.run_once()?;
        power::persist_boot_count(station.state().boot_count);
        power::enter_deep_sleep(sleep_for)
    }
}

// ── Host simulator ──────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use log::info;

    use epd_weather_station::config::StationConfig;
    use epd_weather_station::framebuffer::FramebufferSurface;
    use epd_weather_station::layout::{PANEL_HEIGHT, PANEL_WIDTH};
    use epd_weather_station::simulator::{FixtureHttpClient, SimulatedNetwork, StdDelay};
    use epd_weather_station::station::{MonotonicClock, ProcessState, Station, StationParts};

    /// Run one boot + refresh cycle against a saved forecast response and
    /// write the resulting frame as a PBM image.
    #[derive(Parser, Debug)]
    #[command(name = "epd-weather-station", version, about)]
    struct Args {
        /// Pirate Weather response body to serve.
        #[arg(long)]
        fixture: PathBuf,

        /// Where to write the rendered frame (binary PBM).
        #[arg(long, default_value = "frame.pbm")]
        output: PathBuf,

        /// HTTP status to answer with.
        #[arg(long, default_value_t = 200)]
        status: u16,

        /// Boot counter carried over from the previous cycle.
        #[arg(long, default_value_t = 0)]
        boot_count: u32,

        /// Association checks before the simulated link comes up.
        #[arg(long, default_value_t = 1)]
        association_polls: u32,

        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<f64>,

        #[arg(long)]
        api_key: Option<String>,

        /// Print the parsed weather record as JSON.
        #[arg(long)]
        print_record: bool,
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();

        let mut cfg = StationConfig::default();
        if let Some(latitude) = args.latitude {
            cfg.latitude = latitude;
        }
        if let Some(longitude) = args.longitude {
            cfg.longitude = longitude;
        }
        if let Some(api_key) = args.api_key {
            cfg.api_key = api_key;
        }

        let http = FixtureHttpClient::from_file(&args.fixture, args.status)?;
        let mut station = Station::new(
            &cfg,
            StationParts {
                network: SimulatedNetwork::new(args.association_polls),
                http,
                surface: FramebufferSurface::new(PANEL_WIDTH, PANEL_HEIGHT),
                delay: StdDelay,
                clock: MonotonicClock::new(),
            },
            ProcessState::resume(args.boot_count),
        );

        info!(
            "Simulating station, refresh every {} s",
            station.refresh_interval().as_secs()
        );
        station.boot()?;
        if let Some(ssid) = station.network().ssid() {
            info!("Simulated link joined {:?}", ssid);
        }
        let record = station.refresh();

        if args.print_record {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        let framebuffer = station.surface().framebuffer();
        std::fs::write(&args.output, framebuffer.to_pbm())
            .with_context(|| format!("writing {}", args.output.display()))?;
        info!(
            "Frame written to {} (boot {}, {} ink pixels)",
            args.output.display(),
            station.state().boot_count,
            framebuffer.ink_count()
        );
        Ok(())
    }
}
