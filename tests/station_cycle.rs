use std::time::Duration;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use embedded_hal::delay::DelayNs;

use epd_weather_station::bitmap::Bitmap;
use epd_weather_station::config::StationConfig;
use epd_weather_station::framebuffer::FramebufferSurface;
use epd_weather_station::layout::{Layout, PANEL_HEIGHT, PANEL_WIDTH};
use epd_weather_station::simulator::{FixtureHttpClient, SimulatedNetwork};
use epd_weather_station::station::{Clock, ProcessState, Station, StationParts};
use epd_weather_station::surface::{DisplaySurface, Rotation};
use epd_weather_station::weather::WeatherRecord;
use epd_weather_station::weather_icons::{weather_bitmap, IconSize, THERMOMETER, UMBRELLA};

const FORECAST: &str = include_str!("../fixtures/forecast.json");

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _: u32) {}
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Fill(BinaryColor),
    Line(Point, Point),
    Bitmap(Point, *const u8),
    Cursor(Point),
    Print(String),
}

/// Banded surface: asks for the frame `pages` times and keeps each page's
/// draw calls separately.
struct RecordingSurface {
    pages_per_frame: usize,
    rotation: Option<Rotation>,
    pages: Vec<Vec<Op>>,
    hibernations: usize,
}

impl RecordingSurface {
    fn new(pages_per_frame: usize) -> Self {
        Self {
            pages_per_frame,
            rotation: None,
            pages: Vec::new(),
            hibernations: 0,
        }
    }

    /// Pages of the most recent frame.
    fn last_frame(&self) -> &[Vec<Op>] {
        &self.pages[self.pages.len() - self.pages_per_frame..]
    }
}

impl DisplaySurface for RecordingSurface {
    fn width(&self) -> i32 {
        match self.rotation {
            Some(r) if r.swaps_axes() => PANEL_HEIGHT as i32,
            _ => PANEL_WIDTH as i32,
        }
    }

    fn height(&self) -> i32 {
        match self.rotation {
            Some(r) if r.swaps_axes() => PANEL_WIDTH as i32,
            _ => PANEL_HEIGHT as i32,
        }
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = Some(rotation);
    }

    fn set_full_window(&mut self) {}

    fn first_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn next_page(&mut self) -> bool {
        let done = self.pages.len() % self.pages_per_frame == 0;
        if !done {
            self.pages.push(Vec::new());
        }
        !done
    }

    fn fill_screen(&mut self, color: BinaryColor) {
        self.record(Op::Fill(color));
    }

    fn draw_line(&mut self, from: Point, to: Point, _: BinaryColor) {
        self.record(Op::Line(from, to));
    }

    fn draw_bitmap(&mut self, origin: Point, bitmap: &Bitmap, _: BinaryColor) {
        self.record(Op::Bitmap(origin, bitmap.data.as_ptr()));
    }

    fn set_cursor(&mut self, cursor: Point) {
        self.record(Op::Cursor(cursor));
    }

    fn print(&mut self, text: &str) {
        self.record(Op::Print(text.to_string()));
    }

    fn hibernate(&mut self) {
        self.hibernations += 1;
    }
}

impl RecordingSurface {
    fn record(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }
}

fn config() -> StationConfig {
    StationConfig {
        api_key: "test-key".into(),
        latitude: 52.370216,
        longitude: 4.895168,
        refresh_interval: Duration::from_secs(900),
        ..StationConfig::default()
    }
}

fn station<S: DisplaySurface>(
    surface: S,
    body: &str,
) -> Station<SimulatedNetwork, FixtureHttpClient, S, NoDelay, FixedClock> {
    Station::new(
        &config(),
        StationParts {
            network: SimulatedNetwork::new(3),
            http: FixtureHttpClient::new(200, body),
            surface,
            delay: NoDelay,
            clock: FixedClock(42),
        },
        ProcessState::resume(0),
    )
}

fn ptr(name: &str, size: IconSize) -> *const u8 {
    weather_bitmap(name, size).data.as_ptr()
}

#[test]
fn rain_forecast_draws_expected_frame() {
    let mut station = station(RecordingSurface::new(1), FORECAST);
    let sleep_for = station.run_once().unwrap();

    assert_eq!(sleep_for, Duration::from_secs(900));
    assert_eq!(station.refresh_interval(), sleep_for);
    assert_eq!(station.network().ssid(), Some(config().wifi.ssid.as_str()));
    assert_eq!(station.http().requests().len(), 1);
    assert_eq!(
        station.http().requests()[0],
        "https://api.pirateweather.net/forecast/test-key/52.370216,4.895168?units=si&exclude=minutely,daily"
    );

    let surface = station.surface();
    assert_eq!(surface.rotation, Some(Rotation::Deg90));
    assert_eq!(surface.hibernations, 1);

    let layout = Layout::compute(296, 128);
    let frame = &surface.last_frame()[0];
    let expected = vec![
        Op::Fill(BinaryColor::Off),
        Op::Bitmap(layout.large_icon, ptr("rain", IconSize::Large)),
        Op::Bitmap(layout.thermometer_icon, THERMOMETER.data.as_ptr()),
        Op::Cursor(layout.temperature_cursor),
        Op::Print("12.3C".into()),
        Op::Bitmap(layout.umbrella_icon, UMBRELLA.data.as_ptr()),
        Op::Cursor(layout.precipitation_cursor),
        Op::Print("50%".into()),
        Op::Line(layout.divider.0, layout.divider.1),
        Op::Bitmap(layout.rows[0].icon, ptr("cloudy", IconSize::Small)),
        Op::Cursor(layout.rows[0].label_cursor),
        Op::Print("+3h".into()),
        Op::Cursor(layout.rows[0].temperature_cursor),
        Op::Print("12C".into()),
        Op::Line(Point::new(202, 40), Point::new(296, 40)),
        Op::Bitmap(layout.rows[1].icon, ptr("rain", IconSize::Small)),
        Op::Cursor(layout.rows[1].label_cursor),
        Op::Print("+6h".into()),
        Op::Cursor(layout.rows[1].temperature_cursor),
        Op::Print("9C".into()),
        Op::Line(Point::new(202, 80), Point::new(296, 80)),
        Op::Bitmap(layout.rows[2].icon, ptr("clear-night", IconSize::Small)),
        Op::Cursor(layout.rows[2].label_cursor),
        Op::Print("+9h".into()),
        Op::Cursor(layout.rows[2].temperature_cursor),
        Op::Print("8C".into()),
    ];
    assert_eq!(frame, &expected);
}

#[test]
fn every_band_gets_the_full_sequence() {
    let mut station = station(RecordingSurface::new(4), FORECAST);
    station.boot().unwrap();
    station.refresh();

    let surface = station.surface();
    // Clear frame plus weather frame.
    assert_eq!(surface.pages.len(), 8);
    let frame = surface.last_frame();
    assert!(frame.iter().all(|page| *page == frame[0]));
    assert!(surface.pages[..4]
        .iter()
        .all(|page| *page == vec![Op::Fill(BinaryColor::Off)]));
    assert_eq!(surface.hibernations, 1);
}

#[test]
fn unreachable_api_still_draws_defaults() {
    let mut station = Station::new(
        &config(),
        StationParts {
            network: SimulatedNetwork::new(0),
            http: FixtureHttpClient::new(500, FORECAST),
            surface: RecordingSurface::new(1),
            delay: NoDelay,
            clock: FixedClock(0),
        },
        ProcessState::resume(9),
    );
    station.run_once().unwrap();

    let frame = &station.surface().last_frame()[0];
    let printed: Vec<&str> = frame
        .iter()
        .filter_map(|op| match op {
            Op::Print(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(printed, ["0.0C", "0%", "+3h", "0C", "+6h", "0C", "+9h", "0C"]);
    assert!(frame.contains(&Op::Bitmap(
        Layout::compute(296, 128).large_icon,
        ptr("", IconSize::Large)
    )));
    assert_eq!(station.state().boot_count, 10);
}

#[test]
fn framebuffer_frame_contains_the_glyphs() {
    let mut station = station(FramebufferSurface::new(PANEL_WIDTH, PANEL_HEIGHT), FORECAST);
    let record: WeatherRecord = {
        station.boot().unwrap();
        station.refresh()
    };
    assert_eq!(record.current.icon.as_str(), "rain");

    let surface = station.surface();
    assert!(surface.is_hibernated());
    assert_eq!(surface.frames_committed(), 2);

    let fb = surface.framebuffer();
    assert_eq!(fb.size(), Size::new(296, 128));

    let layout = Layout::compute(296, 128);
    let rain = weather_bitmap("rain", IconSize::Large);
    for y in 0..rain.height {
        for x in 0..rain.width {
            let at = layout.large_icon + Point::new(x as i32, y as i32);
            if rain.is_set(x, y) && at.y >= 0 {
                assert!(fb.pixel(at).is_on(), "rain glyph pixel {:?} not drawn", at);
            }
        }
    }

    // Vertical divider.
    for y in 0..128 {
        assert!(fb.pixel(Point::new(197, y)).is_on());
    }

    let pbm = fb.to_pbm();
    assert!(pbm.starts_with(b"P4\n296 128\n"));
    assert_eq!(pbm.len(), b"P4\n296 128\n".len() + 37 * 128);
}
