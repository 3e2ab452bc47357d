use core::fmt::Write as _;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::http_client::{HttpClient, HttpError};
use crate::parse::{self, ParseReport};

/// Longest icon identifier kept from the provider (a 20-byte C buffer minus NUL).
pub const ICON_NAME_LEN: usize = 19;
/// Forecast rows shown on the display: +3h, +6h and +9h.
pub const HOURLY_READINGS: usize = 3;
/// Size of the URL buffer, terminator included.
pub const URL_BUFFER_SIZE: usize = 256;

const FORECAST_URL_BASE: &str = "https://api.pirateweather.net/forecast";

pub type IconName = heapless::String<ICON_NAME_LEN>;
pub type ForecastUrl = heapless::String<{ URL_BUFFER_SIZE - 1 }>;

// ── Data types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub icon: IconName,
    pub temperature: f32,
    pub precip_probability: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyReading {
    pub time: i64,
    pub icon: IconName,
    pub temperature: f32,
}

/// One fetch cycle worth of weather. Every field is always populated; whatever
/// could not be parsed is left at zero / empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub current: CurrentConditions,
    pub hourly: [HourlyReading; HOURLY_READINGS],
}

/// Copy a provider icon identifier into a fixed buffer, cutting it at the last
/// char boundary that fits.
pub fn icon_name(raw: &str) -> IconName {
    let mut end = raw.len().min(ICON_NAME_LEN);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    let mut name = IconName::new();
    // Cannot fail: `end` never exceeds the capacity.
    let _ = name.push_str(&raw[..end]);
    name
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("URL buffer size is insufficient ({} bytes)", URL_BUFFER_SIZE)]
pub struct UrlTooLong;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    UrlTooLong(#[from] UrlTooLong),
    #[error("HTTP request failed: {0}")]
    Transport(HttpError),
    #[error("HTTP client failed with HTTP code: {0}")]
    Status(u16),
    #[error("response body exceeds {0} bytes")]
    BodyTooLarge(usize),
    #[error("failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<HttpError> for FetchError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::BodyTooLarge(limit) => FetchError::BodyTooLarge(limit),
            other => FetchError::Transport(other),
        }
    }
}

// ── URL ─────────────────────────────────────────────────────────────

/// Format the Pirate Weather forecast URL. Fails instead of truncating when the
/// result would not fit the fixed buffer.
pub fn build_url(api_key: &str, latitude: f64, longitude: f64) -> Result<ForecastUrl, UrlTooLong> {
    let mut url = ForecastUrl::new();
    write!(
        url,
        "{}/{}/{:.6},{:.6}?units=si&exclude=minutely,daily",
        FORECAST_URL_BASE, api_key, latitude, longitude
    )
    .map_err(|_| UrlTooLong)?;
    Ok(url)
}

// ── Client ──────────────────────────────────────────────────────────

pub struct WeatherClient {
    api_key: String,
    latitude: f64,
    longitude: f64,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            api_key: api_key.into(),
            latitude,
            longitude,
        }
    }

    pub fn url(&self) -> Result<ForecastUrl, UrlTooLong> {
        build_url(&self.api_key, self.latitude, self.longitude)
    }

    /// Fetch and parse one forecast. Never fails: any error is logged and the
    /// all-default record is returned instead.
    pub fn fetch<C: HttpClient + ?Sized>(&self, http: &mut C) -> WeatherRecord {
        match self.try_fetch(http) {
            Ok((record, report)) => {
                if !report.fully_parsed() {
                    info!("Weather parsed with defaults: {:?}", report);
                }
                record
            }
            Err(FetchError::Json(e)) => {
                warn!("Failed to parse JSON response: {}", e);
                // TODO: retry the request once on a JSON parse failure before
                // falling back to an empty record.
                WeatherRecord::default()
            }
            Err(e) => {
                warn!("{}", e);
                WeatherRecord::default()
            }
        }
    }

    /// Same pipeline as [`fetch`](Self::fetch) with the failure kind kept.
    /// Performs at most one request.
    pub fn try_fetch<C: HttpClient + ?Sized>(
        &self,
        http: &mut C,
    ) -> Result<(WeatherRecord, ParseReport), FetchError> {
        let url = self.url()?;

        info!("Sending HTTP request");
        let response = http.get(&url)?;
        if response.status != 200 {
            return Err(FetchError::Status(response.status));
        }

        let (record, report) = parse::parse_forecast(&response.body)?;
        info!(
            "Weather: {} {:.1}C precip {:.0}% (+3h {} +6h {} +9h {})",
            record.current.icon,
            record.current.temperature,
            record.current.precip_probability * 100.0,
            record.hourly[0].icon,
            record.hourly[1].icon,
            record.hourly[2].icon,
        );
        Ok((record, report))
    }
}
