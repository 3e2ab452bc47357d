use std::time::Duration;

use log::warn;

pub const NS: &str = "station";

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const KEY_WIFI_SSID: &str = "wifi_ssid";
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const KEY_WIFI_PASS: &str = "wifi_pass";
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const KEY_WX_API_KEY: &str = "wx_api_key";
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const KEY_LATITUDE: &str = "latitude";
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const KEY_LONGITUDE: &str = "longitude";

// Compiled defaults; `build.rs` fills the LOCAL_* variables from an optional
// `secrets.local.rs`.
const DEFAULT_WIFI_SSID: &str = match option_env!("LOCAL_WIFI_SSID") {
    Some(v) => v,
    None => "YOUR_WIFI_SSID",
};
const DEFAULT_WIFI_PASS: &str = match option_env!("LOCAL_WIFI_PASS") {
    Some(v) => v,
    None => "",
};
const DEFAULT_WX_API_KEY: &str = match option_env!("LOCAL_PIRATE_WEATHER_API_KEY") {
    Some(v) => v,
    None => "YOUR_API_KEY_HERE",
};
const DEFAULT_LATITUDE: &str = match option_env!("LOCAL_LATITUDE") {
    Some(v) => v,
    None => "52.370216",
};
const DEFAULT_LONGITUDE: &str = match option_env!("LOCAL_LONGITUDE") {
    Some(v) => v,
    None => "4.895168",
};

/// Time between refreshes: the deep-sleep duration, or the polling period.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

/// GPIO numbers of the e-paper panel (SPI bus plus control lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPins {
    pub sclk: i32,
    pub mosi: i32,
    pub cs: i32,
    pub dc: i32,
    pub rst: i32,
    pub busy: i32,
}

impl Default for DisplayPins {
    fn default() -> Self {
        Self {
            sclk: 18,
            mosi: 23,
            cs: 5,
            dc: 17,
            rst: 16,
            busy: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub wifi: WifiCredentials,
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub refresh_interval: Duration,
    pub pins: DisplayPins,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            wifi: WifiCredentials {
                ssid: DEFAULT_WIFI_SSID.to_string(),
                password: DEFAULT_WIFI_PASS.to_string(),
            },
            api_key: DEFAULT_WX_API_KEY.to_string(),
            latitude: default_coordinate("latitude", DEFAULT_LATITUDE),
            longitude: default_coordinate("longitude", DEFAULT_LONGITUDE),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            pins: DisplayPins::default(),
        }
    }
}

fn default_coordinate(name: &str, raw: &str) -> f64 {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!("Compiled {} {:?} is not a number, using 0.0", name, raw);
        0.0
    })
}

/// Parse a decimal coordinate, keeping `fallback` for anything that is not a
/// finite number.
pub fn parse_coordinate(raw: &str, fallback: f64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            warn!("Invalid coordinate {:?}, keeping {}", raw, fallback);
            fallback
        }
    }
}

/// An empty stored string counts as unset so the compiled default stays.
pub fn stored_value(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !value.is_empty()).map(str::to_owned)
}

#[cfg(target_os = "espidf")]
mod nvs {
    use esp_idf_svc::nvs::{EspNvs, NvsDefault};
    use log::info;

    use super::*;

    /// None when the key is absent, empty or unreadable.
    fn nvs_get_str(nvs: &EspNvs<NvsDefault>, key: &str) -> Option<String> {
        let mut buf = vec![0u8; nvs.str_len(key).ok().flatten()?];
        stored_value(nvs.get_str(key, &mut buf).ok().flatten())
    }

    impl StationConfig {
        /// Compiled defaults overridden by whatever the `station` namespace holds.
        pub fn load(nvs: &EspNvs<NvsDefault>) -> StationConfig {
            let mut config = StationConfig::default();

            if let Some(ssid) = nvs_get_str(nvs, KEY_WIFI_SSID) {
                config.wifi.ssid = ssid;
            }
            info!("NVS wifi_ssid = {:?}", config.wifi.ssid);

            if let Some(pass) = nvs_get_str(nvs, KEY_WIFI_PASS) {
                config.wifi.password = pass;
            }
            info!("NVS wifi_pass = <{} chars>", config.wifi.password.len());

            if let Some(key) = nvs_get_str(nvs, KEY_WX_API_KEY) {
                config.api_key = key;
            }
            info!("NVS wx_api_key = <{} chars>", config.api_key.len());

            if let Some(raw) = nvs_get_str(nvs, KEY_LATITUDE) {
                config.latitude = parse_coordinate(&raw, config.latitude);
            }
            if let Some(raw) = nvs_get_str(nvs, KEY_LONGITUDE) {
                config.longitude = parse_coordinate(&raw, config.longitude);
            }
            info!("NVS location = {:.6},{:.6}", config.latitude, config.longitude);

            config
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_with_whitespace() {
        assert_eq!(parse_coordinate(" 52.370216 ", 0.0), 52.370216);
        assert_eq!(parse_coordinate("-4.5", 0.0), -4.5);
    }

    #[test]
    fn invalid_coordinates_keep_fallback() {
        assert_eq!(parse_coordinate("north", 1.5), 1.5);
        assert_eq!(parse_coordinate("", 1.5), 1.5);
        assert_eq!(parse_coordinate("NaN", 1.5), 1.5);
        assert_eq!(parse_coordinate("inf", 1.5), 1.5);
    }

    #[test]
    fn empty_stored_strings_are_unset() {
        assert_eq!(stored_value(None), None);
        assert_eq!(stored_value(Some("")), None);
        assert_eq!(stored_value(Some("home-ap")), Some("home-ap".to_string()));
    }

    #[test]
    fn defaults_match_wiring_and_interval() {
        let config = StationConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(900));
        assert_eq!(
            config.pins,
            DisplayPins {
                sclk: 18,
                mosi: 23,
                cs: 5,
                dc: 17,
                rst: 16,
                busy: 4,
            }
        );
        assert!(config.latitude.is_finite());
        assert!(config.longitude.is_finite());
        assert!(!config.api_key.is_empty());
    }
}
