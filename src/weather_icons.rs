use log::debug;

use crate::bitmap::Bitmap;

/// Glyphs keyed by Pirate Weather `icon` identifiers. `Refresh` stands in for
/// anything the catalog does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeatherIcon {
    ClearDay,
    ClearNight,
    Rain,
    Snow,
    Sleet,
    Wind,
    Fog,
    Cloudy,
    PartlyCloudyDay,
    PartlyCloudyNight,
    #[default]
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconSize {
    /// 35x35, forecast rows and the thermometer/umbrella pairs.
    Small,
    /// 100x100, current conditions.
    Large,
}

impl IconSize {
    pub const fn pixels(self) -> u32 {
        match self {
            Self::Small => SMALL,
            Self::Large => LARGE,
        }
    }
}

const SMALL: u32 = 35;
const LARGE: u32 = 100;

/// Ordered identifier table, scanned linearly.
pub const CATALOG: [(&str, WeatherIcon); 10] = [
    ("clear-day", WeatherIcon::ClearDay),
    ("clear-night", WeatherIcon::ClearNight),
    ("rain", WeatherIcon::Rain),
    ("snow", WeatherIcon::Snow),
    ("sleet", WeatherIcon::Sleet),
    ("wind", WeatherIcon::Wind),
    ("fog", WeatherIcon::Fog),
    ("cloudy", WeatherIcon::Cloudy),
    ("partly-cloudy-day", WeatherIcon::PartlyCloudyDay),
    ("partly-cloudy-night", WeatherIcon::PartlyCloudyNight),
];

// ── 100x100 glyphs (current conditions) ─────────────────────────────

static CLEAR_DAY_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/clear_day_100.bin"));
static CLEAR_NIGHT_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/clear_night_100.bin"));
static RAIN_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/rain_100.bin"));
static SNOW_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/snow_100.bin"));
static SLEET_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/sleet_100.bin"));
static WIND_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/wind_100.bin"));
static FOG_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/fog_100.bin"));
static CLOUDY_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/cloudy_100.bin"));
static PARTLY_CLOUDY_DAY_100: Bitmap =
    Bitmap::new(LARGE, LARGE, include_bytes!("icons/partly_cloudy_day_100.bin"));
static PARTLY_CLOUDY_NIGHT_100: Bitmap =
    Bitmap::new(LARGE, LARGE, include_bytes!("icons/partly_cloudy_night_100.bin"));
static REFRESH_100: Bitmap = Bitmap::new(LARGE, LARGE, include_bytes!("icons/refresh_100.bin"));

// ── 35x35 glyphs (forecast rows) ────────────────────────────────────

static CLEAR_DAY_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/clear_day_35.bin"));
static CLEAR_NIGHT_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/clear_night_35.bin"));
static RAIN_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/rain_35.bin"));
static SNOW_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/snow_35.bin"));
static SLEET_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/sleet_35.bin"));
static WIND_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/wind_35.bin"));
static FOG_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/fog_35.bin"));
static CLOUDY_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/cloudy_35.bin"));
static PARTLY_CLOUDY_DAY_35: Bitmap =
    Bitmap::new(SMALL, SMALL, include_bytes!("icons/partly_cloudy_day_35.bin"));
static PARTLY_CLOUDY_NIGHT_35: Bitmap =
    Bitmap::new(SMALL, SMALL, include_bytes!("icons/partly_cloudy_night_35.bin"));
static REFRESH_35: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/refresh_35.bin"));

// ── Fixed glyphs ────────────────────────────────────────────────────

pub static THERMOMETER: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/thermometer_35.bin"));
pub static UMBRELLA: Bitmap = Bitmap::new(SMALL, SMALL, include_bytes!("icons/umbrella_35.bin"));

impl WeatherIcon {
    /// Case-sensitive catalog lookup; unknown names give `Refresh`.
    pub fn from_name(name: &str) -> Self {
        CATALOG
            .iter()
            .find(|(id, _)| *id == name)
            .map(|&(_, icon)| icon)
            .unwrap_or(Self::Refresh)
    }

    pub fn name(self) -> &'static str {
        CATALOG
            .iter()
            .find(|&&(_, icon)| icon == self)
            .map(|&(id, _)| id)
            .unwrap_or("refresh")
    }

    pub fn bitmap(self, size: IconSize) -> &'static Bitmap {
        match size {
            IconSize::Large => self.bitmap_100(),
            IconSize::Small => self.bitmap_35(),
        }
    }

    fn bitmap_100(self) -> &'static Bitmap {
        match self {
            Self::ClearDay => &CLEAR_DAY_100,
            Self::ClearNight => &CLEAR_NIGHT_100,
            Self::Rain => &RAIN_100,
            Self::Snow => &SNOW_100,
            Self::Sleet => &SLEET_100,
            Self::Wind => &WIND_100,
            Self::Fog => &FOG_100,
            Self::Cloudy => &CLOUDY_100,
            Self::PartlyCloudyDay => &PARTLY_CLOUDY_DAY_100,
            Self::PartlyCloudyNight => &PARTLY_CLOUDY_NIGHT_100,
            Self::Refresh => &REFRESH_100,
        }
    }

    fn bitmap_35(self) -> &'static Bitmap {
        match self {
            Self::ClearDay => &CLEAR_DAY_35,
            Self::ClearNight => &CLEAR_NIGHT_35,
            Self::Rain => &RAIN_35,
            Self::Snow => &SNOW_35,
            Self::Sleet => &SLEET_35,
            Self::Wind => &WIND_35,
            Self::Fog => &FOG_35,
            Self::Cloudy => &CLOUDY_35,
            Self::PartlyCloudyDay => &PARTLY_CLOUDY_DAY_35,
            Self::PartlyCloudyNight => &PARTLY_CLOUDY_NIGHT_35,
            Self::Refresh => &REFRESH_35,
        }
    }
}

/// Bitmap for a provider identifier at the requested size. Total.
pub fn weather_bitmap(name: &str, size: IconSize) -> &'static Bitmap {
    let icon = WeatherIcon::from_name(name);
    if icon == WeatherIcon::Refresh {
        debug!("Unknown icon {:?}, drawing {}", name, icon.name());
    }
    icon.bitmap(size)
}
