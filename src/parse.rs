//! Field-by-field extraction of a Pirate Weather forecast document.
//!
//! Nothing here fails as a whole once the body is valid JSON: each field is
//! read with [`parse_or_default`] and falls back on its own, and the
//! [`ParseReport`] records which ones did.

use log::{info, warn};
use serde_json::{Map, Value};

use crate::weather::{
    icon_name, CurrentConditions, HourlyReading, IconName, WeatherRecord, HOURLY_READINGS,
};

/// First `hourly.data` index shown (index 0 is the current hour).
pub const HOURLY_START_INDEX: usize = 3;
/// Distance between shown `hourly.data` indices.
pub const HOURLY_STRIDE: usize = 3;

const CURRENTLY: &str = "currently";
const HOURLY: &str = "hourly";
const DATA: &str = "data";
const TEMPERATURE: &str = "temperature";
const PRECIP_PROBABILITY: &str = "precipProbability";
const ICON: &str = "icon";
const TIME: &str = "time";

/// A field value plus whether it came from the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<T> {
    pub value: T,
    pub parsed: bool,
}

/// JSON types a field may be read as.
pub trait FromJson: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

/// Any JSON number, integer or not.
impl FromJson for f32 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

/// Integers only; `1.5` is a type mismatch.
impl FromJson for i64 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromJson for IconName {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(icon_name)
    }
}

/// Read `key` from `object` as `T`, or return `default` when the object, the
/// key or the expected type is missing.
pub fn parse_or_default<T: FromJson>(
    object: Option<&Map<String, Value>>,
    key: &str,
    default: T,
) -> Field<T> {
    match object.and_then(|o| o.get(key)).and_then(T::from_json) {
        Some(value) => Field {
            value,
            parsed: true,
        },
        None => Field {
            value: default,
            parsed: false,
        },
    }
}

// ── Reports ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentReport {
    /// `currently` was present and an object.
    pub present: bool,
    pub temperature: bool,
    pub precip_probability: bool,
    pub icon: bool,
}

impl CurrentReport {
    pub fn fully_parsed(&self) -> bool {
        self.present && self.temperature && self.precip_probability && self.icon
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotReport {
    /// The source index was in range and held an object.
    pub present: bool,
    pub time: bool,
    pub temperature: bool,
    pub icon: bool,
}

impl SlotReport {
    pub fn fully_parsed(&self) -> bool {
        self.present && self.time && self.temperature && self.icon
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourlyReport {
    /// `hourly.data` was present and an array.
    pub present: bool,
    pub slots: [SlotReport; HOURLY_READINGS],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub current: CurrentReport,
    pub hourly: HourlyReport,
}

impl ParseReport {
    pub fn fully_parsed(&self) -> bool {
        self.current.fully_parsed()
            && self.hourly.present
            && self.hourly.slots.iter().all(SlotReport::fully_parsed)
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

/// `hourly.data` index read for display slot `slot`.
pub const fn hourly_source_index(slot: usize) -> usize {
    HOURLY_START_INDEX + slot * HOURLY_STRIDE
}

/// Parse a response body. Only a body that is not a JSON object fails; every
/// missing or mistyped field is defaulted individually.
pub fn parse_forecast(body: &[u8]) -> Result<(WeatherRecord, ParseReport), serde_json::Error> {
    let root: Map<String, Value> = serde_json::from_slice(body)?;

    let (current, current_report) = parse_current(root.get(CURRENTLY));
    if !current_report.present {
        warn!("Failed to parse 'currently' weather data, using defaults");
    }

    let (hourly, hourly_report) = parse_hourly(root.get(HOURLY));
    if !hourly_report.present {
        warn!("Failed to parse 'hourly' weather data, using defaults");
    }

    Ok((
        WeatherRecord { current, hourly },
        ParseReport {
            current: current_report,
            hourly: hourly_report,
        },
    ))
}

pub fn parse_current(currently: Option<&Value>) -> (CurrentConditions, CurrentReport) {
    let object = currently.and_then(Value::as_object);

    let temperature = parse_or_default(object, TEMPERATURE, 0.0f32);
    let precip_probability = parse_or_default(object, PRECIP_PROBABILITY, 0.0f32);
    let icon = parse_or_default(object, ICON, IconName::new());

    (
        CurrentConditions {
            icon: icon.value,
            temperature: temperature.value,
            precip_probability: precip_probability.value,
        },
        CurrentReport {
            present: object.is_some(),
            temperature: temperature.parsed,
            precip_probability: precip_probability.parsed,
            icon: icon.parsed,
        },
    )
}

pub fn parse_hourly(hourly: Option<&Value>) -> ([HourlyReading; HOURLY_READINGS], HourlyReport) {
    let mut readings: [HourlyReading; HOURLY_READINGS] = Default::default();
    let mut report = HourlyReport::default();

    let Some(data) = hourly
        .and_then(Value::as_object)
        .and_then(|h| h.get(DATA))
        .and_then(Value::as_array)
    else {
        return (readings, report);
    };
    report.present = true;

    for (slot, (reading, slot_report)) in readings
        .iter_mut()
        .zip(report.slots.iter_mut())
        .enumerate()
    {
        info!("Parsing hourly weather data for +{}h", (slot + 1) * 3);
        let Some(entry) = data.get(hourly_source_index(slot)).and_then(Value::as_object) else {
            continue;
        };
        (*reading, *slot_report) = parse_hourly_entry(entry);
    }

    (readings, report)
}

fn parse_hourly_entry(entry: &Map<String, Value>) -> (HourlyReading, SlotReport) {
    let time = parse_or_default(Some(entry), TIME, 0i64);
    let temperature = parse_or_default(Some(entry), TEMPERATURE, 0.0f32);
    let icon = parse_or_default(Some(entry), ICON, IconName::new());

    (
        HourlyReading {
            time: time.value,
            icon: icon.value,
            temperature: temperature.value,
        },
        SlotReport {
            present: true,
            time: time.parsed,
            temperature: temperature.parsed,
            icon: icon.parsed,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> (WeatherRecord, ParseReport) {
        parse_forecast(value.to_string().as_bytes()).unwrap()
    }

    fn hour(time: i64, temperature: f32, icon: &str) -> Value {
        json!({"time": time, "temperature": temperature, "icon": icon})
    }

    fn zeroed() -> HourlyReading {
        HourlyReading {
            time: 0,
            icon: IconName::new(),
            temperature: 0.0,
        }
    }

    #[test]
    fn source_indices_are_three_six_nine() {
        let indices: Vec<usize> = (0..HOURLY_READINGS).map(hourly_source_index).collect();
        assert_eq!(indices, vec![3, 6, 9]);
    }

    #[test]
    fn parse_or_default_reports_presence_and_type() {
        let object = json!({"a": 1.5, "b": "text", "c": 7});
        let map = object.as_object();

        assert_eq!(parse_or_default(map, "a", 0.0f32), Field { value: 1.5, parsed: true });
        assert_eq!(parse_or_default(map, "b", 0.0f32), Field { value: 0.0, parsed: false });
        assert_eq!(parse_or_default(map, "missing", 9i64), Field { value: 9, parsed: false });
        assert_eq!(parse_or_default(map, "c", 0.0f32), Field { value: 7.0, parsed: true });
        assert_eq!(parse_or_default(map, "a", 0i64), Field { value: 0, parsed: false });
        assert!(!parse_or_default(None, "a", 0.0f32).parsed);
    }

    #[test]
    fn missing_currently_defaults_current_conditions() {
        let (record, report) = parse(json!({"hourly": {"data": []}}));
        assert_eq!(
            record.current,
            CurrentConditions {
                icon: IconName::new(),
                temperature: 0.0,
                precip_probability: 0.0,
            }
        );
        assert!(!report.current.present);
    }

    #[test]
    fn non_object_currently_is_treated_as_missing() {
        let (record, report) = parse(json!({"currently": "sunny"}));
        assert_eq!(record.current, CurrentConditions::default());
        assert!(!report.current.present);
    }

    #[test]
    fn mistyped_current_fields_fall_back_individually() {
        let (record, report) = parse(json!({
            "currently": {"temperature": "warm", "precipProbability": 0.25, "icon": 3}
        }));
        assert_eq!(record.current.temperature, 0.0);
        assert_eq!(record.current.precip_probability, 0.25);
        assert_eq!(record.current.icon.as_str(), "");
        assert!(report.current.present);
        assert!(!report.current.temperature);
        assert!(report.current.precip_probability);
        assert!(!report.current.icon);
    }

    #[test]
    fn integer_temperature_is_accepted() {
        let (record, report) = parse(json!({"currently": {"temperature": 20}}));
        assert_eq!(record.current.temperature, 20.0);
        assert!(report.current.temperature);
    }

    #[test]
    fn short_hourly_array_zeroes_only_out_of_range_slots() {
        let data: Vec<Value> = (0..7).map(|i| hour(1000 + i, i as f32, "fog")).collect();
        let (record, report) = parse(json!({"hourly": {"data": data}}));

        assert_eq!(record.hourly[0].time, 1003);
        assert_eq!(record.hourly[0].icon.as_str(), "fog");
        assert_eq!(record.hourly[1].time, 1006);
        assert_eq!(record.hourly[1].temperature, 6.0);
        assert_eq!(record.hourly[2], zeroed());

        assert!(report.hourly.present);
        assert!(report.hourly.slots[0].fully_parsed());
        assert!(report.hourly.slots[1].fully_parsed());
        assert!(!report.hourly.slots[2].present);
    }

    #[test]
    fn non_object_hourly_entry_degrades_that_slot() {
        let mut data: Vec<Value> = (0..10).map(|i| hour(i, 1.0, "wind")).collect();
        data[6] = json!("not an object");
        let (record, report) = parse(json!({"hourly": {"data": data}}));

        assert_eq!(record.hourly[0].time, 3);
        assert_eq!(record.hourly[1], zeroed());
        assert_eq!(record.hourly[2].time, 9);
        assert!(!report.hourly.slots[1].present);
    }

    #[test]
    fn fractional_time_is_a_type_mismatch() {
        let mut data: Vec<Value> = (0..10).map(|i| hour(i, 1.0, "wind")).collect();
        data[3] = json!({"time": 12.5, "temperature": 4.0, "icon": "sleet"});
        let (record, report) = parse(json!({"hourly": {"data": data}}));

        assert_eq!(record.hourly[0].time, 0);
        assert_eq!(record.hourly[0].temperature, 4.0);
        assert!(!report.hourly.slots[0].time);
        assert!(report.hourly.slots[0].icon);
    }

    #[test]
    fn missing_hourly_data_defaults_every_slot() {
        for doc in [json!({}), json!({"hourly": {}}), json!({"hourly": {"data": {}}})] {
            let (record, report) = parse(doc);
            assert!(record.hourly.iter().all(|h| *h == zeroed()));
            assert!(!report.hourly.present);
        }
    }

    #[test]
    fn long_icon_is_truncated() {
        let (record, _) = parse(json!({"currently": {"icon": "a-very-long-icon-identifier"}}));
        assert_eq!(record.current.icon.as_str(), "a-very-long-icon-id");
    }

    #[test]
    fn non_object_root_is_an_error() {
        assert!(parse_forecast(b"[]").is_err());
        assert!(parse_forecast(b"null").is_err());
        assert!(parse_forecast(b"").is_err());
    }

    #[test]
    fn complete_document_is_fully_parsed() {
        let data: Vec<Value> = (0..12).map(|i| hour(i, 2.0, "cloudy")).collect();
        let (_, report) = parse(json!({
            "currently": {"temperature": 1.0, "precipProbability": 0.0, "icon": "fog"},
            "hourly": {"data": data}
        }));
        assert!(report.fully_parsed());
    }
}
