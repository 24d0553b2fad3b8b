use serde::{Deserialize, Serialize};

/// Raw forecast payload in the upstream provider's shape.
///
/// Deserialization is deliberately lenient: every field defaults when absent,
/// so a structurally odd payload still parses and the decision of what is
/// usable belongs to [`crate::summary::summarize`], not to serde.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPayload {
    /// Upstream status code; `"200"` marks a successful forecast response.
    #[serde(default)]
    pub cod: Option<String>,
    /// Flat list of 3-hour forecast slots, typically 5 days worth.
    #[serde(default)]
    pub list: Vec<RawSample>,
}

/// One 3-hour forecast slot as delivered by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSample {
    /// Slot timestamp, `"YYYY-MM-DD HH:MM:SS"`.
    #[serde(default)]
    pub dt_txt: Option<String>,
    #[serde(default)]
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    /// Precipitation probability in `[0, 1]`; absent means 0.
    #[serde(default)]
    pub pop: Option<f64>,
    #[serde(default)]
    pub wind: Option<Wind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: Option<f64>,
}

/// One reduced forecast entry within a day, kept in arrival order.
#[derive(Debug, Clone, Serialize)]
pub struct DayEntry {
    /// Time of day, `"HH:MM"`.
    pub time: String,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub description: String,
    pub icon: String,
    pub pop: f64,
    pub wind_speed: Option<f64>,
    pub humidity: Option<u8>,
    /// Original slot timestamp, `"YYYY-MM-DD HH:MM:SS"`.
    pub timestamp: String,
}

/// Aggregated forecast for one calendar day.
///
/// The alert flags serialize under the wire names the presentation layer
/// already consumes.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    /// Day key, `"YYYY-MM-DD"`.
    pub day: String,
    pub entries: Vec<DayEntry>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    /// Description of the day's representative entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Icon of the day's representative entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "temAlertaFrio")]
    pub alert_cold: bool,
    #[serde(rename = "temAlertaCalor")]
    pub alert_heat: bool,
    #[serde(rename = "temAlertaChuva")]
    pub alert_rain: bool,
    /// Highest precipitation probability observed across the day.
    pub max_pop: f64,
}
