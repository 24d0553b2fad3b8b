//! Per-day summarization of the raw forecast feed.
//!
//! A pure, stateless fold: the flat 3-hour sample list is grouped by calendar
//! day, each day gets min/max temperatures, a representative condition and
//! three alert flags. No I/O happens here; the module is fully testable with
//! literal JSON fixtures.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::model::{DayEntry, DaySummary, RawPayload, RawSample};

/// Status code the provider uses to mark a successful forecast payload.
const SUCCESS_COD: &str = "200";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Preferred representative slots, in priority order.
const PREFERRED_TIMES: [&str; 2] = ["12:00", "15:00"];

/// Thresholds applied when deriving the per-day alert flags.
///
/// Defaults: cold below 10 °C, heat above 30 °C, rain at a precipitation
/// probability of 0.4 or higher.
#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    pub cold_below_c: f64,
    pub heat_above_c: f64,
    pub rain_pop: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cold_below_c: 10.0,
            heat_above_c: 30.0,
            rain_pop: 0.4,
        }
    }
}

/// Mutable per-day accumulator built up while walking the sample list.
struct DayBucket {
    date: NaiveDate,
    entries: Vec<DayEntry>,
    /// Finite temperatures only; scratch for min/max, never part of the output.
    temps: Vec<f64>,
    alert_rain: bool,
    max_pop: f64,
}

impl DayBucket {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
            temps: Vec::new(),
            alert_rain: false,
            max_pop: 0.0,
        }
    }
}

/// Reduce a raw payload to one summary per calendar day, sorted ascending by
/// date, using the default [`AlertThresholds`].
///
/// Returns `None` for a structurally invalid payload (wrong status code or an
/// empty sample list). Individual malformed samples are skipped with a
/// warning and never abort the aggregation.
#[must_use]
pub fn summarize(payload: &RawPayload) -> Option<Vec<DaySummary>> {
    summarize_with(payload, AlertThresholds::default())
}

/// Same as [`summarize`] with explicit thresholds.
#[must_use]
pub fn summarize_with(
    payload: &RawPayload,
    thresholds: AlertThresholds,
) -> Option<Vec<DaySummary>> {
    if payload.cod.as_deref() != Some(SUCCESS_COD) || payload.list.is_empty() {
        return None;
    }

    let mut buckets: Vec<DayBucket> = Vec::new();

    for sample in &payload.list {
        let Some((date, entry)) = reduce_sample(sample) else {
            warn!(timestamp = ?sample.dt_txt, "skipping malformed forecast sample");
            continue;
        };

        // Buckets are created lazily, in first-seen order.
        let idx = match buckets.iter().position(|b| b.date == date) {
            Some(idx) => idx,
            None => {
                buckets.push(DayBucket::new(date));
                buckets.len() - 1
            }
        };
        let bucket = &mut buckets[idx];

        if let Some(temp) = entry.temperature {
            bucket.temps.push(temp);
        }
        if entry.pop >= thresholds.rain_pop {
            bucket.alert_rain = true;
        }
        if entry.pop > bucket.max_pop {
            bucket.max_pop = entry.pop;
        }
        bucket.entries.push(entry);
    }

    debug!(
        samples = payload.list.len(),
        days = buckets.len(),
        "grouped forecast samples"
    );

    buckets.sort_by_key(|b| b.date);

    Some(
        buckets
            .into_iter()
            .map(|b| finalize(b, thresholds))
            .collect(),
    )
}

/// Validate one raw sample and reduce it to a day entry.
///
/// A sample is retained only if its timestamp parses, it carries a
/// temperature block and its weather list is non-empty.
fn reduce_sample(sample: &RawSample) -> Option<(NaiveDate, DayEntry)> {
    let ts = sample.dt_txt.as_deref()?;
    let parsed = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()?;
    let main = sample.main.as_ref()?;
    let condition = sample.weather.first()?;

    let entry = DayEntry {
        time: parsed.format("%H:%M").to_string(),
        temperature: main.temp.filter(|t| t.is_finite()),
        feels_like: main.feels_like.filter(|t| t.is_finite()),
        description: condition.description.clone(),
        icon: condition.icon.clone(),
        pop: sample.pop.filter(|p| p.is_finite()).unwrap_or(0.0),
        wind_speed: sample.wind.as_ref().and_then(|w| w.speed),
        humidity: main.humidity,
        timestamp: ts.to_string(),
    };

    Some((parsed.date(), entry))
}

fn finalize(bucket: DayBucket, thresholds: AlertThresholds) -> DaySummary {
    // Fallback to the first entry covers the case where no sample carried a
    // usable temperature.
    let first_temp = bucket.entries.first().and_then(|e| e.temperature);
    let temp_min = bucket.temps.iter().copied().reduce(f64::min).or(first_temp);
    let temp_max = bucket.temps.iter().copied().reduce(f64::max).or(first_temp);

    let representative = representative_index(&bucket.entries).map(|i| &bucket.entries[i]);
    let condition = representative.map(|e| e.description.clone());
    let icon = representative.map(|e| e.icon.clone());

    DaySummary {
        day: bucket.date.format("%Y-%m-%d").to_string(),
        temp_min,
        temp_max,
        condition,
        icon,
        alert_cold: temp_min.is_some_and(|t| t < thresholds.cold_below_c),
        alert_heat: temp_max.is_some_and(|t| t > thresholds.heat_above_c),
        alert_rain: bucket.alert_rain,
        max_pop: bucket.max_pop,
        entries: bucket.entries,
    }
}

/// Pick the entry that best characterizes a day.
///
/// The `12:00` slot wins if present, then `15:00`, otherwise the middle entry
/// (`len / 2`). `None` only for an empty slice, which cannot occur for a
/// bucket since buckets always hold at least one entry.
#[must_use]
pub fn representative_index(entries: &[DayEntry]) -> Option<usize> {
    for time in PREFERRED_TIMES {
        if let Some(idx) = entries.iter().position(|e| e.time == time) {
            return Some(idx);
        }
    }

    if entries.is_empty() {
        None
    } else {
        Some(entries.len() / 2)
    }
}
