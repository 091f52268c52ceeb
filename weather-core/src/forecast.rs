//! Groups 3-hour forecast samples into per-day summaries.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::HashMap;
use tracing::{trace, warn};

use crate::model::{DailySummary, ForecastSet};

/// Number of days shown in the daily forecast.
pub const MAX_DAYS: usize = 5;

#[derive(Debug)]
struct DayBucket<'a> {
    label: String,
    temps: Vec<f64>,
    min_temps: Vec<f64>,
    max_temps: Vec<f64>,
    pops: Vec<f64>,
    icons: Vec<&'a str>,
    descriptions: Vec<&'a str>,
}

impl<'a> DayBucket<'a> {
    fn new(label: String) -> Self {
        Self {
            label,
            temps: Vec::new(),
            min_temps: Vec::new(),
            max_temps: Vec::new(),
            pops: Vec::new(),
            icons: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    fn summarize(self) -> DailySummary {
        let avg = self.temps.iter().sum::<f64>() / self.temps.len() as f64;
        let min = self.min_temps.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.max_temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let pop = self.pops.iter().copied().fold(0.0, f64::max);

        DailySummary {
            date: self.label,
            avg_temp: round_half_up(avg),
            min_temp: round_half_up(min),
            max_temp: round_half_up(max),
            max_pop: round_half_up(pop * 100.0).clamp(0, 100) as u8,
            icon: most_frequent(&self.icons).unwrap_or_default().to_string(),
            description: most_frequent(&self.descriptions)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Aggregate a forecast into at most [`MAX_DAYS`] daily summaries.
///
/// Days are the calendar dates of each sample in the location's local time,
/// ordered by first appearance in the input. The input is expected to be
/// chronological already and is not re-sorted.
pub fn aggregate_daily(forecast: &ForecastSet) -> Vec<DailySummary> {
    let offset = FixedOffset::east_opt(forecast.utc_offset_secs).unwrap_or_else(|| {
        warn!(
            offset = forecast.utc_offset_secs,
            "invalid UTC offset in forecast, using UTC"
        );
        Utc.fix()
    });

    let mut order: Vec<NaiveDate> = Vec::new();
    let mut buckets: HashMap<NaiveDate, DayBucket<'_>> = HashMap::new();

    for sample in &forecast.samples {
        let Some(local) = DateTime::<Utc>::from_timestamp(sample.dt, 0)
            .map(|dt| dt.with_timezone(&offset))
        else {
            warn!(dt = sample.dt, "forecast sample timestamp out of range, skipping");
            continue;
        };

        let day = local.date_naive();
        let bucket = buckets.entry(day).or_insert_with(|| {
            order.push(day);
            DayBucket::new(local.format("%a, %b %-d").to_string())
        });

        bucket.temps.push(sample.temperature);
        bucket.min_temps.push(sample.temp_min);
        bucket.max_temps.push(sample.temp_max);
        bucket.pops.push(sample.pop);
        bucket.icons.push(&sample.icon);
        bucket.descriptions.push(&sample.description);
    }

    trace!(days = order.len(), samples = forecast.samples.len(), "grouped forecast");

    order
        .into_iter()
        .take(MAX_DAYS)
        .filter_map(|day| buckets.remove(&day))
        .map(DayBucket::summarize)
        .collect()
}

/// Most frequent value; ties go to the value that reached the top count
/// first in input order.
fn most_frequent<'a>(values: &[&'a str]) -> Option<&'a str> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((*value, 1)),
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (value, n) in counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((value, n));
        }
    }
    best.map(|(value, _)| value)
}

/// Round to the nearest integer, halves toward positive infinity
/// (`-2.5 -> -2`, `2.5 -> 3`).
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
