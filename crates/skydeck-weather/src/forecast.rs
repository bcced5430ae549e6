//! Reduces fixed-cadence forecast samples into per-day averages.

use chrono::{NaiveDate, TimeZone};

use crate::types::{DailyForecastPoint, ForecastSample};

struct DayBucket {
    date: NaiveDate,
    temp_sum: f64,
    count: u32,
    description: String,
}

/// Group samples by the calendar date of their timestamp in `tz` and average
/// the temperature of each group.
///
/// Days appear in the order they are first encountered. A day's description
/// is the one carried by its first sample.
pub fn daily_averages<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailyForecastPoint> {
    let mut buckets: Vec<DayBucket> = Vec::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(tz).date_naive();

        match buckets.iter_mut().find(|b| b.date == date) {
            Some(bucket) => {
                bucket.temp_sum += sample.temperature;
                bucket.count += 1;
            }
            None => buckets.push(DayBucket {
                date,
                temp_sum: sample.temperature,
                count: 1,
                description: sample.description.clone(),
            }),
        }
    }

    buckets
        .into_iter()
        .map(|b| DailyForecastPoint {
            date: b.date,
            avg_temp: round_tenths(b.temp_sum / f64::from(b.count)),
            description: b.description,
        })
        .collect()
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
