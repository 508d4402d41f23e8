//! Date-keyed merge of the total-volume and non-HLP series.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::logging::{log_aggregate_summary, log_clamped};
use crate::types::{DailyRecord, RawNonHlpPoint, RawVolumePoint, Series};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Non-HLP volume counts both maker and taker sides of each fill.
const NON_HLP_DOUBLE_COUNT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClampedDay {
    pub date: NaiveDate,
    pub raw_pct: f64,
}

/// What the merge saw besides the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateReport {
    pub volume_points: usize,
    pub non_hlp_points: usize,
    /// Dates with total volume but no non-HLP data.
    pub only_total: Vec<NaiveDate>,
    /// Dates with non-HLP data but no total volume.
    pub only_non_hlp: Vec<NaiveDate>,
    /// Dates where non-HLP exceeded the total and the share was capped.
    pub clamped: Vec<ClampedDay>,
}

/// Calendar-date portion of a timestamp: everything before the first `T`.
pub fn date_key(time: &str) -> &str {
    match time.find('T') {
        Some(idx) => &time[..idx],
        None => time,
    }
}

pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
    if key.len() != 10 {
        return Err(anyhow!("date key {:?} is not YYYY-MM-DD", key));
    }
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map_err(|e| anyhow!("date key {:?} is not a calendar date: {}", key, e))
}

/// Per-date sums of `value / divisor`. Volumes must be finite and non-negative.
fn accumulate<'a, I>(source: &str, points: I, divisor: f64) -> Result<BTreeMap<NaiveDate, f64>>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut sums = BTreeMap::new();
    for (idx, (time, value)) in points.into_iter().enumerate() {
        let date = parse_date_key(date_key(time))
            .map_err(|e| anyhow!("{} point {}: {}", source, idx, e))?;
        if !value.is_finite() {
            return Err(anyhow!("{} point {} ({}): non-finite volume {}", source, idx, time, value));
        }
        if value < 0.0 {
            return Err(anyhow!("{} point {} ({}): negative volume {}", source, idx, time, value));
        }
        *sums.entry(date).or_insert(0.0) += value / divisor;
    }
    Ok(sums)
}

/// Non-HLP share of the total in percent, capped at 100.
/// Second value is the uncapped ratio, when it exceeded the cap.
pub fn non_hlp_share(total: f64, non_hlp: f64) -> (f64, Option<f64>) {
    if total <= 0.0 {
        return (0.0, None);
    }
    let raw = non_hlp / total * 100.0;
    if raw > 100.0 {
        (100.0, Some(raw))
    } else {
        (raw, None)
    }
}

/// Merge both series into one record per date.
pub fn aggregate(volume: &[RawVolumePoint], non_hlp: &[RawNonHlpPoint]) -> Result<Series> {
    aggregate_with_report(volume, non_hlp).map(|(series, _)| series)
}

pub fn aggregate_with_report(
    volume: &[RawVolumePoint],
    non_hlp: &[RawNonHlpPoint],
) -> Result<(Series, AggregateReport)> {
    let totals = accumulate(
        "total_volume",
        volume.iter().map(|p| (p.time.as_str(), p.total_volume)),
        1.0,
    )?;
    let non_hlp_sums = accumulate(
        "non_hlp_volume",
        non_hlp.iter().map(|p| (p.time.as_str(), p.daily_usd_volume)),
        NON_HLP_DOUBLE_COUNT,
    )?;

    let mut dates: Vec<NaiveDate> = totals.keys().chain(non_hlp_sums.keys()).copied().collect();
    dates.sort_unstable();
    dates.dedup();

    let mut report = AggregateReport {
        volume_points: volume.len(),
        non_hlp_points: non_hlp.len(),
        ..Default::default()
    };

    let mut records = Vec::with_capacity(dates.len());
    for date in dates {
        let total = totals.get(&date).copied();
        let nh = non_hlp_sums.get(&date).copied();
        match (total, nh) {
            (Some(_), None) => report.only_total.push(date),
            (None, Some(_)) => report.only_non_hlp.push(date),
            _ => {}
        }
        let total = total.unwrap_or(0.0);
        let nh = nh.unwrap_or(0.0);

        let (non_hlp_percentage, raw) = non_hlp_share(total, nh);
        if let Some(raw_pct) = raw {
            log_clamped(date, raw_pct, total, nh);
            report.clamped.push(ClampedDay { date, raw_pct });
        }

        records.push(DailyRecord {
            date,
            total_volume: total.round(),
            non_hlp_volume: nh.round(),
            non_hlp_percentage,
            hlp_percentage: 100.0 - non_hlp_percentage,
        });
    }

    log_aggregate_summary(
        records.len(),
        report.volume_points,
        report.non_hlp_points,
        report.only_total.len(),
        report.only_non_hlp.len(),
        report.clamped.len(),
    );

    Ok((Series::from_sorted(records), report))
}
