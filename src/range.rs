//! Date-window selection over a merged series.

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use std::fmt;

use crate::aggregate::parse_date_key;
use crate::data::DateBounds;
use crate::logging::log_selection;
use crate::types::{DailyRecord, Series};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DateRangeSelection {
    #[default]
    All,
    Last7Days,
    Last30Days,
    Last90Days,
    Last365Days,
    /// Inclusive on both ends. Unset on either side means no filtering.
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateRangeSelection {
    pub const ROLLING: [DateRangeSelection; 4] = [
        DateRangeSelection::Last7Days,
        DateRangeSelection::Last30Days,
        DateRangeSelection::Last90Days,
        DateRangeSelection::Last365Days,
    ];

    pub fn rolling_days(&self) -> Option<i64> {
        match self {
            DateRangeSelection::Last7Days => Some(7),
            DateRangeSelection::Last30Days => Some(30),
            DateRangeSelection::Last90Days => Some(90),
            DateRangeSelection::Last365Days => Some(365),
            _ => None,
        }
    }

    /// Accepts `all`, `7d`/`30d`/`90d`/`365d`, `last-N-days`, and
    /// `custom:START:END` where either date may be left empty.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim().to_lowercase();
        if let Some(rest) = s.strip_prefix("custom:") {
            let (start, end) = rest
                .split_once(':')
                .ok_or_else(|| anyhow!("custom range {:?} must be custom:START:END", input))?;
            return Ok(DateRangeSelection::Custom {
                start: parse_bound(start)?,
                end: parse_bound(end)?,
            });
        }
        match s.as_str() {
            "all" => Ok(DateRangeSelection::All),
            "7d" | "last-7-days" => Ok(DateRangeSelection::Last7Days),
            "30d" | "last-30-days" => Ok(DateRangeSelection::Last30Days),
            "90d" | "last-90-days" => Ok(DateRangeSelection::Last90Days),
            "365d" | "last-365-days" => Ok(DateRangeSelection::Last365Days),
            _ => Err(anyhow!(
                "unknown range {:?}; expected all, 7d, 30d, 90d, 365d or custom:START:END",
                input
            )),
        }
    }

    /// Pull custom bounds that overshoot the data back to its first/last
    /// date. Which records match is unchanged.
    pub fn bounded_to(self, bounds: DateBounds) -> Self {
        match self {
            DateRangeSelection::Custom { start, end } => DateRangeSelection::Custom {
                start: start.map(|d| d.max(bounds.min)),
                end: end.map(|d| d.min(bounds.max)),
            },
            other => other,
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateRangeSelection::All => true,
            DateRangeSelection::Custom {
                start: Some(start),
                end: Some(end),
            } => *start <= date && date <= *end,
            DateRangeSelection::Custom { .. } => true,
            rolling => match rolling.rolling_days() {
                Some(days) => date >= today - Duration::days(days),
                None => true,
            },
        }
    }
}

fn parse_bound(s: &str) -> Result<Option<NaiveDate>> {
    let s = s.trim();
    if s.is_empty() {
        Ok(None)
    } else {
        parse_date_key(s).map(Some)
    }
}

impl fmt::Display for DateRangeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRangeSelection::All => write!(f, "all"),
            DateRangeSelection::Last7Days => write!(f, "7d"),
            DateRangeSelection::Last30Days => write!(f, "30d"),
            DateRangeSelection::Last90Days => write!(f, "90d"),
            DateRangeSelection::Last365Days => write!(f, "365d"),
            DateRangeSelection::Custom { start, end } => {
                write!(f, "custom:")?;
                if let Some(s) = start {
                    write!(f, "{}", s)?;
                }
                write!(f, ":")?;
                if let Some(e) = end {
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
        }
    }
}

/// Records of `series` inside `selection`, evaluated as of `today`.
pub fn filter(series: &Series, selection: DateRangeSelection, today: NaiveDate) -> Vec<DailyRecord> {
    let kept: Vec<DailyRecord> = series
        .iter()
        .filter(|r| selection.contains(r.date, today))
        .copied()
        .collect();
    log_selection(&selection.to_string(), kept.len(), series.len());
    kept
}

/// Memoized `filter` over an owned series.
///
/// Recomputes only when the selection or the evaluation date changes.
/// `replace` swaps in a freshly loaded series and drops the cached view.
#[derive(Debug, Default)]
pub struct Projection {
    series: Series,
    cached: Option<(DateRangeSelection, NaiveDate, Vec<DailyRecord>)>,
}

impl Projection {
    pub fn new(series: Series) -> Self {
        Self { series, cached: None }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn replace(&mut self, series: Series) {
        self.series = series;
        self.cached = None;
    }

    pub fn project(&mut self, selection: DateRangeSelection, today: NaiveDate) -> &[DailyRecord] {
        if !self.is_cached(selection, today) {
            let view = filter(&self.series, selection, today);
            self.cached = Some((selection, today, view));
        }
        match &self.cached {
            Some((_, _, view)) => view,
            None => &[],
        }
    }

    pub fn is_cached(&self, selection: DateRangeSelection, today: NaiveDate) -> bool {
        matches!(&self.cached, Some((sel, day, _)) if *sel == selection && *day == today)
    }
}
