use anyhow::Result;
use chrono::NaiveDate;

use crate::aggregate::{aggregate_with_report, AggregateReport};
use crate::data::{date_bounds, DateBounds};
use crate::feed::retry::RetryConfig;
use crate::feed::{load, Resources, Source};
use crate::logging::log_load_failure;
use crate::range::{DateRangeSelection, Projection};
use crate::types::{DailyRecord, Series};

/// Fetch → aggregate. Any error here is a load failure.
pub async fn load_series(
    source: &dyn Source,
    resources: &Resources,
    retry: &RetryConfig,
) -> Result<(Series, AggregateReport)> {
    let raw = load(source, resources, retry).await?;
    aggregate_with_report(&raw.volume, &raw.non_hlp)
}

/// State of one dashboard view.
///
/// A failed load leaves an empty series behind: the failure is logged once
/// and the view renders its empty state.
#[derive(Debug, Default)]
pub struct Dashboard {
    projection: Projection,
    report: AggregateReport,
    failed: bool,
}

impl Dashboard {
    pub async fn load(source: &dyn Source, resources: &Resources, retry: &RetryConfig) -> Self {
        let mut dashboard = Self::default();
        dashboard.reload(source, resources, retry).await;
        dashboard
    }

    /// Rebuild from scratch; the previous series is discarded either way.
    pub async fn reload(&mut self, source: &dyn Source, resources: &Resources, retry: &RetryConfig) {
        match load_series(source, resources, retry).await {
            Ok((series, report)) => {
                self.projection.replace(series);
                self.report = report;
                self.failed = false;
            }
            Err(err) => {
                log_load_failure(&err);
                self.projection.replace(Series::default());
                self.report = AggregateReport::default();
                self.failed = true;
            }
        }
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn series(&self) -> &Series {
        self.projection.series()
    }

    pub fn report(&self) -> &AggregateReport {
        &self.report
    }

    /// Limits for the custom start/end inputs.
    pub fn bounds(&self) -> Option<DateBounds> {
        date_bounds(self.series())
    }

    /// Custom selections are clamped to the data's bounds first.
    pub fn view(&mut self, selection: DateRangeSelection, today: NaiveDate) -> &[DailyRecord] {
        let selection = match self.bounds() {
            Some(bounds) => selection.bounded_to(bounds),
            None => selection,
        };
        self.projection.project(selection, today)
    }
}
