use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Envelope shared by both volume resources.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartPayload<T> {
    pub chart_data: Vec<T>,
}

/// Series A: total daily volume per coin.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVolumePoint {
    pub time: String,
    pub coin: String,
    pub total_volume: f64,
}

/// Series B: non-HLP daily volume per coin, maker and taker both counted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNonHlpPoint {
    pub time: String,
    pub coin: String,
    pub daily_usd_volume: f64,
}

/// One merged day. Serialized with the dashboard's camelCase keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub total_volume: f64,
    pub non_hlp_volume: f64,
    pub non_hlp_percentage: f64,
    pub hlp_percentage: f64,
}

/// Date-ascending merged series, one record per date.
///
/// Only the aggregator builds one, so the ordering holds for every value
/// of this type. Filtering hands out new vectors and never touches it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    records: Vec<DailyRecord>,
}

impl Series {
    pub(crate) fn from_sorted(records: Vec<DailyRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].date < w[1].date));
        Self { records }
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&DailyRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&DailyRecord> {
        self.records.last()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
