//! Terminal and JSON rendering of a filtered series.

use anyhow::Result;
use serde_json::json;
use std::fmt::Write;

use crate::logging::log_render;
use crate::range::DateRangeSelection;
use crate::types::DailyRecord;

const BAR_WIDTH: usize = 40;

/// `$1.50M`, `$2.30K`, or `$512`.
pub fn format_currency(value: f64) -> String {
    if value > 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value > 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else {
        format!("${:.0}", value)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn render_table(records: &[DailyRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>12}  {:>12}  {:>8}  {:>8}",
        "date", "total", "non-hlp", "non-hlp%", "hlp%"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:<10}  {:>12}  {:>12}  {:>8}  {:>8}",
            r.date,
            format_currency(r.total_volume),
            format_currency(r.non_hlp_volume),
            format_percent(r.non_hlp_percentage),
            format_percent(r.hlp_percentage),
        );
    }
    out
}

/// One bar per day: `#` for the non-HLP share, `.` for the HLP share.
pub fn render_share_chart(records: &[DailyRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let filled = ((r.non_hlp_percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);
        let _ = writeln!(
            out,
            "{} |{}{}| {}",
            r.date,
            "#".repeat(filled),
            ".".repeat(BAR_WIDTH - filled),
            format_percent(r.non_hlp_percentage),
        );
    }
    out
}

pub fn render_empty(selection: DateRangeSelection) -> String {
    format!("no volume data for range {}\n", selection)
}

pub fn render_json(selection: DateRangeSelection, records: &[DailyRecord]) -> Result<String> {
    let payload = json!({
        "range": selection.to_string(),
        "records": records,
    });
    let out = serde_json::to_string_pretty(&payload)?;
    log_render("json", &selection.to_string(), records.len(), out.len());
    Ok(out)
}

/// Human view: header line, table, optional share chart.
pub fn render_dashboard(selection: DateRangeSelection, records: &[DailyRecord], chart: bool) -> String {
    if records.is_empty() {
        let out = render_empty(selection);
        log_render("table", &selection.to_string(), 0, out.len());
        return out;
    }
    let mut out = String::new();
    let total: f64 = records.iter().map(|r| r.total_volume).sum();
    let non_hlp: f64 = records.iter().map(|r| r.non_hlp_volume).sum();
    let _ = writeln!(
        out,
        "range {}  days {}  total {}  non-hlp {}",
        selection,
        records.len(),
        format_currency(total),
        format_currency(non_hlp),
    );
    out.push('\n');
    out.push_str(&render_table(records));
    if chart {
        out.push('\n');
        out.push_str(&render_share_chart(records));
    }
    log_render("table", &selection.to_string(), records.len(), out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(date: &str, total: f64, non_hlp: f64, pct: f64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_volume: total,
            non_hlp_volume: non_hlp,
            non_hlp_percentage: pct,
            hlp_percentage: 100.0 - pct,
        }
    }

    #[test]
    fn currency_tiers() {
        assert_eq!(format_currency(2_500_000.0), "$2.50M");
        assert_eq!(format_currency(1_000_000.0), "$1000.00K");
        assert_eq!(format_currency(1_500.0), "$1.50K");
        assert_eq!(format_currency(1_000.0), "$1000");
        assert_eq!(format_currency(42.0), "$42");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn percent_one_decimal() {
        assert_eq!(format_percent(20.0), "20.0%");
        assert_eq!(format_percent(33.333), "33.3%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn chart_bar_widths() {
        let out = render_share_chart(&[rec("2024-01-01", 100.0, 50.0, 50.0), rec("2024-01-02", 100.0, 100.0, 100.0)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches('#').count(), 20);
        assert_eq!(lines[1].matches('#').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('.').count(), 1); // the "100.0%" label
    }

    #[test]
    fn dashboard_empty_state() {
        let out = render_dashboard(DateRangeSelection::Last7Days, &[], true);
        assert_eq!(out, "no volume data for range 7d\n");
    }

    #[test]
    fn json_uses_camel_case_records() {
        let out = render_json(DateRangeSelection::All, &[rec("2024-01-01", 100.0, 20.0, 20.0)]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["range"], "all");
        assert_eq!(v["records"][0]["nonHlpVolume"], 20.0);
        assert_eq!(v["records"][0]["date"], "2024-01-01");
    }
}
