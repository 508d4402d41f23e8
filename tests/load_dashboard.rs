use chrono::NaiveDate;
use hlpvolume::dashboard::{load_series, Dashboard};
use hlpvolume::feed::retry::RetryConfig;
use hlpvolume::feed::{load, FileSource, Resources};
use hlpvolume::range::DateRangeSelection;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TOTAL: &str = r#"{"chart_data":[
    {"time":"2024-01-01T00:00:00","coin":"BTC","total_volume":100},
    {"time":"2024-01-01T00:00:00","coin":"ETH","total_volume":50},
    {"time":"2024-01-02T00:00:00","coin":"BTC","total_volume":200},
    {"time":"2024-01-04T00:00:00","coin":"BTC","total_volume":80}
]}"#;

const NON_HLP: &str = r#"{"chart_data":[
    {"time":"2024-01-01T00:00:00","coin":"BTC","daily_usd_volume":60},
    {"time":"2024-01-02T00:00:00","coin":"BTC","daily_usd_volume":500},
    {"time":"2024-01-03T00:00:00","coin":"BTC","daily_usd_volume":10}
]}"#;

fn resources() -> Resources {
    Resources {
        total_volume: "total_volume.json".to_string(),
        non_hlp_volume: "non_hlp_volume.json".to_string(),
    }
}

fn write_fixture(dir: &Path, total: &str, non_hlp: &str) {
    fs::write(dir.join("total_volume.json"), total).unwrap();
    fs::write(dir.join("non_hlp_volume.json"), non_hlp).unwrap();
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn loads_and_merges_from_files() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), TOTAL, NON_HLP);
    let source = FileSource::new(dir.path());

    let (series, report) = load_series(&source, &resources(), &RetryConfig::default())
        .await
        .unwrap();

    let dates: Vec<String> = series.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]);

    let r = series.records();
    assert_eq!(r[0].total_volume, 150.0);
    assert_eq!(r[0].non_hlp_volume, 30.0);
    assert_eq!(r[0].non_hlp_percentage, 20.0);
    // 250 of 200 clamps
    assert_eq!(r[1].non_hlp_percentage, 100.0);
    assert_eq!(r[1].hlp_percentage, 0.0);
    // non-HLP only
    assert_eq!(r[2].total_volume, 0.0);
    assert_eq!(r[2].non_hlp_percentage, 0.0);
    // total only
    assert_eq!(r[3].non_hlp_volume, 0.0);

    assert_eq!(report.volume_points, 4);
    assert_eq!(report.non_hlp_points, 3);
    assert_eq!(report.clamped.len(), 1);
    assert_eq!(report.only_total, vec![d("2024-01-04")]);
    assert_eq!(report.only_non_hlp, vec![d("2024-01-03")]);
}

#[tokio::test]
async fn one_missing_resource_fails_the_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("total_volume.json"), TOTAL).unwrap();
    let source = FileSource::new(dir.path());

    let err = load(&source, &resources(), &RetryConfig::default()).await.unwrap_err();
    assert!(format!("{:#}", err).contains("non_hlp_volume"));
}

#[tokio::test]
async fn malformed_payload_fails_the_load() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), r#"{"chart_data":{"oops":true}}"#, NON_HLP);
    let source = FileSource::new(dir.path());

    let err = load(&source, &resources(), &RetryConfig::default()).await.unwrap_err();
    assert!(format!("{:#}", err).contains("decoding total_volume"));
}

#[tokio::test]
async fn failed_dashboard_renders_empty() {
    let dir = TempDir::new().unwrap();
    let source = FileSource::new(dir.path());

    let mut dash = Dashboard::load(&source, &resources(), &RetryConfig::default()).await;
    assert!(dash.failed());
    assert!(dash.series().is_empty());
    assert!(dash.bounds().is_none());
    assert!(dash.view(DateRangeSelection::All, d("2024-01-10")).is_empty());
}

#[tokio::test]
async fn reload_replaces_series() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), TOTAL, NON_HLP);
    let source = FileSource::new(dir.path());

    let mut dash = Dashboard::load(&source, &resources(), &RetryConfig::default()).await;
    assert!(!dash.failed());
    let bounds = dash.bounds().unwrap();
    assert_eq!(bounds.min, d("2024-01-01"));
    assert_eq!(bounds.max, d("2024-01-04"));

    let custom = DateRangeSelection::Custom {
        start: Some(d("2023-12-01")),
        end: Some(d("2024-01-02")),
    };
    assert_eq!(dash.view(custom, d("2024-01-10")).len(), 2);

    fs::remove_file(dir.path().join("non_hlp_volume.json")).unwrap();
    dash.reload(&source, &resources(), &RetryConfig::default()).await;
    assert!(dash.failed());
    assert!(dash.view(custom, d("2024-01-10")).is_empty());
}
