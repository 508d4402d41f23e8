use hlpvolume::aggregate::{aggregate, aggregate_with_report};
use hlpvolume::types::{RawNonHlpPoint, RawVolumePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const COINS: [&str; 4] = ["BTC", "ETH", "SOL", "HYPE"];

fn vol(time: &str, coin: &str, v: f64) -> RawVolumePoint {
    RawVolumePoint {
        time: time.to_string(),
        coin: coin.to_string(),
        total_volume: v,
    }
}

fn nh(time: &str, coin: &str, v: f64) -> RawNonHlpPoint {
    RawNonHlpPoint {
        time: time.to_string(),
        coin: coin.to_string(),
        daily_usd_volume: v,
    }
}

/// Shuffled multi-coin points over a few weeks, some days one-sided.
fn random_inputs(seed: u64) -> (Vec<RawVolumePoint>, Vec<RawNonHlpPoint>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = Vec::new();
    let mut b = Vec::new();
    for _ in 0..200 {
        let day = rng.gen_range(1..=28);
        let coin = COINS[rng.gen_range(0..COINS.len())];
        let time = if rng.gen_bool(0.5) {
            format!("2024-02-{:02}T{:02}:00:00", day, rng.gen_range(0..24))
        } else {
            format!("2024-02-{:02}", day)
        };
        if rng.gen_bool(0.6) {
            a.push(vol(&time, coin, rng.gen_range(0.0..5_000_000.0)));
        } else {
            b.push(nh(&time, coin, rng.gen_range(0.0..8_000_000.0)));
        }
    }
    (a, b)
}

#[test]
fn output_is_strictly_ascending() {
    for seed in 0..20 {
        let (a, b) = random_inputs(seed);
        let series = aggregate(&a, &b).unwrap();
        assert!(!series.is_empty());
        for w in series.records().windows(2) {
            assert!(w[0].date < w[1].date, "seed {}: {} !< {}", seed, w[0].date, w[1].date);
        }
    }
}

#[test]
fn shares_stay_in_range_and_sum_to_100() {
    for seed in 0..20 {
        let (a, b) = random_inputs(seed);
        for r in aggregate(&a, &b).unwrap().iter() {
            assert!(r.non_hlp_percentage >= 0.0 && r.non_hlp_percentage <= 100.0);
            assert_eq!(r.hlp_percentage, 100.0 - r.non_hlp_percentage);
        }
    }
}

#[test]
fn one_record_per_date_key() {
    let (a, b) = random_inputs(7);
    let mut keys: Vec<String> = a
        .iter()
        .map(|p| p.time[..10].to_string())
        .chain(b.iter().map(|p| p.time[..10].to_string()))
        .collect();
    keys.sort();
    keys.dedup();
    let series = aggregate(&a, &b).unwrap();
    let dates: Vec<String> = series.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, keys);
}

#[test]
fn total_only_day_has_no_share() {
    let series = aggregate(
        &[vol("2024-01-01T00:00:00", "BTC", 500.0), vol("2024-01-02T00:00:00", "BTC", 10.0)],
        &[nh("2024-01-02T00:00:00", "BTC", 4.0)],
    )
    .unwrap();
    let first = series.records()[0];
    assert_eq!(first.date.to_string(), "2024-01-01");
    assert_eq!(first.non_hlp_volume, 0.0);
    assert_eq!(first.non_hlp_percentage, 0.0);
    assert_eq!(first.hlp_percentage, 100.0);
}

#[test]
fn halved_scenario() {
    let series = aggregate(
        &[vol("2024-01-01T00:00:00", "BTC", 100.0)],
        &[nh("2024-01-01T00:00:00", "BTC", 40.0)],
    )
    .unwrap();
    let json = serde_json::to_value(&series).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "date": "2024-01-01",
            "totalVolume": 100.0,
            "nonHlpVolume": 20.0,
            "nonHlpPercentage": 20.0,
            "hlpPercentage": 80.0
        }])
    );
}

#[test]
fn coins_on_same_day_are_summed() {
    let series = aggregate(
        &[
            vol("2024-01-01T00:00:00", "BTC", 100.0),
            vol("2024-01-01T00:00:00", "BTC", 50.0),
            vol("2024-01-01T08:00:00", "ETH", 25.0),
        ],
        &[nh("2024-01-01", "BTC", 70.0), nh("2024-01-01T16:00:00", "ETH", 5.0)],
    )
    .unwrap();
    assert_eq!(series.len(), 1);
    let r = series.records()[0];
    assert_eq!(r.total_volume, 175.0);
    assert_eq!(r.non_hlp_volume, 38.0); // 37.5 rounds up
    assert!((r.non_hlp_percentage - 37.5 / 175.0 * 100.0).abs() < 1e-9);
}

#[test]
fn over_100_percent_is_clamped_and_reported() {
    let (series, report) = aggregate_with_report(
        &[vol("2024-01-01", "BTC", 100.0), vol("2024-01-02", "BTC", 100.0)],
        &[nh("2024-01-01", "BTC", 300.0), nh("2024-01-02", "BTC", 100.0)],
    )
    .unwrap();
    let r = series.records()[0];
    assert_eq!(r.non_hlp_percentage, 100.0);
    assert_eq!(r.hlp_percentage, 0.0);
    assert_eq!(report.clamped.len(), 1);
    assert_eq!(report.clamped[0].date.to_string(), "2024-01-01");
    assert_eq!(series.records()[1].non_hlp_percentage, 50.0);
}

#[test]
fn bad_timestamp_fails_fast() {
    let err = aggregate(&[vol("2024-01-01", "BTC", 1.0)], &[nh("Jan 2 2024", "BTC", 1.0)]).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("non_hlp_volume point 0"), "{}", msg);
    assert!(msg.contains("Jan 2 2024"), "{}", msg);
}

#[test]
fn negative_volume_cannot_push_share_out_of_range() {
    let result = aggregate(
        &[vol("2024-01-01T00:00:00", "BTC", 100.0)],
        &[nh("2024-01-01T00:00:00", "BTC", -40.0)],
    );
    let err = result.expect_err("negative non-HLP volume must be rejected");
    let msg = format!("{:#}", err);
    assert!(msg.contains("non_hlp_volume point 0"), "{}", msg);
    assert!(msg.contains("-40"), "{}", msg);

    let err = aggregate(&[vol("2024-01-01", "ETH", -1.0)], &[]).unwrap_err();
    assert!(format!("{:#}", err).contains("total_volume point 0"));
}
