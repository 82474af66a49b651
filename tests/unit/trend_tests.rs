use std::collections::BTreeMap;

use chrono::NaiveDate;
use fitness_tracker_mcp::analytics::trend;
use fitness_tracker_mcp::domain::Trend;

fn series(values: &[f64]) -> BTreeMap<NaiveDate, f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (NaiveDate::from_ymd_opt(2024, 5, i as u32 + 1).unwrap(), *v))
        .collect()
}

#[test]
fn test_trend_thresholds() {
    assert_eq!(trend(&series(&[100.0, 100.0, 120.0, 120.0])), Trend::Up);
    assert_eq!(trend(&series(&[100.0, 100.0, 80.0, 80.0])), Trend::Down);
    assert_eq!(trend(&series(&[100.0, 100.0, 105.0, 105.0])), Trend::Stable);
}

#[test]
fn test_trend_boundaries_are_stable() {
    // Exactly 10% either way is not enough
    assert_eq!(trend(&series(&[100.0, 110.0])), Trend::Stable);
    assert_eq!(trend(&series(&[100.0, 90.0])), Trend::Stable);
}

#[test]
fn test_short_series_is_stable() {
    assert_eq!(trend(&series(&[])), Trend::Stable);
    assert_eq!(trend(&series(&[500.0])), Trend::Stable);
}
