use chrono::{Duration, NaiveDate};
use fitness_tracker_mcp::domain::StreakSummary;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

#[test]
fn test_duplicates_do_not_change_streaks() {
    let today = day(20);
    let dates = vec![day(18), day(19), day(20), day(10), day(11)];
    let mut doubled = dates.clone();
    doubled.extend(dates.iter().copied());

    let once = StreakSummary::from_dates(dates, today);
    let twice = StreakSummary::from_dates(doubled, today);
    assert_eq!(once.current, twice.current);
    assert_eq!(once.longest, twice.longest);
    assert_eq!(once.current, 3);
}

#[test]
fn test_stale_completion_breaks_current() {
    let today = day(20);
    let summary = StreakSummary::from_dates(vec![day(15), day(16), day(17)], today);
    assert_eq!(summary.current, 0);
    assert_eq!(summary.longest, 3);
    assert_eq!(summary.last_completed, Some(day(17)));
}

#[test]
fn test_yesterday_keeps_streak_alive() {
    let today = day(20);
    let summary = StreakSummary::from_dates(vec![day(18), day(19)], today);
    assert_eq!(summary.current, 2);
}

#[test]
fn test_longest_bounds() {
    let today = day(28);
    for len in 1..6u32 {
        let dates: Vec<NaiveDate> = (0..len)
            .map(|i| today - Duration::days(i64::from(i) * 2))
            .collect();
        let summary = StreakSummary::from_dates(dates, today);
        assert!(summary.longest >= summary.current);
        assert!(summary.longest >= 1);
    }

    let empty = StreakSummary::from_dates(Vec::new(), today);
    assert_eq!(empty.current, 0);
    assert_eq!(empty.longest, 0);
    assert_eq!(empty.last_completed, None);
}
