use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc, Weekday};
use praisedeck::naming::{file_name, output_file_name, pacific_time};
use praisedeck::FixedClock;
use proptest::prelude::*;

/// 2000-01-01 through 2099-12-31
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..4_102_444_799i64)
        .prop_map(|secs| DateTime::from_timestamp(secs, 0).expect("in range"))
}

fn target_date(name: &str) -> NaiveDate {
    if let Some(rest) = name.strip_prefix("ebcsv_sunday_") {
        NaiveDate::parse_from_str(rest, "%Y_%m_%d.ppt").expect("sunday date")
    } else if let Some(rest) = name.strip_prefix("TBS_") {
        NaiveDate::parse_from_str(rest, "%Y-%m-%d.ppt").expect("thursday date")
    } else {
        panic!("unexpected file name {name}");
    }
}

proptest! {
    #[test]
    fn names_a_thursday_or_sunday_within_three_days(instant in arb_instant()) {
        let name = output_file_name(&instant);
        prop_assert!(name.ends_with(".ppt"));

        let date = target_date(&name);
        let today = pacific_time(instant).date();
        let ahead = (date - today).num_days();
        prop_assert!((0..=3).contains(&ahead), "{name} is {ahead} days from {today}");

        match date.weekday() {
            Weekday::Sun => prop_assert!(name.starts_with("ebcsv_sunday_")),
            Weekday::Thu => prop_assert!(name.starts_with("TBS_")),
            other => prop_assert!(false, "{name} lands on {other}"),
        }
    }

    #[test]
    fn same_local_day_gives_same_name(instant in arb_instant(), minutes in 0i64..1440) {
        let local = pacific_time(instant);
        let midnight = local.date().and_hms_opt(0, 0, 0).expect("midnight");
        let offset = instant.naive_utc() - local;
        let later = (midnight + TimeDelta::minutes(minutes) + offset).and_utc();
        // skip instants that fall across a daylight saving change
        prop_assume!(pacific_time(later).date() == local.date());
        prop_assert_eq!(output_file_name(&instant), output_file_name(&later));
    }

    #[test]
    fn fixed_clock_matches_pure_function(instant in arb_instant()) {
        prop_assert_eq!(file_name(&FixedClock(instant)), output_file_name(&instant));
    }
}

#[test]
fn thursday_and_sunday_examples() {
    let at = |text: &str| DateTime::parse_from_rfc3339(text).unwrap();
    assert_eq!(output_file_name(&at("2026-10-15T08:00:00-07:00")), "TBS_2026-10-15.ppt");
    assert_eq!(
        output_file_name(&at("2026-10-18T23:59:00-07:00")),
        "ebcsv_sunday_2026_10_18.ppt"
    );
    // Monday evening
    assert_eq!(output_file_name(&at("2026-10-19T21:00:00-07:00")), "TBS_2026-10-22.ppt");
}
