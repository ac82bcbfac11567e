//! Output file naming: the deck is named after the next Thursday or Sunday service
//! in US Pacific time.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc, Weekday};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Days from `weekday` to the service it prepares for.
pub fn days_until_service(weekday: Weekday) -> u32 {
    match weekday {
        Weekday::Mon => 3,
        Weekday::Tue => 2,
        Weekday::Wed => 1,
        Weekday::Thu => 0,
        Weekday::Fri => 2,
        Weekday::Sat => 1,
        Weekday::Sun => 0,
    }
}

/// Local wall time in the US Pacific zone.
///
/// Daylight time runs from 02:00 on the second Sunday of March to 02:00 on the first
/// Sunday of November.
pub fn pacific_time(instant: DateTime<Utc>) -> NaiveDateTime {
    let utc = instant.naive_utc();
    let year = utc.year();
    let dst_start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)
        .and_then(|day| day.and_hms_opt(10, 0, 0));
    let dst_end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)
        .and_then(|day| day.and_hms_opt(9, 0, 0));
    let daylight = match (dst_start, dst_end) {
        (Some(start), Some(end)) => utc >= start && utc < end,
        _ => false,
    };
    utc - TimeDelta::hours(if daylight { 7 } else { 8 })
}

/// Date of the next service on or after `today`.
pub fn service_date(today: NaiveDate) -> NaiveDate {
    today + TimeDelta::days(i64::from(days_until_service(today.weekday())))
}

/// File name for the deck of the service on `date`.
pub fn file_name_for(date: NaiveDate) -> String {
    if date.weekday() == Weekday::Sun {
        date.format("ebcsv_sunday_%Y_%m_%d.ppt").to_string()
    } else {
        date.format("TBS_%Y-%m-%d.ppt").to_string()
    }
}

/// File name for a deck built at `now`.
pub fn output_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let local = pacific_time(now.with_timezone(&Utc));
    file_name_for(service_date(local.date()))
}

/// File name for a deck built now, according to `clock`.
pub fn file_name(clock: &dyn Clock) -> String {
    output_file_name(&clock.now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_thursday_names_itself() {
        let clock = FixedClock(at("2026-10-15T19:00:00Z"));
        assert_eq!(file_name(&clock), "TBS_2026-10-15.ppt");
    }

    #[test]
    fn test_sunday_names_itself() {
        let clock = FixedClock(at("2026-10-18T19:00:00Z"));
        assert_eq!(file_name(&clock), "ebcsv_sunday_2026_10_18.ppt");
    }

    #[test]
    fn test_weekday_offsets() {
        // Monday 2026-10-19 through Sunday 2026-10-25
        let expected = [
            "TBS_2026-10-22.ppt",
            "TBS_2026-10-22.ppt",
            "TBS_2026-10-22.ppt",
            "TBS_2026-10-22.ppt",
            "ebcsv_sunday_2026_10_25.ppt",
            "ebcsv_sunday_2026_10_25.ppt",
            "ebcsv_sunday_2026_10_25.ppt",
        ];
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        for (day, name) in expected.iter().enumerate() {
            let date = monday + TimeDelta::days(day as i64);
            assert_eq!(file_name_for(service_date(date)), *name, "{date}");
        }
    }

    #[test]
    fn test_daylight_saving_shifts_the_day() {
        // 00:30 PDT on Friday, still Thursday in standard time
        assert_eq!(
            output_file_name(&at("2026-10-16T07:30:00Z")),
            "ebcsv_sunday_2026_10_18.ppt"
        );
        // 23:30 PST on Thursday
        assert_eq!(
            output_file_name(&at("2026-12-04T07:30:00Z")),
            "TBS_2026-12-03.ppt"
        );
    }

    #[test]
    fn test_daylight_saving_boundaries() {
        let start = pacific_time(at("2026-03-08T10:00:00Z"));
        assert_eq!(start.to_string(), "2026-03-08 03:00:00");
        let before = pacific_time(at("2026-03-08T09:59:00Z"));
        assert_eq!(before.to_string(), "2026-03-08 01:59:00");
        let end = pacific_time(at("2026-11-01T09:00:00Z"));
        assert_eq!(end.to_string(), "2026-11-01 01:00:00");
    }
}
