use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeDelta, TimeZone};

use crate::value::Temporal;

/// `2021-06-15T10:30:00.000+02:00`; UTC renders as `+00:00`, never `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

pub fn format_timestamp(value: &Temporal, naive_offset: Option<FixedOffset>) -> String {
    match value {
        Temporal::Naive(naive) => match naive_offset {
            Some(offset) => render(&anchor(offset, naive)),
            None => render(&anchor(Local, naive)),
        },
        Temporal::Local(dt) => render(dt),
        Temporal::Utc(dt) => render(dt),
        Temporal::Offset(dt) => render(dt),
    }
}

fn render<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Pin a wall-clock time to `tz`. Ambiguous times take the earlier instant;
/// times inside a DST gap move forward by an hour.
fn anchor<Tz: TimeZone>(tz: Tz, naive: &NaiveDateTime) -> DateTime<Tz> {
    if let Some(dt) = tz.from_local_datetime(naive).earliest() {
        return dt;
    }
    naive
        .checked_add_signed(TimeDelta::hours(1))
        .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{LocalResult, NaiveDate, Utc};
    use chrono_tz::America::New_York;

    fn naive() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, 15).unwrap().and_hms_milli_opt(10, 30, 0, 7).unwrap()
    }

    #[test]
    fn offset_values_keep_their_offset() {
        let dt = DateTime::parse_from_rfc3339("2021-06-15T10:30:00+02:00").unwrap();
        assert_eq!(format_timestamp(&Temporal::Offset(dt), None), "2021-06-15T10:30:00.000+02:00");
    }

    #[test]
    fn utc_is_numeric() {
        let dt = Utc.from_utc_datetime(&naive());
        assert_eq!(format_timestamp(&Temporal::Utc(dt), None), "2021-06-15T10:30:00.007+00:00");
    }

    #[test]
    fn naive_values_use_the_configured_anchor() {
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(format_timestamp(&Temporal::Naive(naive()), Some(offset)), "2021-06-15T10:30:00.007-04:00");
    }

    #[test]
    fn naive_values_default_to_local() {
        let expected = Local
            .from_local_datetime(&naive())
            .earliest()
            .expect("mid-morning in June exists in every zone");
        assert_eq!(format_timestamp(&Temporal::Naive(naive()), None), render(&expected));
    }

    fn wall_clock(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, month, day).unwrap().and_hms_opt(hour, 30, 0).unwrap()
    }

    #[test]
    fn gap_times_move_forward_an_hour() {
        let dt = anchor(New_York, &wall_clock(3, 14, 2));
        assert_eq!(render(&dt), "2021-03-14T03:30:00.000-04:00");
    }

    #[test]
    fn ambiguous_times_take_the_earlier_instant() {
        let dt = anchor(New_York, &wall_clock(11, 7, 1));
        assert_eq!(render(&dt), "2021-11-07T01:30:00.000-04:00");
    }

    /// A zone where no wall-clock time maps to an instant.
    #[derive(Debug, Clone, Copy)]
    struct Nowhere;

    impl TimeZone for Nowhere {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Nowhere
        }

        fn offset_from_local_date(&self, _local: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::None
        }

        fn offset_from_local_datetime(&self, _local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            LocalResult::None
        }

        fn offset_from_utc_date(&self, _utc: &NaiveDate) -> FixedOffset {
            FixedOffset::east_opt(0).unwrap()
        }

        fn offset_from_utc_datetime(&self, _utc: &NaiveDateTime) -> FixedOffset {
            FixedOffset::east_opt(0).unwrap()
        }
    }

    #[test]
    fn unresolvable_times_fall_back_to_utc_reading() {
        let dt = anchor(Nowhere, &wall_clock(6, 15, 10));
        assert_eq!(render(&dt), "2021-06-15T10:30:00.000+00:00");
    }
}
