//! Conversions into the `MicroTime` and `MicroTimestamp` logical encodings.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Unit of a raw epoch-based timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Millis,
    Micros,
}

impl TimeUnit {
    /// Unit implied by a fractional-seconds precision (digits after the point).
    ///
    /// Columns with up to 3 digits, including none, carry milliseconds; wider
    /// ones microseconds. Raw values in whole seconds must ask for
    /// [`TimeUnit::Seconds`] explicitly.
    pub fn from_precision(precision: u8) -> Self {
        match precision {
            0..=3 => TimeUnit::Millis,
            _ => TimeUnit::Micros,
        }
    }
}

/// Microseconds since midnight. A leap second is folded into the last second.
pub fn micro_time(time: &NaiveTime) -> i64 {
    let micros = i64::from(time.nanosecond().min(999_999_999) / 1_000);
    i64::from(time.num_seconds_from_midnight()) * MICROS_PER_SECOND + micros
}

/// Microseconds since the Unix epoch for a wall-clock timestamp taken as UTC.
pub fn micro_timestamp(ts: &NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_micros()
}

/// Rescales a raw epoch timestamp to microseconds.
///
/// Returns `None` when the result does not fit in an `i64`.
pub fn micro_timestamp_from_epoch(raw: i64, unit: TimeUnit) -> Option<i64> {
    match unit {
        TimeUnit::Seconds => raw.checked_mul(MICROS_PER_SECOND),
        TimeUnit::Millis => raw.checked_mul(1_000),
        TimeUnit::Micros => Some(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_micro_time() {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(micro_time(&midnight), 0);

        let t = NaiveTime::from_hms_micro_opt(13, 45, 30, 123_456).unwrap();
        assert_eq!(micro_time(&t), (13 * 3600 + 45 * 60 + 30) * 1_000_000 + 123_456);
    }

    #[test]
    fn test_micro_time_leap_second() {
        let leap = NaiveTime::from_hms_nano_opt(23, 59, 59, 1_500_000_000).unwrap();
        assert_eq!(micro_time(&leap), 86_399 * 1_000_000 + 999_999);
    }

    #[test]
    fn test_micro_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2018, 8, 22)
            .unwrap()
            .and_hms_micro_opt(10, 3, 26, 500)
            .unwrap();
        assert_eq!(micro_timestamp(&ts), 1_534_932_206_000_500);

        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(micro_timestamp(&epoch), 0);
    }

    #[test]
    fn test_epoch_rescaling() {
        assert_eq!(
            micro_timestamp_from_epoch(1_534_932_206, TimeUnit::Seconds),
            Some(1_534_932_206_000_000)
        );
        assert_eq!(
            micro_timestamp_from_epoch(1_534_932_206_000, TimeUnit::Millis),
            Some(1_534_932_206_000_000)
        );
        assert_eq!(
            micro_timestamp_from_epoch(1_534_931_868_000_000, TimeUnit::Micros),
            Some(1_534_931_868_000_000)
        );
    }

    #[test]
    fn test_epoch_rescaling_overflow_is_reported() {
        assert_eq!(micro_timestamp_from_epoch(i64::MAX / 10, TimeUnit::Seconds), None);
        assert_eq!(micro_timestamp_from_epoch(i64::MAX, TimeUnit::Millis), None);
        assert_eq!(micro_timestamp_from_epoch(i64::MIN, TimeUnit::Millis), None);
        assert_eq!(micro_timestamp_from_epoch(i64::MAX, TimeUnit::Micros), Some(i64::MAX));
    }

    #[test]
    fn test_unit_from_precision() {
        assert_eq!(TimeUnit::from_precision(0), TimeUnit::Millis);
        assert_eq!(TimeUnit::from_precision(3), TimeUnit::Millis);
        assert_eq!(TimeUnit::from_precision(4), TimeUnit::Micros);
        assert_eq!(TimeUnit::from_precision(6), TimeUnit::Micros);
    }

    #[test]
    fn test_datetime_samples_by_precision() {
        // DATETIME(0..=3) columns arrive in milliseconds, wider ones in microseconds.
        let millis = 1_534_932_206_000;
        let micros = 1_534_931_868_000_000;

        for precision in [0, 3] {
            let unit = TimeUnit::from_precision(precision);
            assert_eq!(micro_timestamp_from_epoch(millis, unit), Some(1_534_932_206_000_000));
        }
        let unit = TimeUnit::from_precision(6);
        assert_eq!(micro_timestamp_from_epoch(micros, unit), Some(1_534_931_868_000_000));
    }
}
