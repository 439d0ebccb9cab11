//! Julian dates for the low-precision ephemeris.

use chrono::{DateTime, Utc};

const DAY_MS: f64 = 1000. * 60. * 60. * 24.;

/// Julian date of the Unix epoch.
pub const J1970: f64 = 2_440_588.;

/// Julian date of the J2000.0 epoch.
pub const J2000: f64 = 2_451_545.;

pub fn to_julian(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

/// Converts back to an instant, rounded to whole milliseconds.
///
/// Non-finite dates (the sun never reaches the requested altitude) give `None`.
pub fn from_julian(j: f64) -> Option<DateTime<Utc>> {
    let ms = (j + 0.5 - J1970) * DAY_MS;
    if !ms.is_finite() || ms.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(ms.round() as i64)
}

/// Days since J2000.0.
pub fn to_days(t: DateTime<Utc>) -> f64 {
    to_julian(t) - J2000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epochs() {
        let unix = Utc.timestamp_millis_opt(0).unwrap();
        assert_eq!(to_julian(unix), J1970 - 0.5);
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(to_days(j2000), 0.);
    }

    #[test]
    fn test_round_trip() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 15, 30, 12).unwrap();
        assert_eq!(from_julian(to_julian(t)), Some(t));
    }

    #[test]
    fn test_nan_has_no_date() {
        assert!(from_julian(f64::NAN).is_none());
        assert!(from_julian(f64::INFINITY).is_none());
    }
}
