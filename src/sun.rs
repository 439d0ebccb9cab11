//! Sun position and daily sun events.
//!
//! Low-precision ephemeris (accurate to a fraction of a degree) following the
//! widely used SunCalc formulas, which are based on
//! <https://aa.quae.nl/en/reken/zonpositie.html>.
//!
//! Conventions:
//! - Angles are in radians.
//! - Altitude is the angle above the horizon (negative at night).
//! - Azimuth is 0 toward south and grows toward west (`pi/2` = west, `-pi/2` = east).

pub mod julian;

use crate::Vector;
use chrono::{DateTime, Utc};
use julian::{J2000, from_julian, to_days};
use serde::Serialize;
use std::f64::consts::PI;

const RAD: f64 = PI / 180.;

/// Obliquity of the Earth.
const OBLIQUITY: f64 = RAD * 23.4397;

/// Julian day fraction correction for the solar transit.
const J0: f64 = 0.0009;

/// Altitude (degrees) for each pair of morning/evening events.
const SUNRISE_ALT: f64 = -0.833;
const SUNRISE_END_ALT: f64 = -0.3;
const CIVIL_ALT: f64 = -6.;
const NAUTICAL_ALT: f64 = -12.;
const ASTRONOMICAL_ALT: f64 = -18.;
const GOLDEN_HOUR_ALT: f64 = 6.;

/// Position of the sun in the sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    /// Radians above the horizon.
    pub altitude: f64,
    /// Radians from south, positive toward west.
    pub azimuth: f64,
}

impl SunPosition {
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.
    }

    /// Unit vector from the ground toward the sun.
    pub fn direction(&self) -> Vector {
        sun_direction(self.altitude, self.azimuth)
    }
}

/// Sun events of one day.
///
/// Rise/set pairs are `None` when the sun does not cross that altitude on
/// that day (polar day or polar night).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTimes {
    pub solar_noon: Option<DateTime<Utc>>,
    pub nadir: Option<DateTime<Utc>>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub sunrise_end: Option<DateTime<Utc>>,
    pub sunset_start: Option<DateTime<Utc>>,
    pub dawn: Option<DateTime<Utc>>,
    pub dusk: Option<DateTime<Utc>>,
    pub nautical_dawn: Option<DateTime<Utc>>,
    pub nautical_dusk: Option<DateTime<Utc>>,
    pub night_end: Option<DateTime<Utc>>,
    pub night: Option<DateTime<Utc>>,
    pub golden_hour_end: Option<DateTime<Utc>>,
    pub golden_hour: Option<DateTime<Utc>>,
}

fn right_ascension(l: f64, b: f64) -> f64 {
    (l.sin() * OBLIQUITY.cos() - b.tan() * OBLIQUITY.sin()).atan2(l.cos())
}

fn declination(l: f64, b: f64) -> f64 {
    (b.sin() * OBLIQUITY.cos() + b.cos() * OBLIQUITY.sin() * l.sin()).asin()
}

fn azimuth(h: f64, phi: f64, dec: f64) -> f64 {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

fn altitude(h: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.9856235 * d) - lw
}

fn solar_mean_anomaly(d: f64) -> f64 {
    RAD * (357.5291 + 0.98560028 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    let center = RAD * (1.9148 * m.sin() + 0.02 * (2. * m).sin() + 0.0003 * (3. * m).sin());
    let perihelion = RAD * 102.9372;
    m + center + perihelion + PI
}

/// Declination and right ascension of the sun `d` days after J2000.0.
fn sun_coords(d: f64) -> (f64, f64) {
    let m = solar_mean_anomaly(d);
    let l = ecliptic_longitude(m);
    (declination(l, 0.), right_ascension(l, 0.))
}

/// Sun altitude and azimuth at instant `t` for an observer at `lat`, `lon` (degrees).
pub fn sun_position(t: DateTime<Utc>, lat: f64, lon: f64) -> SunPosition {
    let lw = RAD * -lon;
    let phi = RAD * lat;
    let d = to_days(t);
    let (dec, ra) = sun_coords(d);
    let h = sidereal_time(d, lw) - ra;

    SunPosition {
        altitude: altitude(h, phi, dec),
        azimuth: azimuth(h, phi, dec),
    }
}

/// Unit vector in the planar frame pointing from the ground toward the sun.
///
/// ```text
/// x = cos(altitude) * sin(azimuth)
/// y = sin(altitude)
/// z = cos(altitude) * cos(azimuth)
/// ```
pub fn sun_direction(altitude: f64, azimuth: f64) -> Vector {
    Vector::new(
        altitude.cos() * azimuth.sin(),
        altitude.sin(),
        altitude.cos() * azimuth.cos(),
    )
}

fn julian_cycle(d: f64, lw: f64) -> f64 {
    (d - J0 - lw / (2. * PI)).round()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2. * PI) + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2. * l).sin()
}

/// NaN when the sun never reaches altitude `h`.
fn hour_angle(h: f64, phi: f64, dec: f64) -> f64 {
    ((h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())).acos()
}

/// Horizon dip (degrees) for an observer `height` meters above the ground.
fn observer_angle(height: f64) -> f64 {
    -2.076 * height.max(0.).sqrt() / 60.
}

/// Sun events for the day around instant `t` at ground level.
pub fn day_times(t: DateTime<Utc>, lat: f64, lon: f64) -> DayTimes {
    day_times_at_height(t, lat, lon, 0.)
}

/// Sun events for an observer `height` meters above the ground.
pub fn day_times_at_height(t: DateTime<Utc>, lat: f64, lon: f64, height: f64) -> DayTimes {
    let lw = RAD * -lon;
    let phi = RAD * lat;
    let dh = observer_angle(height);

    let d = to_days(t);
    let n = julian_cycle(d, lw);
    let ds = approx_transit(0., lw, n);

    let m = solar_mean_anomaly(ds);
    let l = ecliptic_longitude(m);
    let dec = declination(l, 0.);

    let j_noon = solar_transit_j(ds, m, l);

    // Returns (rise, set) for the given altitude in degrees
    let rise_set = |alt_deg: f64| {
        let h0 = (alt_deg + dh) * RAD;
        let w = hour_angle(h0, phi, dec);
        let a = approx_transit(w, lw, n);
        let j_set = solar_transit_j(a, m, l);
        let j_rise = j_noon - (j_set - j_noon);
        (from_julian(j_rise), from_julian(j_set))
    };

    let (sunrise, sunset) = rise_set(SUNRISE_ALT);
    let (sunrise_end, sunset_start) = rise_set(SUNRISE_END_ALT);
    let (dawn, dusk) = rise_set(CIVIL_ALT);
    let (nautical_dawn, nautical_dusk) = rise_set(NAUTICAL_ALT);
    let (night_end, night) = rise_set(ASTRONOMICAL_ALT);
    let (golden_hour_end, golden_hour) = rise_set(GOLDEN_HOUR_ALT);

    DayTimes {
        solar_noon: from_julian(j_noon),
        nadir: from_julian(j_noon - 0.5),
        sunrise,
        sunset,
        sunrise_end,
        sunset_start,
        dawn,
        dusk,
        nautical_dawn,
        nautical_dusk,
        night_end,
        night,
        golden_hour_end,
        golden_hour,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn assert_near(actual: Option<DateTime<Utc>>, expected: &str) {
        let actual = actual.unwrap_or_else(|| panic!("missing event, expected {expected}"));
        let diff = (actual - utc(expected)).num_milliseconds().abs();
        assert!(diff <= 1000, "{actual} differs from {expected} by {diff} ms");
    }

    #[test]
    fn test_sun_position_reference() {
        // Kyiv, 2013-03-05 00:00 UTC
        let t = Utc.with_ymd_and_hms(2013, 3, 5, 0, 0, 0).unwrap();
        let pos = sun_position(t, 50.5, 30.5);
        assert_relative_eq!(pos.azimuth, -2.5003175907168385, epsilon = 1e-9);
        assert_relative_eq!(pos.altitude, -0.7000406838781611, epsilon = 1e-9);
        assert!(!pos.is_above_horizon());
    }

    #[test]
    fn test_day_times_reference() {
        let t = Utc.with_ymd_and_hms(2013, 3, 5, 0, 0, 0).unwrap();
        let times = day_times(t, 50.5, 30.5);
        assert_near(times.solar_noon, "2013-03-05T10:10:57Z");
        assert_near(times.nadir, "2013-03-04T22:10:57Z");
        assert_near(times.sunrise, "2013-03-05T04:34:56Z");
        assert_near(times.sunset, "2013-03-05T15:46:57Z");
        assert_near(times.sunrise_end, "2013-03-05T04:38:19Z");
        assert_near(times.sunset_start, "2013-03-05T15:43:34Z");
        assert_near(times.dawn, "2013-03-05T04:02:17Z");
        assert_near(times.dusk, "2013-03-05T16:19:36Z");
        assert_near(times.nautical_dawn, "2013-03-05T03:24:31Z");
        assert_near(times.nautical_dusk, "2013-03-05T16:57:22Z");
        assert_near(times.night_end, "2013-03-05T02:46:17Z");
        assert_near(times.night, "2013-03-05T17:35:36Z");
        assert_near(times.golden_hour_end, "2013-03-05T05:19:01Z");
        assert_near(times.golden_hour, "2013-03-05T15:02:52Z");
    }

    #[test]
    fn test_observer_height_widens_the_day() {
        let t = Utc.with_ymd_and_hms(2013, 3, 5, 0, 0, 0).unwrap();
        let ground = day_times(t, 50.5, 30.5);
        let tower = day_times_at_height(t, 50.5, 30.5, 2000.);
        assert!(tower.sunrise.unwrap() < ground.sunrise.unwrap());
        assert!(tower.sunset.unwrap() > ground.sunset.unwrap());
    }

    #[test]
    fn test_altitude_at_solar_noon_is_the_daily_maximum() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap();
        let (lat, lon) = (48.21, 16.37);
        let noon = day_times(t, lat, lon).solar_noon.unwrap();
        let at_noon = sun_position(noon, lat, lon).altitude;
        for minutes in [-60, -20, 20, 60] {
            let other = sun_position(noon + chrono::Duration::minutes(minutes), lat, lon);
            assert!(other.altitude < at_noon);
        }
        // Summer solstice noon in Vienna: 90 - 48.21 + 23.44
        assert_relative_eq!(at_noon.to_degrees(), 65.23, epsilon = 0.2);
        // Due south at noon
        assert_relative_eq!(sun_position(noon, lat, lon).azimuth, 0., epsilon = 0.01);
    }

    #[test]
    fn test_afternoon_sun_is_west() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 16, 0, 0).unwrap();
        let pos = sun_position(t, 48.21, 16.37);
        assert!(pos.is_above_horizon());
        assert!(pos.azimuth > 0.);
    }

    #[test]
    fn test_polar_night_and_day() {
        let winter = Utc.with_ymd_and_hms(2024, 12, 21, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        // Longyearbyen, Svalbard
        let (lat, lon) = (78.22, 15.65);

        let night = day_times(winter, lat, lon);
        assert!(night.sunrise.is_none());
        assert!(night.sunset.is_none());
        assert!(night.solar_noon.is_some());
        assert!(!sun_position(winter, lat, lon).is_above_horizon());

        let day = day_times(summer, lat, lon);
        assert!(day.sunrise.is_none());
        assert!(day.sunset.is_none());
        assert!(sun_position(summer, lat, lon).is_above_horizon());
    }

    #[test]
    fn test_direction() {
        let zenith = sun_direction(PI / 2., 0.);
        assert!(zenith.is_close(&Vector::new(0., 1., 0.)));

        // Sun at 45 degrees in the south: +z is south
        let south = sun_direction(PI / 4., 0.);
        assert_relative_eq!(south.dx, 0.);
        assert_relative_eq!(south.dy, (PI / 4.).sin());
        assert_relative_eq!(south.dz, (PI / 4.).cos());

        let north = sun_direction(PI / 4., PI);
        assert!(north.dz < 0.);

        for (alt, az) in [(0.3, 1.2), (-0.4, -2.0), (1.1, 3.0)] {
            assert_relative_eq!(sun_direction(alt, az).length(), 1., epsilon = 1e-12);
        }
    }
}
