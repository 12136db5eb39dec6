//! Solar-event computation.
//!
//! Implements the sun-position equations popularised by the SunCalc
//! library (Julian-day conversion, solar mean anomaly, ecliptic longitude,
//! declination, hour angle) and derives event instants from solar noon
//! plus a per-event sun altitude. Accuracy is on the order of a minute,
//! which matches the scheduler's minute-wide trigger window.

use std::f64::consts::{PI, TAU};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A geocoordinate as configured on a solar schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A named solar event.
///
/// Serde names match the external catalog documents (`"sunrise"`,
/// `"goldenHourEnd"`, …). Events come in rising/setting pairs sharing a sun
/// altitude, plus the two transit events `solarNoon` and `nadir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolarEvent {
    Sunrise,
    Sunset,
    SunriseEnd,
    SunsetStart,
    Dawn,
    Dusk,
    NauticalDawn,
    NauticalDusk,
    NightEnd,
    Night,
    GoldenHourEnd,
    GoldenHour,
    SolarNoon,
    Nadir,
    /// Catch-all for event names this build does not know. Never yields an
    /// instant, so schedules referencing one simply never match.
    #[serde(other)]
    Unknown,
}

impl SolarEvent {
    /// Compute this event's instant for the calendar date of `at` at the
    /// given coordinates.
    ///
    /// Returns `None` when the event does not occur on that date and
    /// latitude (polar day/night leaves the hour angle undefined).
    #[must_use]
    pub fn time_on(self, at: DateTime<Utc>, coordinates: Coordinates) -> Option<DateTime<Utc>> {
        let lw = -coordinates.longitude.to_radians();
        let phi = coordinates.latitude.to_radians();

        let d = to_days(at);
        let n = julian_cycle(d, lw);
        let ds = approx_transit(0.0, lw, n);
        let m = solar_mean_anomaly(ds);
        let l = ecliptic_longitude(m);
        let dec = declination(l);
        let j_noon = solar_transit_j(ds, m, l);

        match self.geometry()? {
            Geometry::Transit { offset } => from_julian(j_noon + offset),
            Geometry::Altitude { degrees, rising } => {
                let w = hour_angle(degrees.to_radians(), phi, dec);
                if w.is_nan() {
                    return None;
                }
                let j_set = solar_transit_j(approx_transit(w, lw, n), m, l);
                if rising {
                    from_julian(j_noon - (j_set - j_noon))
                } else {
                    from_julian(j_set)
                }
            }
        }
    }

    fn geometry(self) -> Option<Geometry> {
        let geometry = match self {
            Self::SolarNoon => Geometry::Transit { offset: 0.0 },
            Self::Nadir => Geometry::Transit { offset: -0.5 },
            Self::Sunrise => Geometry::rising(-0.833),
            Self::Sunset => Geometry::setting(-0.833),
            Self::SunriseEnd => Geometry::rising(-0.3),
            Self::SunsetStart => Geometry::setting(-0.3),
            Self::Dawn => Geometry::rising(-6.0),
            Self::Dusk => Geometry::setting(-6.0),
            Self::NauticalDawn => Geometry::rising(-12.0),
            Self::NauticalDusk => Geometry::setting(-12.0),
            Self::NightEnd => Geometry::rising(-18.0),
            Self::Night => Geometry::setting(-18.0),
            Self::GoldenHourEnd => Geometry::rising(6.0),
            Self::GoldenHour => Geometry::setting(6.0),
            Self::Unknown => return None,
        };
        Some(geometry)
    }
}

enum Geometry {
    /// Solar transit, offset in fractional days from solar noon.
    Transit { offset: f64 },
    /// Sun crossing the given altitude, on the rising or setting side.
    Altitude { degrees: f64, rising: bool },
}

impl Geometry {
    fn rising(degrees: f64) -> Self {
        Self::Altitude {
            degrees,
            rising: true,
        }
    }

    fn setting(degrees: f64) -> Self {
        Self::Altitude {
            degrees,
            rising: false,
        }
    }
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const JULIAN_EPOCH_1970: f64 = 2_440_588.0;
const JULIAN_EPOCH_2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
/// Obliquity of the Earth's axis, radians.
const OBLIQUITY: f64 = 23.4397 * PI / 180.0;

fn to_days(at: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = at.timestamp_millis() as f64;
    millis / MILLIS_PER_DAY - 0.5 + JULIAN_EPOCH_1970 - JULIAN_EPOCH_2000
}

fn from_julian(j: f64) -> Option<DateTime<Utc>> {
    if !j.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = ((j + 0.5 - JULIAN_EPOCH_1970) * MILLIS_PER_DAY).round() as i64;
    Utc.timestamp_millis_opt(millis).single()
}

fn solar_mean_anomaly(d: f64) -> f64 {
    (357.5291 + 0.985_600_28 * d).to_radians()
}

fn ecliptic_longitude(m: f64) -> f64 {
    // Equation of center plus the perihelion of the Earth.
    let c = (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin()).to_radians();
    let p = 102.9372_f64.to_radians();
    m + c + p + PI
}

fn declination(l: f64) -> f64 {
    (OBLIQUITY.sin() * l.sin()).asin()
}

fn julian_cycle(d: f64, lw: f64) -> f64 {
    (d - J0 - lw / TAU).round()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / TAU + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    JULIAN_EPOCH_2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

/// NaN when the sun never crosses altitude `h` on this date/latitude.
fn hour_angle(h: f64, phi: f64, dec: f64) -> f64 {
    ((h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values from the SunCalc test suite: 2013-03-05 UTC at
    // 50.5 N, 30.5 E.
    const COORDS: Coordinates = Coordinates {
        latitude: 50.5,
        longitude: 30.5,
    };

    fn reference_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 3, 5, 0, 0, 0).unwrap()
    }

    fn assert_close(event: SolarEvent, expected_rfc3339: &str) {
        let expected = DateTime::parse_from_rfc3339(expected_rfc3339)
            .unwrap()
            .with_timezone(&Utc);
        let actual = event.time_on(reference_date(), COORDS).unwrap();
        let delta = (actual - expected).num_seconds().abs();
        assert!(
            delta <= 60,
            "{event:?}: expected {expected}, got {actual} ({delta}s off)"
        );
    }

    #[test]
    fn should_match_reference_transit_times() {
        assert_close(SolarEvent::SolarNoon, "2013-03-05T10:10:57Z");
        assert_close(SolarEvent::Nadir, "2013-03-04T22:10:57Z");
    }

    #[test]
    fn should_match_reference_sunrise_and_sunset() {
        assert_close(SolarEvent::Sunrise, "2013-03-05T04:34:56Z");
        assert_close(SolarEvent::Sunset, "2013-03-05T15:46:57Z");
    }

    #[test]
    fn should_match_reference_twilight_times() {
        assert_close(SolarEvent::Dawn, "2013-03-05T04:02:17Z");
        assert_close(SolarEvent::Dusk, "2013-03-05T16:19:36Z");
        assert_close(SolarEvent::NauticalDawn, "2013-03-05T03:24:31Z");
        assert_close(SolarEvent::NauticalDusk, "2013-03-05T16:57:22Z");
        assert_close(SolarEvent::NightEnd, "2013-03-05T02:46:17Z");
        assert_close(SolarEvent::Night, "2013-03-05T17:35:36Z");
    }

    #[test]
    fn should_match_reference_golden_hour_times() {
        assert_close(SolarEvent::GoldenHourEnd, "2013-03-05T05:19:01Z");
        assert_close(SolarEvent::GoldenHour, "2013-03-05T15:02:52Z");
    }

    #[test]
    fn should_order_events_around_solar_noon() {
        let at = reference_date();
        let dawn = SolarEvent::Dawn.time_on(at, COORDS).unwrap();
        let sunrise = SolarEvent::Sunrise.time_on(at, COORDS).unwrap();
        let noon = SolarEvent::SolarNoon.time_on(at, COORDS).unwrap();
        let sunset = SolarEvent::Sunset.time_on(at, COORDS).unwrap();
        let dusk = SolarEvent::Dusk.time_on(at, COORDS).unwrap();
        assert!(dawn < sunrise);
        assert!(sunrise < noon);
        assert!(noon < sunset);
        assert!(sunset < dusk);
    }

    #[test]
    fn should_return_none_during_polar_night() {
        // Longyearbyen in December: the sun never rises.
        let at = Utc.with_ymd_and_hms(2020, 12, 21, 12, 0, 0).unwrap();
        let svalbard = Coordinates {
            latitude: 78.22,
            longitude: 15.63,
        };
        assert_eq!(SolarEvent::Sunrise.time_on(at, svalbard), None);
        assert_eq!(SolarEvent::Sunset.time_on(at, svalbard), None);
        // Transit events still exist.
        assert!(SolarEvent::SolarNoon.time_on(at, svalbard).is_some());
    }

    #[test]
    fn should_deserialize_event_names_from_catalog_shape() {
        let event: SolarEvent = serde_json::from_str("\"sunrise\"").unwrap();
        assert_eq!(event, SolarEvent::Sunrise);
        let event: SolarEvent = serde_json::from_str("\"goldenHourEnd\"").unwrap();
        assert_eq!(event, SolarEvent::GoldenHourEnd);
        let event: SolarEvent = serde_json::from_str("\"nauticalDawn\"").unwrap();
        assert_eq!(event, SolarEvent::NauticalDawn);
    }

    #[test]
    fn should_tolerate_unknown_event_names_without_ever_matching() {
        // Configuration drift: an event name from a newer catalog version.
        let event: SolarEvent = serde_json::from_str("\"blueHour\"").unwrap();
        assert_eq!(event, SolarEvent::Unknown);
        assert_eq!(event.time_on(reference_date(), COORDS), None);
    }
}
