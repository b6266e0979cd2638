//! Extraterrestrial irradiance and solar zenith angle.
//!
//! Local clock time is shifted to apparent solar time using the equation of
//! time and the offset between the site longitude and its standard meridian.
//! Day-angle series follow Iqbal (1983) as presented in Duffie & Beckman.

use crate::constants::{NIGHT_ZENITH_DEGREES, SOLAR_CONSTANT};
use crate::errors::{Rest2Error, Rest2Result};
use crate::timeseries::{FloatValue, Time};
use chrono::{Datelike, Timelike};
use chrono_tz::Tz;
use ndarray::Array1;
use std::f64::consts::PI;

/// Solar geometry for a location over a sequence of timestamps.
#[derive(Debug, Clone)]
pub struct SolarGeometry {
    /// Extraterrestrial irradiance on a horizontal plane (W/m²). Negative at night.
    pub extraterrestrial_irradiance: Array1<FloatValue>,
    /// Zenith angle (radians), unclamped: values beyond π/2 are below the horizon.
    pub zenith_angle: Array1<FloatValue>,
}

/// Apparent solar clock reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentSolarTime {
    /// Fractional hour, 12.0 at solar noon
    pub hour: f64,
    pub minute: f64,
}

/// Day angle B (radians) for a 1-based day of the year.
pub fn day_angle(day_of_year: u32) -> f64 {
    2.0 * PI * (day_of_year as f64 - 1.0) / 365.0
}

/// Equation of time (minutes).
pub fn equation_of_time(b: f64) -> f64 {
    229.18
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.04089 * (2.0 * b).sin())
}

/// Earth-Sun distance correction factor (dimensionless).
pub fn earth_sun_distance_factor(b: f64) -> f64 {
    1.000110 + 0.034221 * b.cos() + 0.001280 * b.sin() + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin()
}

/// Solar declination (radians).
pub fn declination(b: f64) -> f64 {
    0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin() - 0.006758 * (2.0 * b).cos()
        + 0.000907 * (2.0 * b).sin()
        - 0.002697 * (3.0 * b).cos()
        + 0.00148 * (3.0 * b).sin()
}

/// Longitude measured westward in [0, 360) and its nearest standard meridian.
///
/// Returns `(psi, psi_std)` in degrees. Rounding is half-to-even.
pub fn standard_meridian(longitude: f64) -> (f64, f64) {
    let psi = if longitude > 0.0 {
        360.0 - longitude
    } else {
        -longitude
    };
    let psi_std = (15.0 * (psi / 15.0).round_ties_even()).abs();
    (psi, psi_std)
}

/// Shift a local clock reading by `correction` minutes.
///
/// Wraparound is resolved in two ordered passes: a negative hour first wraps
/// to the previous day (+24 h), then a remaining negative minute borrows 60.
pub fn apparent_solar_time(
    local_hour: f64,
    local_minute: f64,
    correction: f64,
) -> ApparentSolarTime {
    let shifted_minutes = local_minute + correction;
    let mut minute = shifted_minutes;
    let mut hour = local_hour + shifted_minutes / 60.0;

    if hour < 0.0 {
        hour = 24.0 + shifted_minutes / 60.0;
        minute += 60.0;
    }
    if hour >= 0.0 && minute < 0.0 {
        minute += 60.0;
        hour = local_hour + shifted_minutes / 60.0;
    }

    ApparentSolarTime { hour, minute }
}

/// Hour angle (radians), zero at solar noon and 15° per hour.
pub fn hour_angle(apparent_hour: f64) -> f64 {
    ((apparent_hour - 12.0) * 15.0).to_radians()
}

/// Zenith angle (radians) from latitude, declination and hour angle (all radians).
pub fn zenith_angle(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let cos_zenith = latitude.cos() * declination.cos() * hour_angle.cos()
        + latitude.sin() * declination.sin();
    cos_zenith.clamp(-1.0, 1.0).acos()
}

/// Parse an IANA timezone name such as `America/Sao_Paulo`.
pub fn parse_timezone(name: &str) -> Rest2Result<Tz> {
    name.parse::<Tz>().map_err(|_| Rest2Error::UnknownTimezone(name.to_string()))
}

impl SolarGeometry {
    /// Compute geometry for UTC `times` at a site, reading clock time in `timezone`.
    pub fn compute(times: &[Time], latitude: f64, longitude: f64, timezone: Tz) -> Self {
        let phi = latitude.to_radians();
        let (psi, psi_std) = standard_meridian(longitude);
        let meridian_correction = 4.0 * (psi_std - psi);

        let mut extraterrestrial_irradiance = Array1::zeros(times.len());
        let mut zenith = Array1::zeros(times.len());

        for (i, utc) in times.iter().enumerate() {
            let local = utc.with_timezone(&timezone);
            let b = day_angle(local.ordinal());

            let correction = meridian_correction + equation_of_time(b);
            let apparent =
                apparent_solar_time(local.hour() as f64, local.minute() as f64, correction);

            let z = zenith_angle(phi, declination(b), hour_angle(apparent.hour));
            zenith[i] = z;
            extraterrestrial_irradiance[i] =
                SOLAR_CONSTANT * earth_sun_distance_factor(b) * z.cos();
        }

        Self {
            extraterrestrial_irradiance,
            zenith_angle: zenith,
        }
    }

    pub fn len(&self) -> usize {
        self.zenith_angle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zenith_angle.is_empty()
    }

    /// Timesteps with the sun below the horizon
    pub fn is_night(&self) -> Array1<bool> {
        self.zenith_angle.mapv(|z| z.to_degrees() > NIGHT_ZENITH_DEGREES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_TIMEZONE;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn standard_meridian_west_of_greenwich() {
        let (psi, psi_std) = standard_meridian(-45.5);
        assert_eq!(psi, 45.5);
        assert_eq!(psi_std, 45.0);
    }

    #[test]
    fn standard_meridian_east_of_greenwich() {
        let (psi, psi_std) = standard_meridian(10.0);
        assert_eq!(psi, 350.0);
        assert_eq!(psi_std, 345.0);
    }

    #[test]
    fn standard_meridian_rounds_half_to_even() {
        // 37.5 / 15 = 2.5 rounds to 2
        let (_, psi_std) = standard_meridian(-37.5);
        assert_eq!(psi_std, 30.0);
        // 52.5 / 15 = 3.5 rounds to 4
        let (_, psi_std) = standard_meridian(-52.5);
        assert_eq!(psi_std, 60.0);
    }

    #[test]
    fn declination_near_solstices() {
        // 21 June and 21 December
        assert_relative_eq!(declination(day_angle(172)).to_degrees(), 23.45, epsilon = 0.3);
        assert_relative_eq!(declination(day_angle(355)).to_degrees(), -23.45, epsilon = 0.3);
    }

    #[test]
    fn distance_factor_is_largest_in_january() {
        assert!(earth_sun_distance_factor(day_angle(3)) > 1.03);
        assert!(earth_sun_distance_factor(day_angle(185)) < 0.97);
    }

    #[test]
    fn apparent_time_without_wraparound() {
        let t = apparent_solar_time(10.0, 30.0, -12.0);
        assert_relative_eq!(t.hour, 10.0 + 18.0 / 60.0, epsilon = 1e-12);
        assert_relative_eq!(t.minute, 18.0, epsilon = 1e-12);
    }

    #[test]
    fn apparent_time_wraps_to_previous_day() {
        let t = apparent_solar_time(0.0, 5.0, -15.0);
        assert_relative_eq!(t.hour, 24.0 - 10.0 / 60.0, epsilon = 1e-12);
        assert_relative_eq!(t.minute, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn apparent_time_borrows_minutes() {
        let t = apparent_solar_time(9.0, 5.0, -15.0);
        assert_relative_eq!(t.hour, 9.0 - 10.0 / 60.0, epsilon = 1e-12);
        assert_relative_eq!(t.minute, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn hour_angle_is_zero_at_noon() {
        assert_eq!(hour_angle(12.0), 0.0);
        assert_relative_eq!(hour_angle(18.0), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn zenith_at_subsolar_point_is_zero() {
        let decl = 0.3;
        assert_relative_eq!(zenith_angle(decl, decl, 0.0), 0.0, epsilon = 1e-7);
    }

    #[test]
    fn timezone_names() {
        assert_eq!(parse_timezone("America/Sao_Paulo").unwrap(), DEFAULT_TIMEZONE);
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(Rest2Error::UnknownTimezone(_))
        ));
    }

    #[test]
    fn summer_day_in_sao_paulo_region() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let times = (0..24)
            .map(|h| start + Duration::hours(h))
            .collect::<Vec<_>>();

        let geometry = SolarGeometry::compute(&times, -22.5, -45.5, DEFAULT_TIMEZONE);

        // 03:00 UTC is local midnight (UTC-3): the sun is well below the horizon
        assert!(geometry.zenith_angle[3].to_degrees() > 90.0);
        assert!(geometry.extraterrestrial_irradiance[3] < 0.0);

        // 15:00 UTC is local noon: near-overhead sun in January at 22.5°S
        let noon = geometry.zenith_angle[15].to_degrees();
        assert!(noon < 15.0, "noon zenith {noon}");
        assert!(geometry.extraterrestrial_irradiance[15] > 1300.0);

        let night_hours = geometry.is_night().iter().filter(|n| **n).count();
        assert!((8..=12).contains(&night_hours), "night hours {night_hours}");
    }
}
