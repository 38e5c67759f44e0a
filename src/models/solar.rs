//! Astronomical sunrise and sunset.
//!
//! FAO-56 style approximations: solar declination from day of year, sunset
//! hour angle from latitude, and an equation-of-time correction for the
//! longitude-dependent solar noon. Accuracy is a few minutes, which is ample
//! for splitting hourly data into day and night.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::domain::SiteLocation;

/// Solar declination (rad) for day of year `doy` (1..=366).
pub fn solar_declination(doy: u32) -> f64 {
    0.409 * (2.0 * PI / 365.0 * doy as f64 - 1.39).sin()
}

/// Equation of time (hours) for day of year `doy`.
pub fn equation_of_time(doy: u32) -> f64 {
    let b = 2.0 * PI * (doy as f64 - 81.0) / 364.0;
    0.1645 * (2.0 * b).sin() - 0.1255 * b.cos() - 0.025 * b.sin()
}

/// Sunset hour angle (rad), clamped so polar night gives 0 and polar day π.
pub fn sunset_hour_angle(latitude_deg: f64, doy: u32) -> f64 {
    let phi = latitude_deg.to_radians();
    let delta = solar_declination(doy);
    (-phi.tan() * delta.tan()).clamp(-1.0, 1.0).acos()
}

/// Sunrise and sunset in local clock hours (may fall outside 0..24 near the date line).
pub fn sun_times(site: &SiteLocation, doy: u32) -> (f64, f64) {
    let noon = 12.0 - site.longitude / 15.0 - equation_of_time(doy) + site.utc_offset_hours;
    let half_day = sunset_hour_angle(site.latitude, doy) * 12.0 / PI;
    (noon - half_day, noon + half_day)
}

/// Whether the sun is above the horizon at local clock time `t`.
pub fn is_daytime(site: &SiteLocation, t: NaiveDateTime) -> bool {
    let (sunrise, sunset) = sun_times(site, t.ordinal());
    let clock = t.hour() as f64 + t.minute() as f64 / 60.0 + t.second() as f64 / 3600.0;
    clock > sunrise && clock < sunset
}
