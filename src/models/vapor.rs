//! Water-vapor pressure.

/// Actual vapor pressure (hPa) from air temperature (°C) and relative humidity (%),
/// Magnus form: `6.11 * 10^(7.5 T / (237.3 + T)) * RH / 100`.
pub fn vapor_pressure_magnus(t_celsius: f64, rh_percent: f64) -> f64 {
    6.11 * 10f64.powf(7.5 * t_celsius / (237.3 + t_celsius)) * rh_percent / 100.0
}

pub fn hpa_to_kpa(hpa: f64) -> f64 {
    hpa / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn saturation_at_zero_and_twenty() {
        assert_relative_eq!(vapor_pressure_magnus(0.0, 100.0), 6.11);
        // ~23.4 hPa at 20 °C saturation.
        let e20 = vapor_pressure_magnus(20.0, 100.0);
        assert!((e20 - 23.37).abs() < 0.05, "got {e20}");
        assert_relative_eq!(vapor_pressure_magnus(20.0, 50.0), e20 / 2.0);
    }

    #[test]
    fn unit_conversion() {
        assert_relative_eq!(hpa_to_kpa(12.5), 1.25);
    }
}
