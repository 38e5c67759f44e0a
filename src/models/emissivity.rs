//! Net emissivity models and longwave helpers.

use crate::domain::{BruntCoefficients, EmissivityModel};

/// Stefan–Boltzmann constant, W m⁻² K⁻⁴.
pub const STEFAN_BOLTZMANN: f64 = 5.670367e-8;

pub fn kelvin(t_celsius: f64) -> f64 {
    t_celsius + 273.15
}

/// Brunt: `a + b * sqrt(e)` with vapor pressure `e` in kPa.
pub fn emissivity_brunt(a: f64, b: f64, vapor_kpa: f64) -> f64 {
    a + b * vapor_kpa.sqrt()
}

/// Idso–Jackson: `-0.02 + 0.261 * exp(-7.77e-4 * T²)` with `T` in °C.
pub fn emissivity_idso(t_celsius: f64) -> f64 {
    -0.02 + 0.261 * (-7.77e-4 * t_celsius * t_celsius).exp()
}

/// Evaluate one model for a sample.
pub fn net_emissivity(
    model: EmissivityModel,
    brunt: BruntCoefficients,
    t_celsius: f64,
    vapor_kpa: f64,
) -> f64 {
    match model {
        EmissivityModel::Brunt => emissivity_brunt(brunt.a, brunt.b, vapor_kpa),
        EmissivityModel::Idso => emissivity_idso(t_celsius),
    }
}

/// Blackbody emission `σ T⁴` at air temperature.
pub fn blackbody(t_celsius: f64) -> f64 {
    STEFAN_BOLTZMANN * kelvin(t_celsius).powi(4)
}

/// Emissivity implied by a measured net longwave balance:
/// `-(lw_in - lw_out) / (σ T⁴)`.
pub fn observed_emissivity(lw_in: f64, lw_out: f64, t_celsius: f64) -> f64 {
    -(lw_in - lw_out) / blackbody(t_celsius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn brunt_matches_formula() {
        assert_relative_eq!(emissivity_brunt(0.34, -0.14, 1.0), 0.2);
        assert_relative_eq!(emissivity_brunt(0.34, -0.14, 0.0), 0.34);
    }

    #[test]
    fn idso_at_zero_celsius() {
        assert_relative_eq!(emissivity_idso(0.0), 0.241);
        // Symmetric in T.
        assert_relative_eq!(emissivity_idso(10.0), emissivity_idso(-10.0));
        assert!(emissivity_idso(20.0) < emissivity_idso(0.0));
    }

    #[test]
    fn observed_emissivity_inverts_model() {
        let t = 15.0;
        let eps = 0.18;
        let lw_out = 390.0;
        let lw_in = lw_out - eps * blackbody(t);
        assert_relative_eq!(observed_emissivity(lw_in, lw_out, t), eps, epsilon = 1e-12);
    }

    #[test]
    fn dispatch_by_model() {
        let brunt = BruntCoefficients::default();
        assert_relative_eq!(net_emissivity(EmissivityModel::Brunt, brunt, 30.0, 1.0), 0.2);
        assert_relative_eq!(net_emissivity(EmissivityModel::Idso, brunt, 0.0, 9.0), 0.241);
    }
}
