//! Goodness-of-fit between simulated and observed series.
//!
//! All functions take equally long `observed` / `simulated` slices that are
//! already restricted to complete cases.

/// Summary of a simulated-vs-observed comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub n: usize,
    /// Mean of `simulated - observed`.
    pub bias: f64,
    pub rmse: f64,
    pub nse: f64,
    pub kge: f64,
    /// Percent bias, positive = overestimation.
    pub pbias: f64,
}

impl FitMetrics {
    pub fn compute(observed: &[f64], simulated: &[f64]) -> FitMetrics {
        let n = observed.len().min(simulated.len());
        let (observed, simulated) = (&observed[..n], &simulated[..n]);
        FitMetrics {
            n,
            bias: bias(observed, simulated),
            rmse: rmse(observed, simulated),
            nse: nse(observed, simulated),
            kge: kge(observed, simulated),
            pbias: pbias(observed, simulated),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn bias(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    mean(simulated) - mean(observed)
}

/// Root Mean Square Error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    let sse: f64 = observed.iter().zip(simulated).map(|(o, s)| (o - s).powi(2)).sum();
    (sse / observed.len() as f64).sqrt()
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn nse(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    let mean_obs = mean(observed);
    let sse: f64 = observed.iter().zip(simulated).map(|(o, s)| (o - s).powi(2)).sum();
    let spread: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if spread == 0.0 {
        return f64::NEG_INFINITY;
    }
    1.0 - sse / spread
}

/// Kling-Gupta Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn kge(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    let n = observed.len() as f64;
    let (mo, ms) = (mean(observed), mean(simulated));
    let so = (observed.iter().map(|o| (o - mo).powi(2)).sum::<f64>() / n).sqrt();
    let ss = (simulated.iter().map(|s| (s - ms).powi(2)).sum::<f64>() / n).sqrt();

    let r = if so == 0.0 || ss == 0.0 {
        0.0
    } else {
        observed
            .iter()
            .zip(simulated)
            .map(|(o, s)| (o - mo) * (s - ms))
            .sum::<f64>()
            / (n * so * ss)
    };
    let alpha = if so == 0.0 { 0.0 } else { ss / so };
    let beta = if mo == 0.0 { 0.0 } else { ms / mo };

    1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt()
}

pub fn pbias(observed: &[f64], simulated: &[f64]) -> f64 {
    let total: f64 = observed.iter().sum();
    if total == 0.0 {
        return f64::INFINITY;
    }
    let diff: f64 = simulated.iter().zip(observed).map(|(s, o)| s - o).sum();
    100.0 * diff / total
}
