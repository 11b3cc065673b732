//! Gaussian kernel density estimate used for the histogram overlay.

use std::f64::consts::PI;

/// Scott's rule bandwidth: `σ · n^(-1/5)` with the sample standard deviation.
///
/// Returns `None` when fewer than two samples exist or all samples are equal,
/// in which case no density curve is drawn.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = var.sqrt();
    if std <= f64::EPSILON {
        return None;
    }
    Some(std * (n as f64).powf(-0.2))
}

/// Evaluate the density of `values` at `points` evenly spaced sample
/// positions covering `[lo, hi]`.
///
/// `scale` multiplies the probability density, e.g. `n · bin_width` to lay
/// the curve over a count histogram.
pub fn density_curve(
    values: &[f64],
    lo: f64,
    hi: f64,
    points: usize,
    scale: f64,
) -> Option<Vec<[f64; 2]>> {
    let bw = scott_bandwidth(values)?;
    if points < 2 || hi <= lo {
        return None;
    }

    let norm = 1.0 / (values.len() as f64 * bw * (2.0 * PI).sqrt());
    let step = (hi - lo) / (points - 1) as f64;
    let curve = (0..points)
        .map(|i| {
            let x = lo + i as f64 * step;
            let sum: f64 = values
                .iter()
                .map(|&xi| {
                    let u = (x - xi) / bw;
                    (-0.5 * u * u).exp()
                })
                .sum();
            [x, sum * norm * scale]
        })
        .collect();
    Some(curve)
}
