//! Gaussian kernel density estimate for plotting.

use crate::stddev_sample;

/// Evaluate a Gaussian KDE of `xs` on `gridsize` evenly spaced points.
///
/// Bandwidth follows Scott's rule, `sd * n^(-1/5)`; the grid covers the data
/// range extended by `cut` bandwidths on each side. Returns `(x, density)`
/// pairs, or nothing when the data has fewer than two points or no spread.
pub fn gaussian_kde(xs: &[f64], gridsize: usize, cut: f64) -> Vec<(f64, f64)> {
    let n = xs.len();
    if n < 2 || gridsize == 0 {
        return Vec::new();
    }
    let sd = stddev_sample(xs);
    if !(sd.is_finite() && sd > 0.0) {
        return Vec::new();
    }
    let bw = sd * (n as f64).powf(-0.2);

    // Collapse repeated values; outcome samples only have two distinct ones.
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut support: Vec<(f64, f64)> = Vec::new();
    for x in sorted {
        match support.last_mut() {
            Some((v, w)) if *v == x => *w += 1.0,
            _ => support.push((x, 1.0)),
        }
    }

    let lo = support[0].0 - cut * bw;
    let hi = support[support.len() - 1].0 + cut * bw;
    let step = if gridsize > 1 {
        (hi - lo) / (gridsize - 1) as f64
    } else {
        0.0
    };
    let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());

    (0..gridsize)
        .map(|i| {
            let x = lo + step * i as f64;
            let density = support
                .iter()
                .map(|&(v, w)| {
                    let z = (x - v) / bw;
                    w * (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect()
}
