//! Statistical kernel for two-arm conversion experiments.
//!
//! Everything here is a free function over counts or slices, in the style of
//! a small stats library: proportion tests, Cohen's h, Student's-t power and
//! the chart primitives the dashboard draws with.
//!
//! ```ignore
//! use abtest_stats::{chi_square_2x2, two_proportion_ztest, Proportion};
//! let control = Proportion::new(10, 100)?;
//! let treatment = Proportion::new(12, 100)?;
//! let chi = chi_square_2x2(control, treatment)?;
//! let z = two_proportion_ztest(control, treatment)?;
//! println!("chi2 p={:.4} z p={:.4}", chi.p_value, z.p_value);
//! ```
mod density;
mod distributions;
mod error;
mod power;
mod proportions;
mod viz;

pub use density::*;
pub use distributions::*;
pub use error::*;
pub use power::*;
pub use proportions::*;
pub use viz::*;

/// Arithmetic mean. Empty input yields NaN; callers validate first.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Unbiased sample standard deviation (n-1 denominator)
pub fn stddev_sample(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / ((n as f64) - 1.0);
    var.sqrt()
}
