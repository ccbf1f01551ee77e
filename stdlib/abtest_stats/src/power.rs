//! Effect sizes and statistical power analysis.
//!
//! Power follows the Student's-t model on means: `nobs` observations,
//! `nobs - 1` degrees of freedom, noncentrality `effect * sqrt(nobs)`. It is
//! also what the sample-size solve inverts.

use crate::distributions::{noncentral_t_cdf, noncentral_t_sf, students_t_quantile};
use crate::error::{check_alpha, StatsError};

/// Largest per-group size the solver will bracket before giving up.
pub const MAX_SOLVE_NOBS: u64 = 1 << 40;

fn check_rate(rate: f64) -> Result<(), StatsError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(StatsError::invalid(format!(
            "rate must lie in [0,1], got {rate}"
        )))
    }
}

/// Cohen's h between two proportions: `2 asin(sqrt(p2)) - 2 asin(sqrt(p1))`.
/// Positive when `p2 > p1`.
pub fn cohen_h(p1: f64, p2: f64) -> Result<f64, StatsError> {
    check_rate(p1)?;
    check_rate(p2)?;
    let angle = |p: f64| 2.0 * p.sqrt().asin();
    Ok(angle(p2) - angle(p1))
}

/// Two-sided power of a Student's-t test with `nobs` observations.
///
/// `power = P(T > t_crit) + P(T < -t_crit)`, `T ~ t(nobs - 1, effect * sqrt(nobs))`,
/// `t_crit = t_{1 - alpha/2, nobs - 1}`. Negative effects are allowed and give
/// the same power as their magnitude.
pub fn ttest_power(effect_size: f64, nobs: f64, alpha: f64) -> Result<f64, StatsError> {
    check_alpha(alpha)?;
    if !effect_size.is_finite() {
        return Err(StatsError::invalid(format!(
            "effect size must be finite, got {effect_size}"
        )));
    }
    if nobs.is_nan() || nobs < 2.0 {
        return Err(StatsError::degenerate(format!(
            "power needs at least 2 observations, got {nobs}"
        )));
    }
    let df = nobs - 1.0;
    let ncp = effect_size * nobs.sqrt();
    let crit = students_t_quantile(1.0 - alpha / 2.0, df)?;
    let upper = noncentral_t_sf(crit, df, ncp)?;
    let lower = noncentral_t_cdf(-crit, df, ncp)?;
    Ok((upper + lower).clamp(0.0, 1.0))
}

/// Smallest integer `nobs >= 2` whose [`ttest_power`] reaches `target_power`.
///
/// Brackets by doubling, then bisects on integers. Power is monotone in
/// `nobs` for a fixed positive effect, so the answer is minimal.
pub fn solve_ttest_nobs(
    effect_size: f64,
    alpha: f64,
    target_power: f64,
) -> Result<usize, StatsError> {
    check_alpha(alpha)?;
    if !(effect_size.is_finite() && effect_size > 0.0) {
        return Err(StatsError::degenerate(format!(
            "sample size solve needs a positive effect size, got {effect_size}"
        )));
    }
    if !(target_power > 0.0 && target_power < 1.0) {
        return Err(StatsError::invalid(format!(
            "target power must lie in (0,1), got {target_power}"
        )));
    }

    let reaches = |n: usize| -> Result<bool, StatsError> {
        Ok(ttest_power(effect_size, n as f64, alpha)? >= target_power)
    };

    let mut lo = 2usize;
    if reaches(lo)? {
        return Ok(lo);
    }
    let mut hi = 4usize;
    while !reaches(hi)? {
        lo = hi;
        hi = match hi.checked_mul(2) {
            Some(next) if next as u64 <= MAX_SOLVE_NOBS => next,
            _ => {
                return Err(StatsError::degenerate(format!(
                    "effect size {effect_size} needs more than {MAX_SOLVE_NOBS} observations per group"
                )))
            }
        };
    }
    log::debug!("sample size bracket [{lo}, {hi}] for h={effect_size}, power={target_power}");

    // lo misses the target, hi reaches it
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if reaches(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}
