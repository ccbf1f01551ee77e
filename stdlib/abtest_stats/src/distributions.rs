//! Distribution functions used by the tests and the power model.
//!
//! Central distributions come from `statrs`; the noncentral t CDF is the
//! AS 243 series (Lenth, 1989) on top of the regularized incomplete beta.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};
use statrs::function::beta::beta_reg;
use statrs::function::gamma::ln_gamma;

use crate::error::StatsError;

const NCT_MAX_ITER: usize = 1000;
const NCT_ERRMAX: f64 = 1e-12;
/// Past this many degrees of freedom the noncentral t is replaced by its
/// normal approximation.
const NCT_NORMAL_DF: f64 = 4e5;
/// `2 ln 2 * 1021`: beyond this `exp(-del^2 / 2)` underflows.
const NCT_NORMAL_DELTA_SQ: f64 = 2.0 * std::f64::consts::LN_2 * 1021.0;
const LN_SQRT_PI: f64 = 0.572_364_942_924_700_1;
const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;

fn standard_normal() -> Result<Normal, StatsError> {
    Normal::new(0.0, 1.0).map_err(|e| StatsError::invalid(e.to_string()))
}

fn students_t(df: f64) -> Result<StudentsT, StatsError> {
    if !(df.is_finite() && df > 0.0) {
        return Err(StatsError::degenerate(format!(
            "Student's t needs positive degrees of freedom, got {df}"
        )));
    }
    StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::invalid(e.to_string()))
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> Result<f64, StatsError> {
    Ok(standard_normal()?.cdf(x))
}

/// Standard normal upper tail, `1 - Phi(x)` without cancellation.
pub fn normal_sf(x: f64) -> Result<f64, StatsError> {
    Ok(standard_normal()?.sf(x))
}

/// Standard normal quantile.
pub fn normal_quantile(p: f64) -> Result<f64, StatsError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(StatsError::invalid(format!(
            "quantile probability must lie in (0,1), got {p}"
        )));
    }
    Ok(standard_normal()?.inverse_cdf(p))
}

/// Upper tail of the chi-square distribution with `df` degrees of freedom.
pub fn chi_square_sf(x: f64, df: f64) -> Result<f64, StatsError> {
    if x.is_nan() || x < 0.0 {
        return Err(StatsError::invalid(format!(
            "chi-square statistic must be non-negative, got {x}"
        )));
    }
    let dist = ChiSquared::new(df).map_err(|e| StatsError::invalid(e.to_string()))?;
    Ok(dist.sf(x))
}

/// Central Student's t CDF.
pub fn students_t_cdf(t: f64, df: f64) -> Result<f64, StatsError> {
    Ok(students_t(df)?.cdf(t))
}

/// Quantile of the central Student's t distribution. Very large `df` falls
/// back to the normal quantile.
pub fn students_t_quantile(p: f64, df: f64) -> Result<f64, StatsError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(StatsError::invalid(format!(
            "quantile probability must lie in (0,1), got {p}"
        )));
    }
    let dist = students_t(df)?;
    if df > NCT_NORMAL_DF {
        return normal_quantile(p);
    }
    Ok(dist.inverse_cdf(p))
}

/// CDF of the noncentral t distribution, `P(T <= t)` for `T ~ t(df, ncp)`.
pub fn noncentral_t_cdf(t: f64, df: f64, ncp: f64) -> Result<f64, StatsError> {
    if t.is_nan() || ncp.is_nan() {
        return Err(StatsError::invalid("noncentral t evaluated at NaN"));
    }
    if df.is_nan() || df <= 0.0 {
        return Err(StatsError::degenerate(format!(
            "noncentral t needs positive degrees of freedom, got {df}"
        )));
    }
    if ncp == 0.0 {
        return students_t_cdf(t, df);
    }
    if t.is_infinite() {
        return Ok(if t < 0.0 { 0.0 } else { 1.0 });
    }

    // Reflect to t >= 0; the lower tail at -t becomes the upper tail at t.
    let (tt, del, negdel) = if t >= 0.0 {
        (t, ncp, false)
    } else {
        (-t, -ncp, true)
    };

    if df > NCT_NORMAL_DF || del * del > NCT_NORMAL_DELTA_SQ {
        let s = 1.0 / (4.0 * df);
        let z = (tt * (1.0 - s) - del) / (1.0 + tt * tt * 2.0 * s).sqrt();
        let lower = normal_cdf(z)?;
        return Ok(if negdel { 1.0 - lower } else { lower });
    }

    let x = tt * tt / (tt * tt + df);
    let mut tnc = 0.0;
    if x > 0.0 {
        let lambda = del * del;
        let mut p = 0.5 * (-0.5 * lambda).exp();
        if p == 0.0 {
            return Err(StatsError::degenerate(format!(
                "noncentrality {ncp} too large for the series expansion"
            )));
        }
        let mut q = SQRT_2_OVER_PI * p * del;
        let mut s = 0.5 - p;
        if s < 1e-7 {
            s = -0.5 * (-0.5 * lambda).exp_m1();
        }
        let mut a = 0.5;
        let b = 0.5 * df;
        let rxb = (df / (tt * tt + df)).powf(b);
        let albeta = LN_SQRT_PI + ln_gamma(b) - ln_gamma(0.5 + b);
        let mut xodd = beta_reg(a, b, x);
        let mut godd = 2.0 * rxb * (a * x.ln() - albeta).exp();
        let bx = b * x;
        let mut xeven = if bx < f64::EPSILON { bx } else { 1.0 - rxb };
        let mut geven = bx * rxb;
        tnc = p * xodd + q * xeven;

        let mut converged = false;
        for it in 1..=NCT_MAX_ITER {
            a += 1.0;
            xodd -= godd;
            xeven -= geven;
            godd *= x * (a + b - 1.0) / a;
            geven *= x * (a + b - 0.5) / (a + 0.5);
            p *= lambda / (2 * it) as f64;
            q *= lambda / (2 * it + 1) as f64;
            tnc += p * xodd + q * xeven;
            s -= p;
            if s < -1e-10 {
                log::warn!("noncentral t: precision loss at iteration {it} (t={t}, df={df}, ncp={ncp})");
                converged = true;
                break;
            }
            if s <= 0.0 && it > 1 {
                converged = true;
                break;
            }
            let errbd = 2.0 * s * (xodd - godd);
            if errbd.abs() < NCT_ERRMAX {
                converged = true;
                break;
            }
        }
        if !converged {
            log::warn!("noncentral t: series did not converge (t={t}, df={df}, ncp={ncp})");
        }
    }
    tnc += normal_cdf(-del)?;
    let tnc = tnc.min(1.0);
    Ok(if negdel { 1.0 - tnc } else { tnc }.clamp(0.0, 1.0))
}

/// Upper tail of the noncentral t distribution.
pub fn noncentral_t_sf(t: f64, df: f64, ncp: f64) -> Result<f64, StatsError> {
    Ok(1.0 - noncentral_t_cdf(t, df, ncp)?)
}
