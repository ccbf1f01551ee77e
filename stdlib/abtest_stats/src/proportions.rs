//! Two-sample tests on binomial proportions.

use crate::distributions::{chi_square_sf, normal_sf};
use crate::error::StatsError;

/// Successes out of trials for one experiment arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proportion {
    successes: u64,
    trials: u64,
}

impl Proportion {
    pub fn new(successes: u64, trials: u64) -> Result<Self, StatsError> {
        if trials == 0 {
            return Err(StatsError::invalid("proportion needs at least one trial"));
        }
        if successes > trials {
            return Err(StatsError::invalid(format!(
                "{successes} successes exceed {trials} trials"
            )));
        }
        Ok(Self { successes, trials })
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn failures(&self) -> u64 {
        self.trials - self.successes
    }

    /// Observed rate, always in [0,1].
    pub fn rate(&self) -> f64 {
        self.successes as f64 / self.trials as f64
    }
}

/// Outcome of Pearson's chi-square test on a 2x2 table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: u32,
    /// Expected counts under independence, rows = arms, cols = {success, failure}.
    pub expected: [[f64; 2]; 2],
}

/// Outcome of a two-proportion z-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZTestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Pearson chi-square test of independence on the table
/// `[[a.successes, a.failures], [b.successes, b.failures]]` with Yates'
/// continuity correction.
///
/// Each observed cell is moved toward its expected count by
/// `min(0.5, |O - E|)` before the statistic is formed. A zero row or
/// column total leaves an expected count of zero and is rejected.
pub fn chi_square_2x2(a: Proportion, b: Proportion) -> Result<ChiSquareResult, StatsError> {
    let observed = [
        [a.successes as f64, a.failures() as f64],
        [b.successes as f64, b.failures() as f64],
    ];
    let rows = [a.trials as f64, b.trials as f64];
    let cols = [
        (a.successes + b.successes) as f64,
        (a.failures() + b.failures()) as f64,
    ];
    let total = rows[0] + rows[1];

    if cols[0] == 0.0 {
        return Err(StatsError::degenerate(
            "contingency table has no successes in either arm",
        ));
    }
    if cols[1] == 0.0 {
        return Err(StatsError::degenerate(
            "contingency table has no failures in either arm",
        ));
    }

    let mut expected = [[0.0; 2]; 2];
    let mut statistic = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            let e = rows[i] * cols[j] / total;
            let diff = e - observed[i][j];
            let corrected = observed[i][j] + diff.signum() * diff.abs().min(0.5);
            statistic += (corrected - e).powi(2) / e;
            expected[i][j] = e;
        }
    }

    let p_value = chi_square_sf(statistic, 1.0)?;
    log::trace!("chi2 2x2: statistic={statistic} p={p_value}");
    Ok(ChiSquareResult {
        statistic,
        p_value,
        dof: 1,
        expected,
    })
}

/// Two-sided two-proportion z-test with the pooled proportion under the
/// null. The statistic is signed as `rate(a) - rate(b)`.
pub fn two_proportion_ztest(a: Proportion, b: Proportion) -> Result<ZTestResult, StatsError> {
    let na = a.trials as f64;
    let nb = b.trials as f64;
    let pooled = (a.successes + b.successes) as f64 / (na + nb);
    let variance = pooled * (1.0 - pooled) * (1.0 / na + 1.0 / nb);
    if variance <= 0.0 {
        return Err(StatsError::degenerate(format!(
            "pooled proportion {pooled} has zero variance"
        )));
    }
    let statistic = (a.rate() - b.rate()) / variance.sqrt();
    let p_value = (2.0 * normal_sf(statistic.abs())?).min(1.0);
    log::trace!("two-proportion z: statistic={statistic} p={p_value}");
    Ok(ZTestResult { statistic, p_value })
}

/// Relative change of `new` over `base`, `(new - base) / base`.
pub fn relative_change(base: f64, new: f64) -> Result<f64, StatsError> {
    if base == 0.0 {
        return Err(StatsError::degenerate(
            "relative change is undefined for a zero baseline",
        ));
    }
    Ok((new - base) / base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn proportion_validates_counts() {
        assert!(Proportion::new(0, 0).is_err());
        assert!(Proportion::new(5, 4).is_err());
        let p = Proportion::new(3, 12).unwrap();
        assert_eq!(p.failures(), 9);
        assert_abs_diff_eq!(p.rate(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn chi_square_small_table() {
        // Yates-corrected statistic for [[10, 90], [12, 88]] is 0.0510...
        let a = Proportion::new(10, 100).unwrap();
        let b = Proportion::new(12, 100).unwrap();
        let res = chi_square_2x2(a, b).unwrap();
        assert_eq!(res.dof, 1);
        assert_abs_diff_eq!(res.expected[0][0], 11.0, epsilon = 1e-12);
        let manual = {
            // |O - E| = 1 in every cell, corrected to 0.5
            let e = [11.0, 89.0, 11.0, 89.0];
            e.iter().map(|e| 0.25 / e).sum::<f64>()
        };
        assert_abs_diff_eq!(res.statistic, manual, epsilon = 1e-12);
        assert!(res.p_value > 0.8 && res.p_value <= 1.0);
    }

    #[test]
    fn chi_square_identical_arms_has_unit_p() {
        let a = Proportion::new(30, 200).unwrap();
        let res = chi_square_2x2(a, a).unwrap();
        assert_abs_diff_eq!(res.statistic, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(res.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn chi_square_rejects_zero_margin() {
        let zero = Proportion::new(0, 50).unwrap();
        let full = Proportion::new(40, 40).unwrap();
        assert!(matches!(
            chi_square_2x2(zero, zero),
            Err(StatsError::DegenerateInput(_))
        ));
        assert!(matches!(
            chi_square_2x2(full, full),
            Err(StatsError::DegenerateInput(_))
        ));
    }

    #[test]
    fn ztest_matches_hand_computation() {
        let a = Proportion::new(10, 100).unwrap();
        let b = Proportion::new(12, 100).unwrap();
        let res = two_proportion_ztest(a, b).unwrap();
        let pooled: f64 = 22.0 / 200.0;
        let se = (pooled * (1.0 - pooled) * (2.0 / 100.0)).sqrt();
        assert_abs_diff_eq!(res.statistic, -0.02 / se, epsilon = 1e-12);
        assert!(res.statistic < 0.0);
        let flipped = two_proportion_ztest(b, a).unwrap();
        assert_abs_diff_eq!(flipped.statistic, -res.statistic, epsilon = 1e-12);
        assert_abs_diff_eq!(flipped.p_value, res.p_value, epsilon = 1e-12);
    }

    #[test]
    fn ztest_strong_difference_is_significant() {
        let a = Proportion::new(100, 1000).unwrap();
        let b = Proportion::new(200, 1000).unwrap();
        let res = two_proportion_ztest(a, b).unwrap();
        assert!(res.p_value < 1e-6);
    }

    #[test]
    fn ztest_rejects_zero_variance() {
        let zero = Proportion::new(0, 10).unwrap();
        assert!(matches!(
            two_proportion_ztest(zero, zero),
            Err(StatsError::DegenerateInput(_))
        ));
    }

    #[test]
    fn relative_change_basic() {
        assert_abs_diff_eq!(relative_change(0.10, 0.12).unwrap(), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(relative_change(0.2, 0.1).unwrap(), -0.5, epsilon = 1e-12);
        assert!(matches!(
            relative_change(0.0, 0.1),
            Err(StatsError::DegenerateInput(_))
        ));
    }
}
