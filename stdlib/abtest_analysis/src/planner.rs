use abtest_stats::{check_alpha, solve_ttest_nobs, ttest_power};

use crate::analyzer::DEFAULT_ALPHA;
use crate::error::AnalysisError;

/// Plans how many subjects per arm an experiment needs.
///
/// Stateless apart from the significance level; independent of any loaded
/// data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSizePlanner {
    alpha: f64,
}

impl Default for SampleSizePlanner {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SampleSizePlanner {
    pub fn new(alpha: f64) -> Result<Self, AnalysisError> {
        check_alpha(alpha)?;
        Ok(Self { alpha })
    }

    /// Callers must have validated `alpha` already.
    pub(crate) fn from_valid_alpha(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Smallest per-arm sample size whose power for `effect_size` reaches
    /// `power`.
    ///
    /// `effect_size` must be positive and `power` in (0, 1).
    pub fn required_sample_size(&self, effect_size: f64, power: f64) -> Result<usize, AnalysisError> {
        let n = solve_ttest_nobs(effect_size, self.alpha, power)?;
        log::debug!(
            "required sample size for h={effect_size} power={power} alpha={}: {n}",
            self.alpha
        );
        Ok(n)
    }

    /// Power achieved for `effect_size` with `sample_size` per arm.
    pub fn power(&self, effect_size: f64, sample_size: usize) -> Result<f64, AnalysisError> {
        Ok(ttest_power(effect_size, sample_size as f64, self.alpha)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_effect_needs_199() {
        let planner = SampleSizePlanner::default();
        assert_eq!(planner.required_sample_size(0.2, 0.8).unwrap(), 199);
    }

    #[test]
    fn result_is_minimal() {
        let planner = SampleSizePlanner::default();
        let n = planner.required_sample_size(0.5, 0.9).unwrap();
        assert!(planner.power(0.5, n).unwrap() >= 0.9);
        assert!(planner.power(0.5, n - 1).unwrap() < 0.9);
    }

    #[test]
    fn stricter_alpha_needs_more_subjects() {
        let loose = SampleSizePlanner::default().required_sample_size(0.3, 0.8).unwrap();
        let strict = SampleSizePlanner::new(0.01)
            .unwrap()
            .required_sample_size(0.3, 0.8)
            .unwrap();
        assert!(strict > loose);
    }

    #[test]
    fn invalid_targets() {
        let planner = SampleSizePlanner::default();
        assert!(matches!(
            planner.required_sample_size(0.0, 0.8),
            Err(AnalysisError::DegenerateInput(_))
        ));
        assert!(matches!(
            planner.required_sample_size(0.2, 1.0),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            planner.required_sample_size(0.2, 0.0),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(SampleSizePlanner::new(1.5).is_err());
    }
}
