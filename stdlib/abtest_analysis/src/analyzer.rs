use abtest_stats::{
    check_alpha, chi_square_2x2, cohen_h, relative_change, ttest_power, two_proportion_ztest,
};

use crate::error::AnalysisError;
use crate::planner::SampleSizePlanner;
use crate::report::Report;
use crate::sample::Sample;

/// Significance level used unless one is configured.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// One analysis session over a control and a treatment sample.
///
/// Construct it with both samples at once; every statistic is then derived
/// on demand from the immutable samples. To analyse other data, build a
/// new analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentAnalyzer {
    control: Sample,
    treatment: Sample,
    alpha: f64,
}

impl ExperimentAnalyzer {
    pub fn new(control: Sample, treatment: Sample) -> Self {
        log::debug!(
            "analysis session: control n={} ({} conversions), treatment n={} ({} conversions)",
            control.len(),
            control.conversions(),
            treatment.len(),
            treatment.conversions()
        );
        Self {
            control,
            treatment,
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Validate two raw outcome sequences and start a session on them.
    /// Fails with `InvalidInput` if either arm is empty or not binary.
    pub fn load<C, T, X, Y>(control: C, treatment: T) -> Result<Self, AnalysisError>
    where
        C: IntoIterator<Item = X>,
        T: IntoIterator<Item = Y>,
        X: Into<i64>,
        Y: Into<i64>,
    {
        let control = Sample::from_outcomes(control)
            .map_err(|e| prefix_arm("control", e))?;
        let treatment = Sample::from_outcomes(treatment)
            .map_err(|e| prefix_arm("treatment", e))?;
        Ok(Self::new(control, treatment))
    }

    /// Replace the significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Result<Self, AnalysisError> {
        check_alpha(alpha)?;
        self.alpha = alpha;
        Ok(self)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn control(&self) -> &Sample {
        &self.control
    }

    pub fn treatment(&self) -> &Sample {
        &self.treatment
    }

    /// `(control_rate, treatment_rate)`.
    pub fn conversion_rates(&self) -> (f64, f64) {
        (
            self.control.conversion_rate(),
            self.treatment.conversion_rate(),
        )
    }

    /// Pearson chi-square with continuity correction on the arm x outcome
    /// table. Returns `(chi2, p_value)`.
    pub fn chi_square_test(&self) -> Result<(f64, f64), AnalysisError> {
        let res = chi_square_2x2(self.control.proportion()?, self.treatment.proportion()?)?;
        Ok((res.statistic, res.p_value))
    }

    /// Pooled two-proportion z-test, statistic signed control minus
    /// treatment. Returns `(z, p_value)`.
    pub fn z_test(&self) -> Result<(f64, f64), AnalysisError> {
        let res = two_proportion_ztest(self.control.proportion()?, self.treatment.proportion()?)?;
        Ok((res.statistic, res.p_value))
    }

    /// Cohen's h, positive when treatment converts better.
    pub fn effect_size(&self) -> Result<f64, AnalysisError> {
        let (c, t) = self.conversion_rates();
        Ok(cohen_h(c, t)?)
    }

    /// Power at the smaller of the two arm sizes.
    pub fn power(&self) -> Result<f64, AnalysisError> {
        self.power_at(self.control.len().min(self.treatment.len()))
    }

    /// Power of the observed effect size at `sample_size` observations.
    pub fn power_at(&self, sample_size: usize) -> Result<f64, AnalysisError> {
        let h = self.effect_size()?;
        Ok(ttest_power(h, sample_size as f64, self.alpha)?)
    }

    /// `(treatment_rate - control_rate) / control_rate`.
    pub fn relative_improvement(&self) -> Result<f64, AnalysisError> {
        let (c, t) = self.conversion_rates();
        Ok(relative_change(c, t)?)
    }

    /// Planner sharing this session's alpha.
    pub fn planner(&self) -> SampleSizePlanner {
        SampleSizePlanner::from_valid_alpha(self.alpha)
    }

    /// Run the full battery. Any failing statistic fails the whole report.
    pub fn report(&self) -> Result<Report, AnalysisError> {
        let (control_rate, treatment_rate) = self.conversion_rates();
        let relative_improvement = self.relative_improvement()?;
        let (chi2_statistic, chi2_p_value) = self.chi_square_test()?;
        let (z_statistic, z_p_value) = self.z_test()?;
        let effect_size = self.effect_size()?;
        let power = self.power()?;

        let report = Report {
            control_rate,
            treatment_rate,
            relative_improvement,
            chi2_statistic,
            chi2_p_value,
            z_statistic,
            z_p_value,
            effect_size,
            power,
            control_n: self.control.len(),
            treatment_n: self.treatment.len(),
            alpha: self.alpha,
        };
        log::debug!(
            "report: lift={relative_improvement:.4} chi2_p={chi2_p_value:.4} z_p={z_p_value:.4} h={effect_size:.4} power={power:.4}"
        );
        Ok(report)
    }
}

fn prefix_arm(arm: &str, e: AnalysisError) -> AnalysisError {
    match e {
        AnalysisError::InvalidInput(msg) => AnalysisError::InvalidInput(format!("{arm}: {msg}")),
        AnalysisError::DegenerateInput(msg) => {
            AnalysisError::DegenerateInput(format!("{arm}: {msg}"))
        }
    }
}
