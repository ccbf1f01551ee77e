//! The dashboard model: one synthetic experiment, its report and the
//! sample size calculator, computed once and handed to the renderers.

use abtest_analysis::format::percent;
use abtest_analysis::{AnalysisError, ExperimentAnalyzer, Metric, Report, Sample, SampleSizePlanner};
use abtest_data::simulate_outcomes;

use crate::config::DashboardConfig;
use crate::error::DashboardError;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub config: DashboardConfig,
    pub control: Sample,
    pub treatment: Sample,
    /// The report, or why it could not be computed for this data.
    pub analysis: Result<Report, AnalysisError>,
    pub required_sample_size: usize,
}

impl Dashboard {
    /// Simulate the configured experiment and analyse it.
    ///
    /// Invalid configuration is an error. A statistic that is undefined for
    /// the simulated data (e.g. both rates zero) is kept in `analysis` so
    /// the rest of the dashboard still renders.
    pub fn build(config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        let e = &config.experiment;
        let (control, treatment) =
            simulate_outcomes(e.control_rate, e.treatment_rate, e.sample_size, e.seed)?;
        let analyzer =
            ExperimentAnalyzer::load(control, treatment)?.with_alpha(config.analysis.alpha)?;
        let analysis = analyzer.report();
        if let Err(err) = &analysis {
            log::warn!("analysis unavailable: {err}");
        }

        let planner = SampleSizePlanner::new(config.analysis.alpha)?;
        let required_sample_size =
            planner.required_sample_size(config.planner.effect_size, config.planner.power)?;

        Ok(Self {
            control: analyzer.control().clone(),
            treatment: analyzer.treatment().clone(),
            analysis,
            required_sample_size,
            config,
        })
    }

    pub fn report(&self) -> Option<&Report> {
        self.analysis.as_ref().ok()
    }
}

/// Plain-language reading of a report. Significance is decided by the
/// z-test p-value against the report's alpha.
pub fn interpretation(report: &Report) -> Vec<String> {
    if report.is_significant() {
        let lift = report.display(Metric::RelativeImprovement);
        let detail = if report.relative_improvement > 0.0 {
            format!("The treatment group shows a {lift} improvement over the control group.")
        } else {
            format!("The treatment group shows a {lift} decrease compared to the control group.")
        };
        vec!["The test results are statistically significant!".to_string(), detail]
    } else {
        vec![
            "The test results are not statistically significant.".to_string(),
            "We cannot conclude that there is a meaningful difference between the control and treatment groups.".to_string(),
        ]
    }
}

/// Signed delta shown next to the treatment rate, e.g. `+20.0%`.
pub fn relative_delta(report: &Report) -> String {
    let shown = percent(report.relative_improvement, 1);
    if report.relative_improvement > 0.0 {
        format!("+{shown}")
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExperimentSection, PlannerSection};
    use pretty_assertions::assert_eq;

    fn report(z_p_value: f64, relative_improvement: f64) -> Report {
        Report {
            control_rate: 0.10,
            treatment_rate: 0.10 * (1.0 + relative_improvement),
            relative_improvement,
            chi2_statistic: 4.0,
            chi2_p_value: z_p_value,
            z_statistic: -2.0,
            z_p_value,
            effect_size: 0.1,
            power: 0.5,
            control_n: 1000,
            treatment_n: 1000,
            alpha: 0.05,
        }
    }

    #[test]
    fn default_dashboard_builds() {
        let dash = Dashboard::build(DashboardConfig::default()).unwrap();
        assert_eq!(dash.control.len(), 1000);
        assert_eq!(dash.treatment.len(), 1000);
        assert_eq!(dash.required_sample_size, 199);
        let report = dash.report().unwrap();
        assert_eq!(report.alpha, 0.05);
    }

    #[test]
    fn undefined_statistics_do_not_abort_the_dashboard() {
        let config = DashboardConfig {
            experiment: ExperimentSection {
                control_rate: 0.0,
                treatment_rate: 0.0,
                ..ExperimentSection::default()
            },
            ..DashboardConfig::default()
        };
        let dash = Dashboard::build(config).unwrap();
        assert!(matches!(dash.analysis, Err(AnalysisError::DegenerateInput(_))));
        assert!(dash.report().is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DashboardConfig {
            planner: PlannerSection {
                effect_size: 0.0,
                power: 0.8,
            },
            ..DashboardConfig::default()
        };
        assert!(matches!(
            Dashboard::build(config),
            Err(DashboardError::Config(_))
        ));
    }

    #[test]
    fn interpretation_wording() {
        assert_eq!(
            interpretation(&report(0.01, 0.2)),
            vec![
                "The test results are statistically significant!".to_string(),
                "The treatment group shows a 20.0% improvement over the control group."
                    .to_string(),
            ]
        );
        let down = interpretation(&report(0.01, -0.15));
        assert_eq!(
            down[1],
            "The treatment group shows a -15.0% decrease compared to the control group."
        );
        let flat = interpretation(&report(0.3, 0.2));
        assert_eq!(flat[0], "The test results are not statistically significant.");
    }

    #[test]
    fn delta_sign() {
        assert_eq!(relative_delta(&report(0.5, 0.2)), "+20.0%");
        assert_eq!(relative_delta(&report(0.5, -0.1)), "-10.0%");
    }
}
