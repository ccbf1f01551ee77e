use std::fmt;
use std::fs;
use std::path::Path;

use abtest_analysis::DEFAULT_ALPHA;
use abtest_data::GeneratorConfig;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

pub const CONFIG_FILE: &str = "abtest.toml";

/// Contents of `abtest.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub experiment: ExperimentSection,
    pub analysis: AnalysisSection,
    pub planner: PlannerSection,
}

/// Parameters of the synthetic experiment the dashboard analyses.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentSection {
    pub control_rate: f64,
    pub treatment_rate: f64,
    /// Subjects per arm.
    pub sample_size: usize,
    pub days: u32,
    pub seed: u64,
}

impl Default for ExperimentSection {
    fn default() -> Self {
        let defaults = GeneratorConfig::default();
        Self {
            control_rate: defaults.control_rate,
            treatment_rate: defaults.treatment_rate,
            sample_size: defaults.users_per_arm,
            days: defaults.days,
            seed: defaults.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisSection {
    pub alpha: f64,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Targets of the sample size calculator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerSection {
    pub effect_size: f64,
    pub power: f64,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            effect_size: 0.2,
            power: 0.8,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), DashboardError> {
        let e = &self.experiment;
        for (name, rate) in [
            ("experiment.control_rate", e.control_rate),
            ("experiment.treatment_rate", e.treatment_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(format!("{name} must lie in [0,1], got {rate}")));
            }
        }
        if e.sample_size < 2 {
            return Err(invalid(format!(
                "experiment.sample_size must be at least 2, got {}",
                e.sample_size
            )));
        }
        if e.days == 0 {
            return Err(invalid("experiment.days must be at least 1".into()));
        }
        open_unit("analysis.alpha", self.analysis.alpha)?;
        open_unit("planner.power", self.planner.power)?;
        let h = self.planner.effect_size;
        if !(h.is_finite() && h > 0.0) {
            return Err(invalid(format!(
                "planner.effect_size must be positive, got {h}"
            )));
        }
        Ok(())
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            users_per_arm: self.experiment.sample_size,
            control_rate: self.experiment.control_rate,
            treatment_rate: self.experiment.treatment_rate,
            days: self.experiment.days,
            seed: self.experiment.seed,
        }
    }
}

impl fmt::Display for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.experiment;
        write!(
            f,
            "control={} treatment={} n={} seed={} alpha={} planner(h={}, power={})",
            e.control_rate,
            e.treatment_rate,
            e.sample_size,
            e.seed,
            self.analysis.alpha,
            self.planner.effect_size,
            self.planner.power
        )
    }
}

fn invalid(msg: String) -> DashboardError {
    DashboardError::Config(msg)
}

fn open_unit(name: &str, value: f64) -> Result<(), DashboardError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must lie in (0,1), got {value}")))
    }
}

/// Parse and validate configuration text.
pub fn parse_config(text: &str) -> Result<DashboardConfig, DashboardError> {
    let config: DashboardConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DashboardConfig, DashboardError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    log::debug!("loaded {}: {config}", path.display());
    Ok(config)
}

/// Commented configuration file holding the defaults.
pub fn generate_config() -> String {
    let c = DashboardConfig::default();
    let mut out = String::new();
    out.push_str("# abtest dashboard configuration\n");
    out.push_str("\n# Synthetic experiment\n");
    out.push_str("[experiment]\n");
    out.push_str(&format!("control_rate = {:?}\n", c.experiment.control_rate));
    out.push_str(&format!(
        "treatment_rate = {:?}\n",
        c.experiment.treatment_rate
    ));
    out.push_str("# subjects per group\n");
    out.push_str(&format!("sample_size = {}\n", c.experiment.sample_size));
    out.push_str("# enrolment window of generated data, in days\n");
    out.push_str(&format!("days = {}\n", c.experiment.days));
    out.push_str(&format!("seed = {}\n", c.experiment.seed));
    out.push_str("\n[analysis]\n");
    out.push_str("# significance level of the tests\n");
    out.push_str(&format!("alpha = {:?}\n", c.analysis.alpha));
    out.push_str("\n# Sample size calculator\n");
    out.push_str("[planner]\n");
    out.push_str("# desired effect size (Cohen's h)\n");
    out.push_str(&format!("effect_size = {:?}\n", c.planner.effect_size));
    out.push_str(&format!("power = {:?}\n", c.planner.power));
    out
}
