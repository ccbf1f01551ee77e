//! The decision report: raw values plus their display strings.

use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::format::{fixed, percent};

/// Fixed keys of a [`Report`], in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ControlRate,
    TreatmentRate,
    RelativeImprovement,
    Chi2PValue,
    ZPValue,
    EffectSize,
    Power,
    ControlN,
    TreatmentN,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::ControlRate,
        Metric::TreatmentRate,
        Metric::RelativeImprovement,
        Metric::Chi2PValue,
        Metric::ZPValue,
        Metric::EffectSize,
        Metric::Power,
        Metric::ControlN,
        Metric::TreatmentN,
    ];

    /// Machine key, also the JSON field name.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::ControlRate => "control_rate",
            Metric::TreatmentRate => "treatment_rate",
            Metric::RelativeImprovement => "relative_improvement",
            Metric::Chi2PValue => "chi2_p_value",
            Metric::ZPValue => "z_p_value",
            Metric::EffectSize => "effect_size",
            Metric::Power => "power",
            Metric::ControlN => "control_n",
            Metric::TreatmentN => "treatment_n",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::ControlRate => "Control Conversion Rate",
            Metric::TreatmentRate => "Treatment Conversion Rate",
            Metric::RelativeImprovement => "Relative Improvement",
            Metric::Chi2PValue => "Chi-square Test p-value",
            Metric::ZPValue => "Z-test p-value",
            Metric::EffectSize => "Effect Size (Cohen's h)",
            Metric::Power => "Statistical Power",
            Metric::ControlN => "Sample Size (Control)",
            Metric::TreatmentN => "Sample Size (Treatment)",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// A report value tagged with how it is displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Fraction shown as a one-decimal percentage.
    Percent(f64),
    /// Shown with four decimals.
    PValue(f64),
    /// Shown with three decimals.
    EffectSize(f64),
    Count(usize),
}

impl MetricValue {
    pub fn raw(&self) -> f64 {
        match *self {
            MetricValue::Percent(v) | MetricValue::PValue(v) | MetricValue::EffectSize(v) => v,
            MetricValue::Count(n) => n as f64,
        }
    }

    pub fn display(&self) -> String {
        match *self {
            MetricValue::Percent(v) => percent(v, 1),
            MetricValue::PValue(v) => fixed(v, 4),
            MetricValue::EffectSize(v) => fixed(v, 3),
            MetricValue::Count(n) => n.to_string(),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.display())
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("MetricValue", 2)?;
        match *self {
            MetricValue::Count(n) => st.serialize_field("value", &n)?,
            other => st.serialize_field("value", &other.raw())?,
        }
        st.serialize_field("display", &self.display())?;
        st.end()
    }
}

/// Snapshot of one analysis. Built by
/// [`ExperimentAnalyzer::report`](crate::ExperimentAnalyzer::report) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub control_rate: f64,
    pub treatment_rate: f64,
    pub relative_improvement: f64,
    pub chi2_statistic: f64,
    pub chi2_p_value: f64,
    pub z_statistic: f64,
    pub z_p_value: f64,
    pub effect_size: f64,
    pub power: f64,
    pub control_n: usize,
    pub treatment_n: usize,
    pub alpha: f64,
}

impl Report {
    pub fn value(&self, metric: Metric) -> MetricValue {
        match metric {
            Metric::ControlRate => MetricValue::Percent(self.control_rate),
            Metric::TreatmentRate => MetricValue::Percent(self.treatment_rate),
            Metric::RelativeImprovement => MetricValue::Percent(self.relative_improvement),
            Metric::Chi2PValue => MetricValue::PValue(self.chi2_p_value),
            Metric::ZPValue => MetricValue::PValue(self.z_p_value),
            Metric::EffectSize => MetricValue::EffectSize(self.effect_size),
            Metric::Power => MetricValue::Percent(self.power),
            Metric::ControlN => MetricValue::Count(self.control_n),
            Metric::TreatmentN => MetricValue::Count(self.treatment_n),
        }
    }

    /// Display string for one metric.
    pub fn display(&self, metric: Metric) -> String {
        self.value(metric).display()
    }

    /// All metrics in presentation order.
    pub fn entries(&self) -> impl Iterator<Item = (Metric, MetricValue)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.value(m)))
    }

    /// Significant when the z-test p-value falls below alpha.
    pub fn is_significant(&self) -> bool {
        self.z_p_value < self.alpha
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::ALL.len()))?;
        for (metric, value) in self.entries() {
            map.serialize_entry(metric.key(), &value)?;
        }
        map.end()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = Metric::ALL
            .iter()
            .map(|m| m.label().len())
            .max()
            .unwrap_or(0);
        for (metric, value) in self.entries() {
            writeln!(f, "{:<width$}  {}", metric.label(), value)?;
        }
        Ok(())
    }
}
