use std::fmt;
use std::str::FromStr;

use abtest_stats::Proportion;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Experiment arm a subject was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    Control,
    Treatment,
}

impl Arm {
    pub const ALL: [Arm; 2] = [Arm::Control, Arm::Treatment];

    /// Title-case label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Arm::Control => "Control",
            Arm::Treatment => "Treatment",
        }
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Arm::Control => "control",
            Arm::Treatment => "treatment",
        })
    }
}

impl FromStr for Arm {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control" => Ok(Arm::Control),
            "treatment" => Ok(Arm::Treatment),
            other => Err(AnalysisError::InvalidInput(format!(
                "unknown arm '{other}', expected 'control' or 'treatment'"
            ))),
        }
    }
}

/// Binary outcomes of one arm, one entry per subject.
///
/// Never empty and only ever holds 0 or 1; both are checked on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    outcomes: Vec<u8>,
    conversions: u64,
}

impl Sample {
    /// Build a sample from integers or booleans.
    pub fn from_outcomes<I, T>(values: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        let mut outcomes = Vec::new();
        let mut conversions = 0u64;
        for (i, v) in values.into_iter().enumerate() {
            match v.into() {
                0 => outcomes.push(0),
                1 => {
                    outcomes.push(1);
                    conversions += 1;
                }
                other => {
                    return Err(AnalysisError::InvalidInput(format!(
                        "outcome {i} is {other}, expected 0 or 1"
                    )))
                }
            }
        }
        if outcomes.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "sample must contain at least one outcome".into(),
            ));
        }
        Ok(Self {
            outcomes,
            conversions,
        })
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn conversions(&self) -> u64 {
        self.conversions
    }

    /// `conversions / len`, in [0,1].
    pub fn conversion_rate(&self) -> f64 {
        self.conversions as f64 / self.outcomes.len() as f64
    }

    pub fn outcomes(&self) -> &[u8] {
        &self.outcomes
    }

    /// Outcomes as floats, for density plots.
    pub fn to_f64(&self) -> Vec<f64> {
        self.outcomes.iter().map(|&v| f64::from(v)).collect()
    }

    pub(crate) fn proportion(&self) -> Result<Proportion, AnalysisError> {
        Ok(Proportion::new(self.conversions, self.outcomes.len() as u64)?)
    }
}

impl TryFrom<Vec<u8>> for Sample {
    type Error = AnalysisError;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        Sample::from_outcomes(values)
    }
}

impl TryFrom<&[bool]> for Sample {
    type Error = AnalysisError;

    fn try_from(values: &[bool]) -> Result<Self, Self::Error> {
        Sample::from_outcomes(values.iter().copied())
    }
}
