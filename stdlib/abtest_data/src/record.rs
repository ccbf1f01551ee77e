use std::fmt;

use abtest_analysis::{Arm, ExperimentAnalyzer, Sample};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::error::DataError;

/// One synthetic subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentRecord {
    pub user_id: u64,
    pub group: Arm,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// 0 or 1.
    pub conversion: u8,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Ordered rows of one experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentData {
    records: Vec<ExperimentRecord>,
}

impl ExperimentData {
    pub fn new(records: Vec<ExperimentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ExperimentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn arm_records(&self, arm: Arm) -> impl Iterator<Item = &ExperimentRecord> + '_ {
        self.records.iter().filter(move |r| r.group == arm)
    }

    /// Conversions of one arm in row order.
    pub fn outcomes(&self, arm: Arm) -> Vec<u8> {
        self.arm_records(arm).map(|r| r.conversion).collect()
    }

    /// `(control, treatment)` samples. Fails if either arm has no rows.
    pub fn samples(&self) -> Result<(Sample, Sample), DataError> {
        let sample = |arm: Arm| -> Result<Sample, DataError> {
            let outcomes = self.outcomes(arm);
            if outcomes.is_empty() {
                return Err(DataError::MissingArm(arm.to_string()));
            }
            Ok(Sample::from_outcomes(outcomes)?)
        };
        Ok((sample(Arm::Control)?, sample(Arm::Treatment)?))
    }

    pub fn analyzer(&self) -> Result<ExperimentAnalyzer, DataError> {
        let (control, treatment) = self.samples()?;
        Ok(ExperimentAnalyzer::new(control, treatment))
    }

    pub fn summary(&self) -> DataSummary {
        let arms = Arm::ALL.map(|arm| {
            let (users, conversions) = self
                .arm_records(arm)
                .fold((0usize, 0usize), |(n, c), r| (n + 1, c + usize::from(r.conversion)));
            ArmSummary {
                arm,
                users,
                conversions,
            }
        });
        DataSummary {
            total: self.records.len(),
            arms,
        }
    }
}

impl FromIterator<ExperimentRecord> for ExperimentData {
    fn from_iter<I: IntoIterator<Item = ExperimentRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArmSummary {
    pub arm: Arm,
    pub users: usize,
    pub conversions: usize,
}

impl ArmSummary {
    /// `None` for an arm without users.
    pub fn rate(&self) -> Option<f64> {
        (self.users > 0).then(|| self.conversions as f64 / self.users as f64)
    }
}

/// Counts printed after generating a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataSummary {
    pub total: usize,
    /// Indexed in [`Arm::ALL`] order.
    pub arms: [ArmSummary; 2],
}

impl DataSummary {
    pub fn arm(&self, arm: Arm) -> &ArmSummary {
        match arm {
            Arm::Control => &self.arms[0],
            Arm::Treatment => &self.arms[1],
        }
    }
}

impl fmt::Display for DataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary Statistics:")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "Total users: {}", self.total)?;
        for arm in &self.arms {
            writeln!(f, "{} group size: {}", arm.arm.label(), arm.users)?;
        }
        writeln!(f)?;
        writeln!(f, "Conversion rates:")?;
        for arm in &self.arms {
            match arm.rate() {
                Some(rate) => writeln!(f, "{:<10} {rate:.4}", arm.arm)?,
                None => writeln!(f, "{:<10} n/a", arm.arm)?,
            }
        }
        Ok(())
    }
}
