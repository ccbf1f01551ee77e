use abtest_analysis::Arm;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::DataError;
use crate::record::{ExperimentData, ExperimentRecord};

/// Parameters of a synthetic experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub users_per_arm: usize,
    pub control_rate: f64,
    pub treatment_rate: f64,
    /// Length of the enrolment window ending at the generation instant.
    pub days: u32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            users_per_arm: 1000,
            control_rate: 0.10,
            treatment_rate: 0.12,
            days: 30,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), DataError> {
        if self.users_per_arm == 0 {
            return Err(DataError::InvalidParameter(
                "users_per_arm must be at least 1".into(),
            ));
        }
        for (name, rate) in [
            ("control_rate", self.control_rate),
            ("treatment_rate", self.treatment_rate),
        ] {
            check_rate(name, rate)?;
        }
        if self.days == 0 {
            return Err(DataError::InvalidParameter("days must be at least 1".into()));
        }
        Ok(())
    }

    pub fn rate(&self, arm: Arm) -> f64 {
        match arm {
            Arm::Control => self.control_rate,
            Arm::Treatment => self.treatment_rate,
        }
    }
}

fn check_rate(name: &str, rate: f64) -> Result<(), DataError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(DataError::InvalidParameter(format!(
            "{name} must lie in [0,1], got {rate}"
        )))
    }
}

/// Generate `2 * users_per_arm` rows enrolled during the `days` before `end`.
///
/// Ids run `0..2n`; the first `n` are control. Every timestamp is drawn
/// before any conversion so that changing a rate never moves timestamps.
pub fn generate_experiment(
    config: &GeneratorConfig,
    end: DateTime<Utc>,
) -> Result<ExperimentData, DataError> {
    config.validate()?;
    let n = config.users_per_arm;
    let total = n.checked_mul(2).ok_or_else(|| {
        DataError::InvalidParameter(format!("users_per_arm {n} is too large"))
    })?;
    let start = end
        .checked_sub_signed(Duration::days(i64::from(config.days)))
        .ok_or_else(|| {
            DataError::InvalidParameter(format!(
                "a window of {} days before {end} is out of range",
                config.days
            ))
        })?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let timestamps: Vec<DateTime<Utc>> = (0..total)
        .map(|_| {
            let day = rng.gen_range(0..config.days);
            let hour = rng.gen_range(0..24);
            let minute = rng.gen_range(0..60);
            start
                + Duration::days(i64::from(day))
                + Duration::hours(hour)
                + Duration::minutes(minute)
        })
        .collect();

    let records: Vec<ExperimentRecord> = timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| {
            let group = if i < n { Arm::Control } else { Arm::Treatment };
            ExperimentRecord {
                user_id: i as u64,
                group,
                timestamp,
                conversion: u8::from(rng.gen_bool(config.rate(group))),
            }
        })
        .collect();

    log::debug!(
        "generated {} records over {} days (seed {})",
        records.len(),
        config.days,
        config.seed
    );
    Ok(ExperimentData::new(records))
}

/// Draw `n` control outcomes and then `n` treatment outcomes from one
/// seeded stream. This is the dashboard's synthetic experiment.
pub fn simulate_outcomes(
    control_rate: f64,
    treatment_rate: f64,
    n: usize,
    seed: u64,
) -> Result<(Vec<u8>, Vec<u8>), DataError> {
    check_rate("control_rate", control_rate)?;
    check_rate("treatment_rate", treatment_rate)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut draw = |rate: f64| -> Vec<u8> { (0..n).map(|_| u8::from(rng.gen_bool(rate))).collect() };
    let control = draw(control_rate);
    let treatment = draw(treatment_rate);
    Ok((control, treatment))
}
