//! Shared fixtures for the end-to-end tests.

use abtest_analysis::{Arm, ExperimentAnalyzer};
use abtest_data::{ExperimentData, ExperimentRecord};
use chrono::{DateTime, TimeZone, Utc};

/// Fixed window end so generated data is reproducible across runs.
pub fn window_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// `conversions` ones followed by zeros, `n` outcomes in total.
pub fn arm_outcomes(conversions: usize, n: usize) -> Vec<u8> {
    (0..n).map(|i| u8::from(i < conversions)).collect()
}

/// Dataset with exact per-arm counts, control rows first.
pub fn dataset(control: (usize, usize), treatment: (usize, usize)) -> ExperimentData {
    let rows = [(Arm::Control, control), (Arm::Treatment, treatment)]
        .into_iter()
        .flat_map(|(arm, (conv, n))| arm_outcomes(conv, n).into_iter().map(move |c| (arm, c)));
    rows.enumerate()
        .map(|(i, (group, conversion))| ExperimentRecord {
            user_id: i as u64,
            group,
            timestamp: window_end(),
            conversion,
        })
        .collect()
}

pub fn analyzer(control: (usize, usize), treatment: (usize, usize)) -> ExperimentAnalyzer {
    ExperimentAnalyzer::load(
        arm_outcomes(control.0, control.1),
        arm_outcomes(treatment.0, treatment.1),
    )
    .unwrap_or_else(|e| panic!("fixture samples are valid: {e}"))
}
