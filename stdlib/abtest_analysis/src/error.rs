use abtest_stats::StatsError;
use thiserror::Error;

/// Failure kinds of the analyzer. Every public operation reports one of
/// these instead of producing NaN, infinity or a partial report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Empty sample, non-binary outcome, rate outside [0,1], bad alpha or power.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Statistic undefined for the data: zero-margin table, zero pooled
    /// variance, zero control rate, non-positive effect size for planning.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

impl From<StatsError> for AnalysisError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::InvalidInput(msg) => AnalysisError::InvalidInput(msg),
            StatsError::DegenerateInput(msg) => AnalysisError::DegenerateInput(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_errors_keep_their_kind() {
        assert_eq!(
            AnalysisError::from(StatsError::invalid("x")),
            AnalysisError::InvalidInput("x".into())
        );
        assert_eq!(
            AnalysisError::from(StatsError::degenerate("y")),
            AnalysisError::DegenerateInput("y".into())
        );
    }
}
