use thiserror::Error;

/// Errors raised by the statistical kernel.
///
/// Every routine validates its inputs up front and reports one of these
/// instead of returning NaN or infinity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Input outside the domain of the computation (empty sample, a rate
    /// outside [0,1], a non-binary outcome, alpha outside (0,1)).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Input is well-formed but the statistic is undefined for it (zero
    /// margin in a contingency table, zero pooled variance, non-positive
    /// effect size for a solve).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

impl StatsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StatsError::InvalidInput(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        StatsError::DegenerateInput(msg.into())
    }
}

/// Reject alpha outside the open unit interval.
pub fn check_alpha(alpha: f64) -> Result<(), StatsError> {
    if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(StatsError::invalid(format!(
            "significance level must lie in (0,1), got {alpha}"
        )))
    }
}
