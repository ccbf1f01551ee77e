use abtest_analysis::AnalysisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Invalid generator parameter: {0}")]
    InvalidParameter(String),
    /// A CSV row that parsed but does not describe a valid record. `row` is
    /// 1-based and excludes the header.
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },
    #[error("Dataset has no rows for the {0} arm")]
    MissingArm(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
