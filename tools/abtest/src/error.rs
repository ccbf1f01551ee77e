use abtest_analysis::AnalysisError;
use abtest_data::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
