//! Two-arm experiment analysis.
//!
//! An [`ExperimentAnalyzer`] is built once per analysis from a control and a
//! treatment [`Sample`] and answers every statistic the decision report
//! needs. It holds no interior state, so concurrent hosts simply build one
//! per request.
//!
//! ```ignore
//! use abtest_analysis::ExperimentAnalyzer;
//! let control = [0u8, 1, 0, 0];
//! let treatment = [1u8, 1, 0, 0];
//! let analyzer = ExperimentAnalyzer::load(control, treatment)?;
//! let report = analyzer.report()?;
//! println!("{report}");
//! ```
pub mod analyzer;
pub mod error;
pub mod format;
pub mod planner;
pub mod report;
pub mod sample;

pub use analyzer::{ExperimentAnalyzer, DEFAULT_ALPHA};
pub use error::AnalysisError;
pub use planner::SampleSizePlanner;
pub use report::{Metric, MetricValue, Report};
pub use sample::{Arm, Sample};
