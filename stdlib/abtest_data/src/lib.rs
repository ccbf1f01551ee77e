//! Synthetic data for two-arm conversion experiments.
//!
//! The generator is seeded explicitly and takes the end of its time window
//! as an argument, so the same configuration always yields the same rows.
//! Generated data round-trips through CSV with the columns
//! `user_id,group,timestamp,conversion`.
pub mod csv_io;
pub mod error;
pub mod generator;
pub mod record;

pub use csv_io::{load_csv, read_csv, save_csv, write_csv, DEFAULT_CSV_PATH};
pub use error::DataError;
pub use generator::{generate_experiment, simulate_outcomes, GeneratorConfig};
pub use record::{ArmSummary, DataSummary, ExperimentData, ExperimentRecord};
