//! Building blocks of the `abtest` command-line tool: the TOML
//! configuration, the dashboard model and its text, SVG and JSON renderers.
pub mod config;
pub mod dashboard;
pub mod error;
pub mod render;

pub use config::{generate_config, load_config, parse_config, DashboardConfig};
pub use dashboard::{interpretation, Dashboard};
pub use error::DashboardError;
