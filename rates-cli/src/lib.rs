pub mod app;
pub mod logging;
pub mod render;

pub use app::{Cli, OutputFormat, YearSelection, run};
