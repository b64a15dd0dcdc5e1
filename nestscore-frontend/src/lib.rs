pub mod cli;
pub mod discovery;
pub mod errors;
pub mod inspect;
pub mod loader;
pub mod report;
pub mod runner;

pub use errors::FrontendError;
pub use loader::{ComparisonReport, compare_files, load_drawing};
pub use report::ReportFormat;
