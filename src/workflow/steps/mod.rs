//! Bundled workflow steps — one concrete implementation per stage

pub mod compliance_check;
pub mod config_resolution;
pub mod disk_writer;
pub mod json_import;
pub mod json_report;

pub use compliance_check::ComplianceCheckStep;
pub use config_resolution::{ConfigCheckStep, ConfigResolutionStep};
pub use disk_writer::DiskWriter;
pub use json_import::JsonDependencyAnalyzer;
pub use json_report::JsonReportGenerator;
