//! # greina — Dependency Compliance Workflow Engine
//!
//! Analyzes a project's third-party dependencies and evaluates them against
//! configurable license/security policies.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     WorkflowPipeline                         │
//! │  ┌─────────┐ ┌──────────────┐ ┌──────────┐ ┌─────────────┐  │
//! │  │ Analyze │→│   Process    │→│ Generate │→│OutputHandle │  │
//! │  │ (import)│ │ (directives, │ │ (reports)│ │  (writers)  │  │
//! │  │         │ │  rule engine)│ │          │ │             │  │
//! │  └─────────┘ └──────────────┘ └──────────┘ └─────────────┘  │
//! │       │              │                                      │
//! │  ┌────▼──────────────▼────────────────────────────────────┐ │
//! │  │  Vec<Artifact> — fact store (coordinates, licenses,    │ │
//! │  │  match confidence, issues, locations), merge-on-add    │ │
//! │  └────────────────────────┬───────────────────────────────┘ │
//! │                           │                                 │
//! │  ┌────────────────────────▼───────────────────────────────┐ │
//! │  │ RulesetRegistry → Single/Compare executors → violations│ │
//! │  │         grouped by severity → pass / warn / fail       │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Capabilities
//!
//! - **Fact-based artifact model**: typed facts with defined merge precedence
//! - **Selector algebra**: wildcard identity matching for configuration
//!   directives and rule targeting
//! - **Deterministic workflow**: single-pass ordered execution of configured
//!   steps over a shared artifact collection
//! - **Configuration reconciliation**: remove/override/add directives plus
//!   selector-keyed overlays, applied before validation
//! - **Policy engine**: named rulesets, single-artifact and pairwise rules,
//!   severity-aggregated pass/fail decisions

pub mod config;
pub mod model;
pub mod policy;
pub mod report;
pub mod workflow;

// Re-exports for convenience
pub use config::CompliancePolicy;
pub use model::coordinate::{Coordinate, CoordinateType};
pub use model::selector::CoordinateSelector;
pub use model::Artifact;
pub use policy::{EvaluationOutcome, PolicyEvaluation, PolicyViolation, Severity};
pub use report::{MessageCollector, MessageType, ProcessingReporter};
pub use workflow::pipeline::WorkflowPipeline;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreinaError {
    /// Invalid or missing configuration. Raised at configure time, never
    /// deferred to evaluation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A step could not complete its declared contract.
    #[error("Processing error: {0}")]
    Processing(String),

    /// The run accumulated violations at or above the fail threshold.
    #[error("Compliance evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Policy file error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type GreinaResult<T> = Result<T, GreinaError>;
