//! Workflow steps — typed stages over a shared artifact collection
//!
//! Steps belong to one of four ordered categories: Analyze produces the
//! initial collection, Process mutates it (validation steps additionally
//! produce a policy evaluation), Generate renders outputs from it, and
//! OutputHandle disposes of the outputs. Each step is configured from a
//! string map before execution and must fail fast on missing required keys.

pub mod pipeline;
pub mod steps;

use crate::model::Artifact;
use crate::policy::PolicyEvaluation;
use crate::{GreinaError, GreinaResult};
use std::collections::BTreeMap;

// ─── Step Configuration ─────────────────────────────────────────────

/// Key/value configuration handed to one step, interpreted only by it
#[derive(Debug, Clone, Default)]
pub struct StepConfig {
    values: BTreeMap<String, String>,
}

impl StepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Missing required keys are configuration errors, never silent defaults
    pub fn require(&self, key: &str) -> GreinaResult<&str> {
        self.get(key).ok_or_else(|| {
            GreinaError::Configuration(format!("Missing required step configuration key '{}'", key))
        })
    }
}

impl FromIterator<(String, String)> for StepConfig {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// ─── Outputs ────────────────────────────────────────────────────────

/// Generated outputs keyed by a stable name (e.g. `"compliance-report.json"`)
pub type OutputMap = BTreeMap<String, String>;

// ─── Step Traits ────────────────────────────────────────────────────

/// Common surface of every workflow step
pub trait WorkflowStep {
    fn name(&self) -> &str;

    /// Validate and absorb this step's configuration.
    /// Must fail fast on missing or invalid required keys.
    fn configure(&mut self, _config: &StepConfig) -> GreinaResult<()> {
        Ok(())
    }
}

/// Analyze stage: discover dependencies and produce artifacts.
/// Every produced artifact must carry an `analysis_source` label.
pub trait AnalyzerStep: WorkflowStep {
    fn analyze(&mut self) -> GreinaResult<Vec<Artifact>>;
}

/// Process stage: take ownership of the collection, return the (possibly
/// mutated or filtered) collection for the next step.
pub trait ProcessorStep: WorkflowStep {
    fn process(&mut self, artifacts: Vec<Artifact>) -> GreinaResult<Vec<Artifact>>;

    /// Validation steps return the evaluation they produced; plain
    /// processing steps return `None`.
    fn evaluation(&self) -> Option<&PolicyEvaluation> {
        None
    }
}

/// Generate stage: render outputs from the fully processed collection
pub trait GeneratorStep: WorkflowStep {
    fn generate(
        &mut self,
        artifacts: &[Artifact],
        evaluations: &[PolicyEvaluation],
    ) -> GreinaResult<OutputMap>;
}

/// OutputHandle stage: dispose of the generated outputs
pub trait OutputStep: WorkflowStep {
    fn handle(&mut self, outputs: &OutputMap) -> GreinaResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_fails_fast() {
        let config = StepConfig::new().with("present", "x");
        assert_eq!(config.require("present").unwrap(), "x");
        let err = config.require("absent").unwrap_err();
        assert!(matches!(err, GreinaError::Configuration(_)));
        assert!(err.to_string().contains("absent"));
    }
}
