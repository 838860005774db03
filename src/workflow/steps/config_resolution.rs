//! Process steps wrapping configuration resolution and the config lint

use crate::config::{checker, resolver, CompliancePolicy};
use crate::model::Artifact;
use crate::report::ProcessingReporter;
use crate::workflow::{ProcessorStep, StepConfig, WorkflowStep};
use crate::GreinaResult;
use std::path::Path;
use std::sync::Arc;

// ─── Resolution ─────────────────────────────────────────────────────

/// Applies the policy's remove/override/add directives and overlays
pub struct ConfigResolutionStep {
    policy: CompliancePolicy,
    reporter: Arc<dyn ProcessingReporter>,
}

impl ConfigResolutionStep {
    pub fn new(policy: CompliancePolicy, reporter: Arc<dyn ProcessingReporter>) -> Self {
        Self { policy, reporter }
    }
}

impl WorkflowStep for ConfigResolutionStep {
    fn name(&self) -> &str {
        "Configuration resolution"
    }

    fn configure(&mut self, config: &StepConfig) -> GreinaResult<()> {
        // An explicit policy file replaces the constructed policy
        if let Some(path) = config.get("policy_file") {
            self.policy = CompliancePolicy::from_file(Path::new(path))?;
        }
        self.policy.validate()
    }
}

impl ProcessorStep for ConfigResolutionStep {
    fn process(&mut self, artifacts: Vec<Artifact>) -> GreinaResult<Vec<Artifact>> {
        resolver::apply_policy(artifacts, &self.policy, self.reporter.as_ref())
    }
}

// ─── Lint ───────────────────────────────────────────────────────────

/// Reports configured selectors that match nothing. Schedule it before the
/// resolution step, against the collection the directives will see.
pub struct ConfigCheckStep {
    policy: CompliancePolicy,
    reporter: Arc<dyn ProcessingReporter>,
}

impl ConfigCheckStep {
    pub fn new(policy: CompliancePolicy, reporter: Arc<dyn ProcessingReporter>) -> Self {
        Self { policy, reporter }
    }
}

impl WorkflowStep for ConfigCheckStep {
    fn name(&self) -> &str {
        "Configuration check"
    }
}

impl ProcessorStep for ConfigCheckStep {
    fn process(&mut self, artifacts: Vec<Artifact>) -> GreinaResult<Vec<Artifact>> {
        checker::check_policy(&self.policy, &artifacts, self.reporter.as_ref());
        Ok(artifacts)
    }
}
