//! Validation step: run the rule engine and record the evaluation
//!
//! Loads the configured rulesets from the registry at configure time (an
//! unknown name fails the run before anything executes), evaluates them
//! over the processed collection, and forwards every qualifying violation
//! to the reporter. The pass/fail decision itself surfaces through the
//! pipeline result, so generators downstream still see the evaluation.

use crate::model::Artifact;
use crate::policy::rulesets::IGNORE_SOURCES_FLAG;
use crate::policy::{PolicyEvaluation, RuleEngine, RulesetRegistry, Severity};
use crate::report::{MessageType, ProcessingReporter};
use crate::workflow::{ProcessorStep, StepConfig, WorkflowStep};
use crate::{GreinaError, GreinaResult};
use std::sync::Arc;

pub struct ComplianceCheckStep {
    registry: RulesetRegistry,
    reporter: Arc<dyn ProcessingReporter>,
    engine: Option<RuleEngine>,
    fail_on: Severity,
    evaluation: Option<PolicyEvaluation>,
}

impl ComplianceCheckStep {
    /// Uses the crate's built-in ruleset registry
    pub fn new(reporter: Arc<dyn ProcessingReporter>) -> Self {
        Self::with_registry(RulesetRegistry::with_builtins(), reporter)
    }

    /// Uses a caller-supplied registry (for custom rulesets)
    pub fn with_registry(registry: RulesetRegistry, reporter: Arc<dyn ProcessingReporter>) -> Self {
        Self {
            registry,
            reporter,
            engine: None,
            fail_on: Severity::Fail,
            evaluation: None,
        }
    }
}

impl WorkflowStep for ComplianceCheckStep {
    fn name(&self) -> &str {
        "Compliance check"
    }

    fn configure(&mut self, config: &StepConfig) -> GreinaResult<()> {
        let names: Vec<String> = config
            .require("rulesets")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            return Err(GreinaError::Configuration(
                "Step configuration key 'rulesets' names no rulesets".into(),
            ));
        }

        let rulesets = self.registry.load_all(&names)?;
        self.engine = Some(RuleEngine::from_rulesets(&rulesets)?);

        if let Some(value) = config.get("fail_on") {
            self.fail_on = value.parse()?;
        }
        Ok(())
    }
}

impl ProcessorStep for ComplianceCheckStep {
    fn process(&mut self, artifacts: Vec<Artifact>) -> GreinaResult<Vec<Artifact>> {
        let engine = self.engine.as_ref().ok_or_else(|| {
            GreinaError::Configuration("Compliance check was never configured".into())
        })?;

        // Degraded-data conditions are reported even when no rule turns
        // them into a violation
        for artifact in artifacts.iter().filter(|a| !a.proprietary) {
            let identifier = artifact.display_identity();
            if artifact.final_license().is_none() {
                self.reporter.report(
                    Some(&identifier),
                    MessageType::MissingLicenseInformation,
                    "no license information from any source",
                );
            }
            if artifact.source_archive().is_none() && !artifact.has_flag(IGNORE_SOURCES_FLAG) {
                self.reporter.report(
                    Some(&identifier),
                    MessageType::MissingSources,
                    "no source archive resolved",
                );
            }
        }

        let violations = engine.evaluate(&artifacts);
        let evaluation =
            PolicyEvaluation::new(engine.ruleset_names().to_vec(), violations, self.fail_on);

        // Qualifying violations go to the reporter before any failure
        // decision is acted upon
        for violation in evaluation.qualifying() {
            self.reporter.report(
                violation.artifacts.first().map(|s| s.as_str()),
                MessageType::RuleEngine,
                &violation.to_string(),
            );
        }

        tracing::info!(
            "Compliance check: {} violation(s), {} at or above {}",
            evaluation.violations.len(),
            evaluation.qualifying().len(),
            self.fail_on
        );

        self.evaluation = Some(evaluation);
        Ok(artifacts)
    }

    fn evaluation(&self) -> Option<&PolicyEvaluation> {
        self.evaluation.as_ref()
    }
}
