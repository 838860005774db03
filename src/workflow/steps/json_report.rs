//! Generate step: machine-readable compliance report
//!
//! Renders the processed collection plus every recorded evaluation into one
//! pretty-printed JSON document for CI/CD pipelines and audit trails.

use crate::model::Artifact;
use crate::policy::{EvaluationOutcome, PolicyEvaluation};
use crate::workflow::{GeneratorStep, OutputMap, StepConfig, WorkflowStep};
use crate::GreinaResult;
use serde::Serialize;

/// Default key of the generated output in the outputs map
pub const REPORT_NAME: &str = "compliance-report.json";

#[derive(Serialize)]
struct ComplianceReport<'a> {
    generated_at: String,
    engine_version: &'static str,
    outcome: EvaluationOutcome,
    artifact_count: usize,
    artifacts: &'a [Artifact],
    evaluations: &'a [PolicyEvaluation],
}

pub struct JsonReportGenerator {
    report_name: String,
}

impl JsonReportGenerator {
    pub fn new() -> Self {
        Self {
            report_name: REPORT_NAME.to_string(),
        }
    }
}

impl Default for JsonReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowStep for JsonReportGenerator {
    fn name(&self) -> &str {
        "JSON compliance report"
    }

    fn configure(&mut self, config: &StepConfig) -> GreinaResult<()> {
        if let Some(name) = config.get("report_name") {
            self.report_name = name.to_string();
        }
        Ok(())
    }
}

impl GeneratorStep for JsonReportGenerator {
    fn generate(
        &mut self,
        artifacts: &[Artifact],
        evaluations: &[PolicyEvaluation],
    ) -> GreinaResult<OutputMap> {
        let outcome = evaluations
            .iter()
            .map(|e| e.outcome())
            .max_by_key(|o| match o {
                EvaluationOutcome::Passed => 0,
                EvaluationOutcome::PassedWithWarnings => 1,
                EvaluationOutcome::Failed => 2,
            })
            .unwrap_or(EvaluationOutcome::Passed);

        let report = ComplianceReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            engine_version: env!("CARGO_PKG_VERSION"),
            outcome,
            artifact_count: artifacts.len(),
            artifacts,
            evaluations,
        };

        let mut outputs = OutputMap::new();
        outputs.insert(self.report_name.clone(), serde_json::to_string_pretty(&report)?);
        Ok(outputs)
    }
}
