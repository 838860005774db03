//! Pipeline executor — single-pass ordered reduction over the collection
//!
//! Stages run `Analyze → Process → Generate → OutputHandle`; inside a stage
//! steps run ascending by `step_order`, ties broken by declaration order.
//! No step re-runs, no stage is skipped unless its step list is empty, and
//! each step hands the full collection to the next:
//! `collection_{i+1} = step_i(collection_i)`.

use super::{AnalyzerStep, GeneratorStep, OutputMap, OutputStep, ProcessorStep};
use crate::model::Artifact;
use crate::policy::{EvaluationOutcome, PolicyEvaluation};
use crate::report::{MessageType, ProcessingReporter};
use crate::{GreinaError, GreinaResult};
use serde::{Deserialize, Serialize};

// ─── Step Statistics ────────────────────────────────────────────────

/// Timing and outcome of a single executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepStats {
    pub name: String,
    pub stage: String,
    pub duration_ms: u64,
    pub artifacts_after: usize,
}

// ─── Run Result ─────────────────────────────────────────────────────

/// Everything a completed run exposes for inspection, regardless of outcome
#[derive(Debug)]
pub struct WorkflowResult {
    pub artifacts: Vec<Artifact>,
    pub outputs: OutputMap,
    pub evaluations: Vec<PolicyEvaluation>,
    pub step_stats: Vec<StepStats>,
}

impl WorkflowResult {
    /// Worst outcome across every validation step of the run
    pub fn outcome(&self) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::Passed;
        for evaluation in &self.evaluations {
            match evaluation.outcome() {
                EvaluationOutcome::Failed => return EvaluationOutcome::Failed,
                EvaluationOutcome::PassedWithWarnings => {
                    outcome = EvaluationOutcome::PassedWithWarnings;
                }
                EvaluationOutcome::Passed => {}
            }
        }
        outcome
    }

    /// Escalate a failed outcome into an error, for callers that gate on it
    pub fn into_result(self) -> GreinaResult<Self> {
        match self.outcome() {
            EvaluationOutcome::Failed => {
                let qualifying: usize =
                    self.evaluations.iter().map(|e| e.qualifying().len()).sum();
                Err(GreinaError::EvaluationFailed(format!(
                    "{} violation(s) at or above the fail threshold",
                    qualifying
                )))
            }
            _ => Ok(self),
        }
    }
}

// ─── Pipeline ───────────────────────────────────────────────────────

/// Ordered, single-pass workflow over an artifact collection.
///
/// The pipeline exclusively owns the collection for the duration of a run;
/// a step error aborts the remainder of the run.
#[derive(Default)]
pub struct WorkflowPipeline {
    analyzers: Vec<(i32, Box<dyn AnalyzerStep>)>,
    processors: Vec<(i32, Box<dyn ProcessorStep>)>,
    generators: Vec<(i32, Box<dyn GeneratorStep>)>,
    output_handlers: Vec<(i32, Box<dyn OutputStep>)>,
}

impl WorkflowPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_analyzer(mut self, step_order: i32, step: Box<dyn AnalyzerStep>) -> Self {
        self.analyzers.push((step_order, step));
        self
    }

    pub fn add_processor(mut self, step_order: i32, step: Box<dyn ProcessorStep>) -> Self {
        self.processors.push((step_order, step));
        self
    }

    pub fn add_generator(mut self, step_order: i32, step: Box<dyn GeneratorStep>) -> Self {
        self.generators.push((step_order, step));
        self
    }

    pub fn add_output_handler(mut self, step_order: i32, step: Box<dyn OutputStep>) -> Self {
        self.output_handlers.push((step_order, step));
        self
    }

    /// Execute all four stages once, in order.
    ///
    /// Artifacts produced by Analyze that violate the identity invariant
    /// (no coordinates and not proprietary) are reported, not dropped; the
    /// decision what to do with them belongs to the rules.
    pub fn run(mut self, reporter: &dyn ProcessingReporter) -> GreinaResult<WorkflowResult> {
        // sort_by_key is stable: equal orders keep declaration order
        self.analyzers.sort_by_key(|(order, _)| *order);
        self.processors.sort_by_key(|(order, _)| *order);
        self.generators.sort_by_key(|(order, _)| *order);
        self.output_handlers.sort_by_key(|(order, _)| *order);

        tracing::info!("═══════════════════════════════════════════════════════");
        tracing::info!(
            "Workflow run: {} analyzer(s), {} processor(s), {} generator(s), {} output handler(s)",
            self.analyzers.len(),
            self.processors.len(),
            self.generators.len(),
            self.output_handlers.len()
        );
        tracing::info!("═══════════════════════════════════════════════════════");

        let mut step_stats = Vec::new();
        let mut artifacts: Vec<Artifact> = Vec::new();

        // ── Stage 1: Analyze ──
        for (_, step) in &mut self.analyzers {
            let start = std::time::Instant::now();
            tracing::info!("→ [analyze] {}", step.name());
            let produced = step.analyze()?;
            tracing::info!("  ✓ {} produced {} artifact(s)", step.name(), produced.len());
            artifacts.extend(produced);
            step_stats.push(StepStats {
                name: step.name().to_string(),
                stage: "analyze".into(),
                duration_ms: start.elapsed().as_millis() as u64,
                artifacts_after: artifacts.len(),
            });
        }

        for artifact in artifacts.iter().filter(|a| !a.has_identity()) {
            reporter.report(
                Some(artifact.analysis_source()),
                MessageType::MissingCoordinates,
                "analyzer produced an artifact with no coordinates that is not marked proprietary",
            );
        }

        // ── Stage 2: Process ──
        let mut evaluations = Vec::new();
        for (_, step) in &mut self.processors {
            let start = std::time::Instant::now();
            tracing::info!("→ [process] {}", step.name());
            artifacts = step.process(artifacts)?;
            tracing::info!(
                "  ✓ {} done, {} artifact(s) remain",
                step.name(),
                artifacts.len()
            );
            if let Some(evaluation) = step.evaluation() {
                evaluations.push(evaluation.clone());
            }
            step_stats.push(StepStats {
                name: step.name().to_string(),
                stage: "process".into(),
                duration_ms: start.elapsed().as_millis() as u64,
                artifacts_after: artifacts.len(),
            });
        }

        // ── Stage 3: Generate ──
        let mut outputs = OutputMap::new();
        for (_, step) in &mut self.generators {
            let start = std::time::Instant::now();
            tracing::info!("→ [generate] {}", step.name());
            let generated = step.generate(&artifacts, &evaluations)?;
            tracing::info!("  ✓ {} emitted {} output(s)", step.name(), generated.len());
            outputs.extend(generated);
            step_stats.push(StepStats {
                name: step.name().to_string(),
                stage: "generate".into(),
                duration_ms: start.elapsed().as_millis() as u64,
                artifacts_after: artifacts.len(),
            });
        }

        // ── Stage 4: OutputHandle ──
        for (_, step) in &mut self.output_handlers {
            let start = std::time::Instant::now();
            tracing::info!("→ [output] {}", step.name());
            step.handle(&outputs)?;
            tracing::info!("  ✓ {} done", step.name());
            step_stats.push(StepStats {
                name: step.name().to_string(),
                stage: "output".into(),
                duration_ms: start.elapsed().as_millis() as u64,
                artifacts_after: artifacts.len(),
            });
        }

        let result = WorkflowResult {
            artifacts,
            outputs,
            evaluations,
            step_stats,
        };
        tracing::info!(
            "Workflow complete: {} artifact(s), outcome {:?}",
            result.artifacts.len(),
            result.outcome()
        );
        Ok(result)
    }
}
