//! Analyze step: import artifacts from a JSON dependency export
//!
//! Accepts the flat export format most dependency extractors can produce:
//!
//! ```json
//! {
//!   "source": "maven-export",
//!   "dependencies": [
//!     {"type": "maven", "namespace": "org.x", "name": "lib",
//!      "version": "1.0", "license": "MIT", "filename": "lib-1.0.jar"}
//!   ]
//! }
//! ```
//!
//! A dependency with an unparseable license is imported without a license
//! fact and reported, so the run continues with degraded data; a missing
//! input file is fatal because the step has nothing to analyze at all.

use crate::model::{
    Artifact, ArtifactFact, Coordinate, CoordinateType, LicenseExpression, LicenseScope,
    MatchState,
};
use crate::report::{MessageType, ProcessingReporter};
use crate::workflow::{AnalyzerStep, StepConfig, WorkflowStep};
use crate::{GreinaError, GreinaResult};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

// ─── Export Format ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DependencyExport {
    #[serde(default)]
    source: Option<String>,
    dependencies: Vec<DependencyEntry>,
}

#[derive(Debug, Deserialize)]
struct DependencyEntry {
    #[serde(rename = "type")]
    coordinate_type: CoordinateType,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    proprietary: bool,
}

// ─── Step ───────────────────────────────────────────────────────────

/// Imports one JSON export file into the artifact collection
pub struct JsonDependencyAnalyzer {
    reporter: Arc<dyn ProcessingReporter>,
    input_file: Option<PathBuf>,
    analysis_source: Option<String>,
}

impl JsonDependencyAnalyzer {
    pub fn new(reporter: Arc<dyn ProcessingReporter>) -> Self {
        Self {
            reporter,
            input_file: None,
            analysis_source: None,
        }
    }

    fn entry_to_artifact(&self, entry: &DependencyEntry, source: &str) -> Artifact {
        let coordinate = Coordinate::new(
            entry.coordinate_type,
            entry.namespace.as_deref(),
            entry.name.as_deref(),
            entry.version.as_deref(),
        );
        let mut artifact = Artifact::new(source);
        if !coordinate.is_empty() {
            let identifier = coordinate.to_string();
            artifact.add_fact(ArtifactFact::coordinates(coordinate));
            artifact.add_fact(ArtifactFact::match_state(MatchState::Exact));

            if let Some(text) = &entry.license {
                match LicenseExpression::parse(text) {
                    Ok(expression) => {
                        artifact.add_fact(ArtifactFact::license(LicenseScope::Declared, expression));
                    }
                    Err(e) => self.reporter.report(
                        Some(&identifier),
                        MessageType::UnknownLicense,
                        &format!("unparseable license '{}': {}", text, e),
                    ),
                }
            }
        }
        if entry.filename.is_some() || entry.hash.is_some() {
            artifact.add_fact(ArtifactFact::ArtifactFile {
                filename: entry.filename.clone(),
                path: None,
                hash: entry.hash.clone(),
            });
        }
        artifact.proprietary = entry.proprietary;
        artifact
    }
}

impl WorkflowStep for JsonDependencyAnalyzer {
    fn name(&self) -> &str {
        "JSON dependency import"
    }

    fn configure(&mut self, config: &StepConfig) -> GreinaResult<()> {
        self.input_file = Some(PathBuf::from(config.require("input_file")?));
        self.analysis_source = config.get("analysis_source").map(|s| s.to_string());
        Ok(())
    }
}

impl AnalyzerStep for JsonDependencyAnalyzer {
    fn analyze(&mut self) -> GreinaResult<Vec<Artifact>> {
        let path = self.input_file.clone().ok_or_else(|| {
            GreinaError::Configuration("JSON dependency import was never configured".into())
        })?;

        let content = std::fs::read_to_string(&path).map_err(|e| {
            GreinaError::Processing(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let export: DependencyExport = serde_json::from_str(&content)?;

        let source = self
            .analysis_source
            .clone()
            .or(export.source.clone())
            .unwrap_or_else(|| "json-import".to_string());

        let artifacts: Vec<Artifact> = export
            .dependencies
            .iter()
            .map(|entry| self.entry_to_artifact(entry, &source))
            .collect();

        tracing::info!(
            "Imported {} dependencies from {}",
            artifacts.len(),
            path.display()
        );
        Ok(artifacts)
    }
}
