//! Compliance configuration — directives reconciling analysis results
//!
//! A [`CompliancePolicy`] is the resolved configuration source: remove
//! selectors, override directives, synthetic add directives, and
//! selector-keyed overlays. It loads from a `greina.toml` file; any other
//! origin format is outside this crate — hand a ready-made structure to the
//! resolver instead.

pub mod checker;
pub mod resolver;

use crate::model::{
    Artifact, ArtifactFact, Coordinate, CoordinateSelector, LicenseExpression, LicenseScope,
    MatchState, SecurityIssue, CONFIGURATION_SOURCE,
};
use crate::{GreinaError, GreinaResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default policy file name looked up in the project root
pub const POLICY_FILE: &str = "greina.toml";

// ─── Directives ─────────────────────────────────────────────────────

/// Declarative description of an artifact, as written in configuration.
/// Turns into a real [`Artifact`] for add/override directives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactDirective {
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
    /// License expression text, e.g. `"MIT OR Apache-2.0"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default)]
    pub proprietary: bool,
}

impl ArtifactDirective {
    /// Materialize the directive. Added artifacts are tagged as exact
    /// matches from the configuration source.
    pub fn to_artifact(&self) -> GreinaResult<Artifact> {
        let mut artifact = Artifact::new(CONFIGURATION_SOURCE);
        for coordinate in &self.coordinates {
            artifact.add_fact(ArtifactFact::coordinates(coordinate.clone()));
        }
        if let Some(text) = &self.declared_license {
            artifact.add_fact(ArtifactFact::license(
                LicenseScope::Declared,
                parse_license(text)?,
            ));
        }
        if let Some(statement) = &self.copyright {
            artifact.add_fact(ArtifactFact::Copyright {
                statement: Some(statement.clone()),
            });
        }
        artifact.add_fact(ArtifactFact::match_state(MatchState::Exact));
        artifact.proprietary = self.proprietary;
        Ok(artifact)
    }
}

/// Replace analyzed data for matching artifacts with configured data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideDirective {
    pub selector: CoordinateSelector,
    pub artifact: ArtifactDirective,
}

/// Force the effective license of matching artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseOverlay {
    pub selector: CoordinateSelector,
    /// License expression text; becomes the configured-license fact
    pub license: String,
}

/// Attach known security issues to matching artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueOverlay {
    pub selector: CoordinateSelector,
    pub issues: Vec<SecurityIssue>,
}

// ─── Policy ─────────────────────────────────────────────────────────

/// The full directive set applied during the Process stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompliancePolicy {
    /// Artifacts matched by these selectors are dropped
    #[serde(default)]
    pub remove: Vec<CoordinateSelector>,

    /// Configured data merged over analyzed data, configured side winning
    #[serde(default, rename = "override")]
    pub overrides: Vec<OverrideDirective>,

    /// Synthetic artifacts appended after removal and overriding
    #[serde(default)]
    pub add: Vec<ArtifactDirective>,

    /// Configured-license overlays, strongest slot in the precedence chain
    #[serde(default)]
    pub final_licenses: Vec<LicenseOverlay>,

    /// Security issue overlays
    #[serde(default)]
    pub security_issues: Vec<IssueOverlay>,

    /// Matching artifacts are exempted from source resolution checks
    #[serde(default)]
    pub ignore_for_source_resolving: Vec<CoordinateSelector>,
}

impl CompliancePolicy {
    /// Load and validate a policy file
    pub fn from_file(path: &Path) -> GreinaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> GreinaResult<Self> {
        let policy: CompliancePolicy = toml::from_str(content)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Try the project root, fall back to an empty policy
    pub fn from_project_root(root: &Path) -> Self {
        let policy_path = root.join(POLICY_FILE);
        if policy_path.exists() {
            match Self::from_file(&policy_path) {
                Ok(policy) => {
                    tracing::info!("Loaded compliance policy from {}", policy_path.display());
                    return policy;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load {}: {} — using empty policy",
                        policy_path.display(),
                        e
                    );
                }
            }
        }
        Self::default()
    }

    /// Fail fast on anything a directive cannot express: unparseable
    /// license expressions must never surface at apply time.
    pub fn validate(&self) -> GreinaResult<()> {
        for directive in self.overrides.iter().map(|o| &o.artifact).chain(&self.add) {
            if let Some(text) = &directive.declared_license {
                parse_license(text)?;
            }
        }
        for overlay in &self.final_licenses {
            parse_license(&overlay.license)?;
        }
        Ok(())
    }

    /// Every selector written in this policy, for the configuration checker
    pub fn all_selectors(&self) -> Vec<(&'static str, &CoordinateSelector)> {
        let mut selectors: Vec<(&'static str, &CoordinateSelector)> = Vec::new();
        selectors.extend(self.remove.iter().map(|s| ("remove", s)));
        selectors.extend(self.overrides.iter().map(|o| ("override", &o.selector)));
        selectors.extend(self.final_licenses.iter().map(|o| ("final_licenses", &o.selector)));
        selectors.extend(self.security_issues.iter().map(|o| ("security_issues", &o.selector)));
        selectors.extend(
            self.ignore_for_source_resolving
                .iter()
                .map(|s| ("ignore_for_source_resolving", s)),
        );
        selectors
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_empty()
            && self.overrides.is_empty()
            && self.add.is_empty()
            && self.final_licenses.is_empty()
            && self.security_issues.is_empty()
            && self.ignore_for_source_resolving.is_empty()
    }
}

pub(crate) fn parse_license(text: &str) -> GreinaResult<LicenseExpression> {
    LicenseExpression::parse(text)
        .map_err(|e| GreinaError::Configuration(format!("Bad license expression '{}': {}", text, e)))
}
