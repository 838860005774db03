//! Policy engine — rulesets, rule arities, severity-aggregated decisions
//!
//! Rulesets bundle rules of two arities: single-artifact predicates and
//! pairwise comparisons. Evaluating a rule yields an optional violation;
//! violations aggregate by severity, and the configured `fail_on` threshold
//! decides whether the run passes, passes with warnings, or fails.

pub mod executor;
pub mod registry;
pub mod rulesets;

pub use executor::{CompareArtifactExecutor, RuleEngine, SingleArtifactExecutor};
pub use registry::RulesetRegistry;

use crate::model::Artifact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─── Severity ───────────────────────────────────────────────────────

/// Ordered violation level controlling pass/fail decisions.
///
/// The ordering `Info < Warn < Error < Fail` is a domain invariant, pinned
/// by an explicit test below, not an accident of declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
    Fail,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = crate::GreinaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "FAIL" => Ok(Self::Fail),
            other => Err(crate::GreinaError::Configuration(format!(
                "Unknown severity '{}' (expected INFO, WARN, ERROR, or FAIL)",
                other
            ))),
        }
    }
}

// ─── Rules ──────────────────────────────────────────────────────────

/// A rule evaluated against one artifact at a time
pub trait SingleArtifactRule: Send + Sync {
    /// Stable identifier used in violations and reports
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn severity(&self) -> Severity;

    /// `Some` means the rule's precondition is violated by this artifact
    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation>;
}

/// A rule evaluated against ordered pairs of artifacts.
///
/// The engine feeds each unordered pair once, in collection order; a rule
/// whose predicate is asymmetric must check both directions itself.
pub trait CompareArtifactRule: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn severity(&self) -> Severity;

    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Option<PolicyViolation>;
}

/// A rule of either arity, as yielded by a ruleset
pub enum Rule {
    Single(Box<dyn SingleArtifactRule>),
    Compare(Box<dyn CompareArtifactRule>),
}

/// A named, versioned collection of rules
pub trait Ruleset: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn rules(&self) -> Vec<Rule>;
}

impl fmt::Debug for dyn Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ruleset({}:{})", self.name(), self.version())
    }
}

// ─── Violations ─────────────────────────────────────────────────────

/// One rule firing against one artifact (or pair of artifacts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub description: String,
    /// Display identities of the offending artifact(s)
    pub artifacts: Vec<String>,
}

impl PolicyViolation {
    pub fn single(
        rule: &dyn SingleArtifactRule,
        artifact: &Artifact,
        description: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule.id().to_string(),
            rule_name: rule.name().to_string(),
            severity: rule.severity(),
            description: description.into(),
            artifacts: vec![artifact.display_identity()],
        }
    }

    pub fn pair(
        rule: &dyn CompareArtifactRule,
        left: &Artifact,
        right: &Artifact,
        description: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule.id().to_string(),
            rule_name: rule.name().to_string(),
            severity: rule.severity(),
            description: description.into(),
            artifacts: vec![left.display_identity(), right.display_identity()],
        }
    }

    /// True when this violation's subjects include the given artifact
    pub fn references(&self, artifact: &Artifact) -> bool {
        let identity = artifact.display_identity();
        self.artifacts.iter().any(|a| *a == identity)
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity,
            self.rule_id,
            self.artifacts.join(", "),
            self.description
        )
    }
}

// ─── Evaluation Result ──────────────────────────────────────────────

/// Final state of a compliance run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// No qualifying violations
    Passed,
    /// Violations present, all below the fail threshold
    PassedWithWarnings,
    /// Violations at or above the fail threshold
    Failed,
}

/// Aggregated result of evaluating rulesets over the artifact collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEvaluation {
    pub rulesets: Vec<String>,
    pub violations: Vec<PolicyViolation>,
    pub fail_on: Severity,
}

impl PolicyEvaluation {
    pub fn new(rulesets: Vec<String>, violations: Vec<PolicyViolation>, fail_on: Severity) -> Self {
        Self {
            rulesets,
            violations,
            fail_on,
        }
    }

    /// Violations grouped by severity
    pub fn by_severity(&self) -> BTreeMap<Severity, Vec<&PolicyViolation>> {
        let mut grouped: BTreeMap<Severity, Vec<&PolicyViolation>> = BTreeMap::new();
        for v in &self.violations {
            grouped.entry(v.severity).or_default().push(v);
        }
        grouped
    }

    /// Violations at or above the fail threshold
    pub fn qualifying(&self) -> Vec<&PolicyViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity >= self.fail_on)
            .collect()
    }

    pub fn outcome(&self) -> EvaluationOutcome {
        if !self.qualifying().is_empty() {
            EvaluationOutcome::Failed
        } else if !self.violations.is_empty() {
            EvaluationOutcome::PassedWithWarnings
        } else {
            EvaluationOutcome::Passed
        }
    }
}
