//! Rule executors — one per rule arity, batched over the artifact collection
//!
//! The single-artifact executor runs every rule once per artifact (O(n·r)).
//! The compare executor runs every rule over all unordered pairs, excluding
//! self-pairs (O(n²·r)); the pairwise pass is embarrassingly parallel and
//! runs on rayon workers, so callers must not rely on violation order.
//! There is no short-circuiting: all rules run against all eligible inputs.

use super::{CompareArtifactRule, PolicyViolation, Rule, Ruleset, SingleArtifactRule};
use crate::model::Artifact;
use crate::{GreinaError, GreinaResult};
use rayon::prelude::*;

// ─── Single-Artifact Executor ───────────────────────────────────────

/// Batches all single-artifact rules and evaluates each once per artifact
#[derive(Default)]
pub struct SingleArtifactExecutor {
    rules: Vec<Box<dyn SingleArtifactRule>>,
}

impl SingleArtifactExecutor {
    pub fn new(rules: Vec<Box<dyn SingleArtifactRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn evaluate(&self, artifacts: &[Artifact]) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();
        for artifact in artifacts {
            for rule in &self.rules {
                violations.extend(rule.evaluate(artifact));
            }
        }
        violations
    }
}

// ─── Compare Executor ───────────────────────────────────────────────

/// Batches all compare rules and evaluates each over all unordered pairs
#[derive(Default)]
pub struct CompareArtifactExecutor {
    rules: Vec<Box<dyn CompareArtifactRule>>,
}

impl CompareArtifactExecutor {
    pub fn new(rules: Vec<Box<dyn CompareArtifactRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of pair evaluations per rule for a collection of size `n`
    pub fn pair_count(n: usize) -> usize {
        n * n.saturating_sub(1) / 2
    }

    pub fn evaluate(&self, artifacts: &[Artifact]) -> Vec<PolicyViolation> {
        let n = artifacts.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        pairs
            .par_iter()
            .flat_map_iter(|&(i, j)| {
                self.rules
                    .iter()
                    .filter_map(move |rule| rule.evaluate(&artifacts[i], &artifacts[j]))
            })
            .collect()
    }
}

// ─── Rule Engine ────────────────────────────────────────────────────

/// The executors built from one or more loaded rulesets
pub struct RuleEngine {
    single: SingleArtifactExecutor,
    compare: CompareArtifactExecutor,
    ruleset_names: Vec<String>,
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("single_rules", &self.single.rule_count())
            .field("compare_rules", &self.compare.rule_count())
            .field("ruleset_names", &self.ruleset_names)
            .finish()
    }
}

impl RuleEngine {
    /// Partition the rulesets' rules by arity into executors.
    ///
    /// A ruleset yielding no rules at all is a configuration error: a
    /// ruleset that cannot produce an executor can never affect a decision,
    /// so loading it is a mistake worth failing fast on.
    pub fn from_rulesets(rulesets: &[Box<dyn Ruleset>]) -> GreinaResult<Self> {
        let mut single = Vec::new();
        let mut compare = Vec::new();
        let mut ruleset_names = Vec::new();

        for ruleset in rulesets {
            let rules = ruleset.rules();
            if rules.is_empty() {
                return Err(GreinaError::Configuration(format!(
                    "Ruleset '{}' (version {}) yields no rules",
                    ruleset.name(),
                    ruleset.version()
                )));
            }
            ruleset_names.push(format!("{}:{}", ruleset.name(), ruleset.version()));
            for rule in rules {
                match rule {
                    Rule::Single(r) => single.push(r),
                    Rule::Compare(r) => compare.push(r),
                }
            }
        }

        Ok(Self {
            single: SingleArtifactExecutor::new(single),
            compare: CompareArtifactExecutor::new(compare),
            ruleset_names,
        })
    }

    pub fn ruleset_names(&self) -> &[String] {
        &self.ruleset_names
    }

    /// Run every rule against every eligible input and collect all
    /// violations. Order of the returned collection is unspecified.
    pub fn evaluate(&self, artifacts: &[Artifact]) -> Vec<PolicyViolation> {
        tracing::info!(
            "Rule engine: {} single rules, {} compare rules over {} artifacts",
            self.single.rule_count(),
            self.compare.rule_count(),
            artifacts.len()
        );

        let mut violations = self.single.evaluate(artifacts);
        violations.extend(self.compare.evaluate(artifacts));
        violations
    }
}
