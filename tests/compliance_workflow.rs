//! End-to-end compliance workflow suite
//!
//! Drives the full pipeline — JSON import, configuration lint, directive
//! resolution, rule evaluation, report generation, disk output — and pins
//! the properties the engine guarantees: merge precedence direction,
//! wildcard selector universality, license precedence, remove-before-add
//! semantics, severity aggregation, and pairwise rule completeness.

use greina::config::{ArtifactDirective, CompliancePolicy};
use greina::model::{
    Artifact, ArtifactFact, Coordinate, CoordinateSelector, CoordinateType, LicenseExpression,
    LicenseScope, MatchState, CONFIGURATION_SOURCE,
};
use greina::policy::rulesets::CopyleftLicenseRule;
use greina::policy::{
    CompareArtifactRule, EvaluationOutcome, PolicyViolation, Rule, Ruleset, RulesetRegistry,
    Severity, SingleArtifactRule,
};
use greina::report::{MessageCollector, MessageType};
use greina::workflow::steps::{
    ComplianceCheckStep, ConfigCheckStep, ConfigResolutionStep, DiskWriter,
    JsonDependencyAnalyzer, JsonReportGenerator,
};
use greina::workflow::{StepConfig, WorkflowStep};
use greina::WorkflowPipeline;
use std::sync::Arc;

// ─── Helpers ────────────────────────────────────────────────────────

fn licensed_artifact(group: &str, name: &str, version: &str, license: &str) -> Artifact {
    Artifact::new("test-analyzer")
        .with_fact(ArtifactFact::coordinates(Coordinate::maven(group, name, version)))
        .with_fact(ArtifactFact::license(
            LicenseScope::Declared,
            LicenseExpression::atom(license),
        ))
        .with_fact(ArtifactFact::match_state(MatchState::Exact))
}

/// Minimal ruleset: a single copyleft check
struct CheckForGpl;

impl Ruleset for CheckForGpl {
    fn name(&self) -> &str {
        "CheckForGPL"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn rules(&self) -> Vec<Rule> {
        vec![Rule::Single(Box::new(CopyleftLicenseRule))]
    }
}

// ═══════════════════════════════════════════════════════════════════
// Section 1: GPL detection through the rule engine
// ═══════════════════════════════════════════════════════════════════

#[test]
fn gpl_artifact_yields_exactly_one_violation_referencing_it() {
    let reporter = Arc::new(MessageCollector::new());
    let mut registry = RulesetRegistry::empty();
    registry.register("CheckForGPL", || Box::new(CheckForGpl));

    let mut step = ComplianceCheckStep::with_registry(registry, reporter);
    step.configure(&StepConfig::new().with("rulesets", "CheckForGPL"))
        .unwrap();

    let a = licensed_artifact("org.x", "lib", "1.0", "GPL-2.0-only");
    let b = licensed_artifact("org.y", "lib2", "2.0", "MIT");

    use greina::workflow::ProcessorStep;
    step.process(vec![a.clone(), b.clone()]).unwrap();

    let evaluation = step.evaluation().unwrap();
    assert_eq!(evaluation.violations.len(), 1);
    assert!(evaluation.violations[0].references(&a));
    assert!(!evaluation.violations[0].references(&b));
    assert_eq!(evaluation.outcome(), EvaluationOutcome::Failed);
}

// ═══════════════════════════════════════════════════════════════════
// Section 2: Directive semantics
// ═══════════════════════════════════════════════════════════════════

#[test]
fn remove_then_add_under_same_selector_keeps_configuration_source() {
    let reporter = Arc::new(MessageCollector::new());
    let policy = CompliancePolicy {
        remove: vec![CoordinateSelector::of_type(CoordinateType::Maven)
            .with_namespace("org.x")
            .with_name("lib")],
        add: vec![ArtifactDirective {
            coordinates: vec![Coordinate::maven("org.x", "lib", "1.0")],
            declared_license: Some("Apache-2.0".into()),
            ..Default::default()
        }],
        ..Default::default()
    };

    use greina::workflow::ProcessorStep;
    let mut step = ConfigResolutionStep::new(policy, reporter);
    let result = step
        .process(vec![licensed_artifact("org.x", "lib", "1.0", "GPL-2.0-only")])
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].analysis_source(), CONFIGURATION_SOURCE);
    assert_eq!(result[0].match_state(), MatchState::Exact);
    // the analyzer's GPL declaration is gone with the removed artifact
    assert_eq!(result[0].final_license().unwrap().to_string(), "Apache-2.0");
}

#[test]
fn all_wildcard_remove_selector_empties_the_collection() {
    // The universal selector is valid and matches everything; a remove
    // directive carrying it therefore removes every artifact. Exercised
    // explicitly so nobody mistakes this for "matches nothing".
    let reporter = Arc::new(MessageCollector::new());
    let policy = CompliancePolicy {
        remove: vec![CoordinateSelector::any()],
        ..Default::default()
    };

    use greina::workflow::ProcessorStep;
    let mut step = ConfigResolutionStep::new(policy, reporter);
    let result = step
        .process(vec![
            licensed_artifact("org.x", "lib", "1.0", "MIT"),
            licensed_artifact("org.y", "lib2", "2.0", "MIT"),
        ])
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn license_precedence_overridden_beats_declared() {
    let mut artifact = licensed_artifact("org.x", "lib", "1.0", "MIT");
    artifact.add_fact(ArtifactFact::license(
        LicenseScope::Overridden,
        LicenseExpression::atom("Apache-2.0"),
    ));
    assert_eq!(artifact.final_license().unwrap().to_string(), "Apache-2.0");
}

#[test]
fn fact_merge_prefers_argument_fields() {
    let f1 = ArtifactFact::license(LicenseScope::Declared, LicenseExpression::atom("MIT"));
    let f2 = ArtifactFact::license(LicenseScope::Declared, LicenseExpression::atom("Apache-2.0"));
    // f2's non-empty field wins, and the direction matters
    assert_ne!(f1.merge_with(&f2), f2.merge_with(&f1));
}

// ═══════════════════════════════════════════════════════════════════
// Section 3: Severity aggregation
// ═══════════════════════════════════════════════════════════════════

struct FixedSeverityRule {
    id: &'static str,
    severity: Severity,
}

impl SingleArtifactRule for FixedSeverityRule {
    fn id(&self) -> &str {
        self.id
    }
    fn name(&self) -> &str {
        self.id
    }
    fn description(&self) -> &str {
        "always fires"
    }
    fn severity(&self) -> Severity {
        self.severity
    }
    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        Some(PolicyViolation::single(self, artifact, "fired"))
    }
}

struct MixedSeverityRules;

impl Ruleset for MixedSeverityRules {
    fn name(&self) -> &str {
        "MixedSeverityRules"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn rules(&self) -> Vec<Rule> {
        vec![
            Rule::Single(Box::new(FixedSeverityRule { id: "info-rule", severity: Severity::Info })),
            Rule::Single(Box::new(FixedSeverityRule { id: "warn-rule", severity: Severity::Warn })),
            Rule::Single(Box::new(FixedSeverityRule { id: "fail-rule", severity: Severity::Fail })),
        ]
    }
}

#[test]
fn fail_on_warn_qualifies_warn_and_fail_violations() {
    let reporter = Arc::new(MessageCollector::new());
    let mut registry = RulesetRegistry::empty();
    registry.register("MixedSeverityRules", || Box::new(MixedSeverityRules));

    let mut step = ComplianceCheckStep::with_registry(registry, reporter.clone());
    step.configure(
        &StepConfig::new()
            .with("rulesets", "MixedSeverityRules")
            .with("fail_on", "WARN"),
    )
    .unwrap();

    use greina::workflow::ProcessorStep;
    step.process(vec![licensed_artifact("org.x", "lib", "1.0", "MIT")])
        .unwrap();

    let evaluation = step.evaluation().unwrap();
    assert_eq!(evaluation.violations.len(), 3);
    // WARN threshold qualifies exactly the WARN and FAIL violations
    let qualifying = evaluation.qualifying();
    assert_eq!(qualifying.len(), 2);
    assert!(qualifying.iter().all(|v| v.severity >= Severity::Warn));
    assert_eq!(evaluation.outcome(), EvaluationOutcome::Failed);
    // and both were forwarded to the reporter
    assert_eq!(reporter.messages_of_type(MessageType::RuleEngine).len(), 2);
}

// ═══════════════════════════════════════════════════════════════════
// Section 4: Pairwise completeness
// ═══════════════════════════════════════════════════════════════════

struct RecordingPairRule {
    pairs: Arc<std::sync::Mutex<Vec<(String, String)>>>,
}

impl CompareArtifactRule for RecordingPairRule {
    fn id(&self) -> &str {
        "recording-pair"
    }
    fn name(&self) -> &str {
        "Recording pair rule"
    }
    fn description(&self) -> &str {
        "records every pair it is fed"
    }
    fn severity(&self) -> Severity {
        Severity::Info
    }
    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Option<PolicyViolation> {
        self.pairs
            .lock()
            .unwrap()
            .push((left.display_identity(), right.display_identity()));
        None
    }
}

#[test]
fn compare_rules_see_each_unordered_pair_exactly_once() {
    let pairs = Arc::new(std::sync::Mutex::new(Vec::new()));
    let executor = greina::policy::CompareArtifactExecutor::new(vec![Box::new(
        RecordingPairRule { pairs: pairs.clone() },
    )]);

    let artifacts: Vec<Artifact> = (0..5)
        .map(|i| licensed_artifact("org.x", &format!("lib{}", i), "1.0", "MIT"))
        .collect();
    executor.evaluate(&artifacts);

    let seen = pairs.lock().unwrap();
    assert_eq!(seen.len(), 5 * 4 / 2);
    // no self-pairs, no duplicate unordered pairs
    let mut normalized: Vec<(String, String)> = seen
        .iter()
        .map(|(a, b)| {
            assert_ne!(a, b);
            if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
        })
        .collect();
    normalized.sort();
    normalized.dedup();
    assert_eq!(normalized.len(), 10);
}

// ═══════════════════════════════════════════════════════════════════
// Section 5: Full pipeline, analyzer to disk
// ═══════════════════════════════════════════════════════════════════

#[test]
fn full_workflow_run_produces_report_and_exposes_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deps.json");
    std::fs::write(
        &input,
        r#"{
            "source": "maven-export",
            "dependencies": [
                {"type": "maven", "namespace": "org.x", "name": "lib",
                 "version": "1.0", "license": "GPL-2.0-only"},
                {"type": "maven", "namespace": "org.y", "name": "lib2",
                 "version": "2.0", "license": "MIT"},
                {"type": "maven", "namespace": "org.internal", "name": "shim",
                 "version": "0.1", "license": "MIT"}
            ]
        }"#,
    )
    .unwrap();

    let policy = CompliancePolicy::from_toml_str(
        r#"
        [[remove]]
        namespace = "org.internal"

        [[final_licenses]]
        license = "Apache-2.0"
        [final_licenses.selector]
        name = "lib2"

        [[ignore_for_source_resolving]]
        namespace = "org.*"
        "#,
    )
    .unwrap();

    let reporter = Arc::new(MessageCollector::new());
    let out_dir = dir.path().join("out");

    let mut analyzer = JsonDependencyAnalyzer::new(reporter.clone());
    analyzer
        .configure(&StepConfig::new().with("input_file", input.to_string_lossy()))
        .unwrap();

    let mut check = ComplianceCheckStep::new(reporter.clone());
    check
        .configure(
            &StepConfig::new()
                .with("rulesets", "DefaultComplianceRules")
                .with("fail_on", "FAIL"),
        )
        .unwrap();

    let mut writer = DiskWriter::new();
    writer
        .configure(&StepConfig::new().with("output_dir", out_dir.to_string_lossy()))
        .unwrap();

    let result = WorkflowPipeline::new()
        .add_analyzer(100, Box::new(analyzer))
        .add_processor(100, Box::new(ConfigCheckStep::new(policy.clone(), reporter.clone())))
        .add_processor(200, Box::new(ConfigResolutionStep::new(policy, reporter.clone())))
        .add_processor(300, Box::new(check))
        .add_generator(100, Box::new(JsonReportGenerator::new()))
        .add_output_handler(100, Box::new(writer))
        .run(reporter.as_ref())
        .unwrap();

    // the internal shim was removed, two artifacts remain
    assert_eq!(result.artifacts.len(), 2);
    // lib carries GPL, so the run failed on the copyleft rule
    assert_eq!(result.outcome(), EvaluationOutcome::Failed);
    assert!(result.into_result().is_err());

    // the report reached the disk regardless of the failed outcome
    let report = std::fs::read_to_string(out_dir.join("compliance-report.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(parsed["outcome"], "failed");
    assert_eq!(parsed["artifact_count"], 2);

    // the rule engine message is inspectable next to the violations
    assert!(!reporter.messages_of_type(MessageType::RuleEngine).is_empty());
}

#[test]
fn overlay_license_feeds_the_rule_engine() {
    // A GPL declaration neutralized by a configured permissive license must
    // pass the copyleft rule: the engine reads the effective license.
    let reporter = Arc::new(MessageCollector::new());
    let policy = CompliancePolicy::from_toml_str(
        r#"
        [[final_licenses]]
        license = "MIT"
        [final_licenses.selector]
        name = "lib"
        "#,
    )
    .unwrap();

    let mut check = ComplianceCheckStep::new(reporter.clone());
    check
        .configure(&StepConfig::new().with("rulesets", "DefaultComplianceRules"))
        .unwrap();

    use greina::workflow::ProcessorStep;
    let mut resolution = ConfigResolutionStep::new(policy, reporter.clone());
    let mut artifact = licensed_artifact("org.x", "lib", "1.0", "GPL-3.0-only");
    artifact.add_fact(ArtifactFact::SourceArchive {
        path: Some("/sources/lib-1.0.zip".into()),
    });

    let resolved = resolution.process(vec![artifact]).unwrap();
    check.process(resolved).unwrap();

    let evaluation = check.evaluation().unwrap();
    assert!(
        !evaluation.violations.iter().any(|v| v.rule_id == "copyleft-license"),
        "configured MIT must shadow the declared GPL"
    );
    assert_eq!(evaluation.outcome(), EvaluationOutcome::Passed);
}
