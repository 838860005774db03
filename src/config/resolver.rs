//! Directive application — deterministic reconciliation before validation
//!
//! Directives apply in a fixed order: remove, then override, then add, then
//! the selector-keyed overlays. Remove-before-add is what makes "remove then
//! re-add under the same selector" produce a configuration-sourced artifact
//! rather than resurrecting the analyzer's data.

use super::{parse_license, CompliancePolicy};
use crate::model::{Artifact, ArtifactFact, LicenseScope};
use crate::policy::rulesets::IGNORE_SOURCES_FLAG;
use crate::report::{MessageType, ProcessingReporter};
use crate::GreinaResult;

/// Apply every directive of the policy to the collection, returning the
/// reconciled collection.
pub fn apply_policy(
    mut artifacts: Vec<Artifact>,
    policy: &CompliancePolicy,
    reporter: &dyn ProcessingReporter,
) -> GreinaResult<Vec<Artifact>> {
    // ── 1. Remove ──
    let before = artifacts.len();
    artifacts.retain(|artifact| {
        !policy
            .remove
            .iter()
            .any(|selector| selector.matches_artifact(artifact))
    });
    if artifacts.len() != before {
        tracing::info!("Directives removed {} artifact(s)", before - artifacts.len());
    }

    // ── 2. Override ──
    for directive in &policy.overrides {
        let replacement = directive.artifact.to_artifact()?;
        for artifact in artifacts
            .iter_mut()
            .filter(|a| directive.selector.matches_artifact(a))
        {
            for fact in replacement.facts() {
                artifact.add_fact(fact.clone());
            }
            if replacement.proprietary {
                artifact.proprietary = true;
            }
            tracing::debug!("Override {} applied to {}", directive.selector, artifact);
        }
    }

    // ── 3. Add ──
    for directive in &policy.add {
        let artifact = directive.to_artifact()?;
        if !artifact.has_identity() {
            reporter.report(
                None,
                MessageType::ProcessingFailure,
                "add directive produced an artifact with no identity; skipped",
            );
            continue;
        }
        tracing::info!("Directives added {}", artifact);
        artifacts.push(artifact);
    }

    // ── 4. Overlays ──
    for overlay in &policy.final_licenses {
        let expression = parse_license(&overlay.license)?;
        for artifact in artifacts
            .iter_mut()
            .filter(|a| overlay.selector.matches_artifact(a))
        {
            artifact.add_fact(ArtifactFact::license(
                LicenseScope::Configured,
                expression.clone(),
            ));
        }
    }

    for overlay in &policy.security_issues {
        for artifact in artifacts
            .iter_mut()
            .filter(|a| overlay.selector.matches_artifact(a))
        {
            artifact.add_fact(ArtifactFact::issues(overlay.issues.clone()));
        }
    }

    for selector in &policy.ignore_for_source_resolving {
        for artifact in artifacts
            .iter_mut()
            .filter(|a| selector.matches_artifact(a))
        {
            artifact.add_flag(IGNORE_SOURCES_FLAG);
        }
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtifactDirective, LicenseOverlay, OverrideDirective};
    use crate::model::{
        Coordinate, CoordinateSelector, CoordinateType, LicenseExpression, MatchState,
        CONFIGURATION_SOURCE,
    };
    use crate::report::MessageCollector;

    fn analyzed(group: &str, name: &str, version: &str) -> Artifact {
        Artifact::new("maven-analyzer")
            .with_fact(ArtifactFact::coordinates(Coordinate::maven(group, name, version)))
            .with_fact(ArtifactFact::license(
                LicenseScope::Declared,
                LicenseExpression::atom("MIT"),
            ))
    }

    #[test]
    fn test_remove_drops_matching_artifacts() {
        let reporter = MessageCollector::new();
        let policy = CompliancePolicy {
            remove: vec![CoordinateSelector::any().with_namespace("org.internal.*")],
            ..Default::default()
        };
        let artifacts = vec![
            analyzed("org.internal.tools", "helper", "0.1"),
            analyzed("org.x", "lib", "1.0"),
        ];
        let result = apply_policy(artifacts, &policy, &reporter).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].coordinates()[0].namespace.as_deref(), Some("org.x"));
    }

    #[test]
    fn test_override_merges_with_configured_precedence() {
        let reporter = MessageCollector::new();
        let policy = CompliancePolicy {
            overrides: vec![OverrideDirective {
                selector: CoordinateSelector::any().with_name("lib"),
                artifact: ArtifactDirective {
                    declared_license: Some("Apache-2.0".into()),
                    copyright: Some("Copyright 2020 Org X".into()),
                    ..Default::default()
                },
            }],
            ..Default::default()
        };
        let result = apply_policy(vec![analyzed("org.x", "lib", "1.0")], &policy, &reporter).unwrap();
        // configured data wins over the analyzed declared license
        assert_eq!(result[0].final_license().unwrap().to_string(), "Apache-2.0");
        // analyzer identity survives the merge
        assert!(result[0].coordinate_of(CoordinateType::Maven).is_some());
    }

    #[test]
    fn test_remove_then_add_yields_configuration_source() {
        let reporter = MessageCollector::new();
        let selector = CoordinateSelector::of_type(CoordinateType::Maven)
            .with_namespace("org.x")
            .with_name("lib");
        let policy = CompliancePolicy {
            remove: vec![selector],
            add: vec![ArtifactDirective {
                coordinates: vec![Coordinate::maven("org.x", "lib", "1.0")],
                declared_license: Some("MIT".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let result = apply_policy(vec![analyzed("org.x", "lib", "1.0")], &policy, &reporter).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].analysis_source(), CONFIGURATION_SOURCE);
        assert_eq!(result[0].match_state(), MatchState::Exact);
    }

    #[test]
    fn test_final_license_overlay_beats_override() {
        let reporter = MessageCollector::new();
        let policy = CompliancePolicy {
            overrides: vec![OverrideDirective {
                selector: CoordinateSelector::any(),
                artifact: ArtifactDirective {
                    declared_license: Some("Apache-2.0".into()),
                    ..Default::default()
                },
            }],
            final_licenses: vec![LicenseOverlay {
                selector: CoordinateSelector::any().with_name("lib"),
                license: "EPL-2.0".into(),
            }],
            ..Default::default()
        };
        let result = apply_policy(vec![analyzed("org.x", "lib", "1.0")], &policy, &reporter).unwrap();
        assert_eq!(result[0].final_license().unwrap().to_string(), "EPL-2.0");
    }

    #[test]
    fn test_identityless_add_is_reported_and_skipped() {
        let reporter = MessageCollector::new();
        let policy = CompliancePolicy {
            add: vec![ArtifactDirective::default()],
            ..Default::default()
        };
        let result = apply_policy(Vec::new(), &policy, &reporter).unwrap();
        assert!(result.is_empty());
        assert_eq!(
            reporter.messages_of_type(MessageType::ProcessingFailure).len(),
            1
        );
    }

    #[test]
    fn test_ignore_sources_overlay_sets_flag() {
        let reporter = MessageCollector::new();
        let policy = CompliancePolicy {
            ignore_for_source_resolving: vec![CoordinateSelector::any().with_name("lib")],
            ..Default::default()
        };
        let result = apply_policy(vec![analyzed("org.x", "lib", "1.0")], &policy, &reporter).unwrap();
        assert!(result[0].has_flag(IGNORE_SOURCES_FLAG));
    }
}
