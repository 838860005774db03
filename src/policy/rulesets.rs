//! Built-in compliance rules
//!
//! The default ruleset covers the baseline checks most runs want: identity
//! confidence, license presence, copyleft exposure, known security issues,
//! missing sources, and cross-artifact coordinate clashes.

use super::{
    CompareArtifactRule, PolicyViolation, Rule, Ruleset, Severity, SingleArtifactRule,
};
use crate::model::{Artifact, MatchState};

// ─── Default Ruleset ────────────────────────────────────────────────

/// The ruleset shipped with the crate and preloaded in the registry
pub struct DefaultComplianceRules;

impl DefaultComplianceRules {
    pub const NAME: &'static str = "DefaultComplianceRules";
}

impl Ruleset for DefaultComplianceRules {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        "1.2.0"
    }

    fn rules(&self) -> Vec<Rule> {
        vec![
            Rule::Single(Box::new(MissingLicenseRule)),
            Rule::Single(Box::new(UnknownMatchStateRule)),
            Rule::Single(Box::new(CopyleftLicenseRule)),
            Rule::Single(Box::new(KnownSecurityIssueRule)),
            Rule::Single(Box::new(MissingSourcesRule)),
            Rule::Compare(Box::new(CoordinateClashRule)),
        ]
    }
}

// ─── Single-Artifact Rules ──────────────────────────────────────────

/// No usable license information in any of the four slots
pub struct MissingLicenseRule;

impl SingleArtifactRule for MissingLicenseRule {
    fn id(&self) -> &str {
        "missing-license"
    }
    fn name(&self) -> &str {
        "Missing license information"
    }
    fn description(&self) -> &str {
        "Every artifact needs a declared, observed, overridden, or configured license"
    }
    fn severity(&self) -> Severity {
        Severity::Warn
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        if artifact.proprietary || artifact.final_license().is_some() {
            return None;
        }
        Some(PolicyViolation::single(
            self,
            artifact,
            "no license information from any source",
        ))
    }
}

/// Identity was never confirmed against an upstream index
pub struct UnknownMatchStateRule;

impl SingleArtifactRule for UnknownMatchStateRule {
    fn id(&self) -> &str {
        "unknown-match-state"
    }
    fn name(&self) -> &str {
        "Unconfirmed artifact identity"
    }
    fn description(&self) -> &str {
        "Artifacts whose identity match is unknown may carry wrong metadata"
    }
    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        match artifact.match_state() {
            MatchState::Unknown => Some(PolicyViolation::single(
                self,
                artifact,
                "identity match state is unknown",
            )),
            MatchState::Exact | MatchState::Similar => None,
        }
    }
}

/// The effective license contains a copyleft atom
pub struct CopyleftLicenseRule;

impl SingleArtifactRule for CopyleftLicenseRule {
    fn id(&self) -> &str {
        "copyleft-license"
    }
    fn name(&self) -> &str {
        "Copyleft license in use"
    }
    fn description(&self) -> &str {
        "GPL-family licenses impose obligations incompatible with closed distribution"
    }
    fn severity(&self) -> Severity {
        Severity::Fail
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        let license = artifact.final_license()?;
        let copyleft: Vec<&str> = license
            .licenses()
            .into_iter()
            .filter(|l| l.family().is_copyleft())
            .map(|l| l.id.as_str())
            .collect();
        if copyleft.is_empty() {
            return None;
        }
        Some(PolicyViolation::single(
            self,
            artifact,
            format!("effective license {} contains copyleft terms: {}", license, copyleft.join(", ")),
        ))
    }
}

/// A known security issue at or above the critical CVSS cutoff
pub struct KnownSecurityIssueRule;

impl KnownSecurityIssueRule {
    /// CVSS "high" boundary
    const SCORE_CUTOFF: f64 = 7.0;
}

impl SingleArtifactRule for KnownSecurityIssueRule {
    fn id(&self) -> &str {
        "known-security-issue"
    }
    fn name(&self) -> &str {
        "Known high-severity security issue"
    }
    fn description(&self) -> &str {
        "Artifacts with high-severity issues need remediation before release"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        let serious: Vec<&str> = artifact
            .issues()
            .iter()
            .filter(|i| i.severity_score >= Self::SCORE_CUTOFF)
            .map(|i| i.reference.as_str())
            .collect();
        if serious.is_empty() {
            return None;
        }
        Some(PolicyViolation::single(
            self,
            artifact,
            format!("high-severity issues: {}", serious.join(", ")),
        ))
    }
}

/// Flag steps may exempt an artifact from source resolution
pub const IGNORE_SOURCES_FLAG: &str = "ignore-for-source-resolving";

/// No source archive and no exemption flag
pub struct MissingSourcesRule;

impl SingleArtifactRule for MissingSourcesRule {
    fn id(&self) -> &str {
        "missing-sources"
    }
    fn name(&self) -> &str {
        "Missing source archive"
    }
    fn description(&self) -> &str {
        "Disclosure documents need the matching source archive for every artifact"
    }
    fn severity(&self) -> Severity {
        Severity::Warn
    }

    fn evaluate(&self, artifact: &Artifact) -> Option<PolicyViolation> {
        if artifact.proprietary
            || artifact.has_flag(IGNORE_SOURCES_FLAG)
            || artifact.source_archive().is_some()
        {
            return None;
        }
        Some(PolicyViolation::single(self, artifact, "no source archive resolved"))
    }
}

// ─── Compare Rules ──────────────────────────────────────────────────

/// Two artifacts share a coordinate but disagree on the effective license
pub struct CoordinateClashRule;

impl CompareArtifactRule for CoordinateClashRule {
    fn id(&self) -> &str {
        "coordinate-clash"
    }
    fn name(&self) -> &str {
        "Conflicting duplicate coordinates"
    }
    fn description(&self) -> &str {
        "The same coordinate appearing twice with different effective licenses points at a bad merge or override"
    }
    fn severity(&self) -> Severity {
        Severity::Warn
    }

    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Option<PolicyViolation> {
        let shared = left
            .coordinates()
            .into_iter()
            .find(|c| right.coordinates().into_iter().any(|d| d == *c))?;

        let left_license = left.final_license().map(|l| l.to_string());
        let right_license = right.final_license().map(|l| l.to_string());
        if left_license == right_license {
            return None;
        }
        Some(PolicyViolation::pair(
            self,
            left,
            right,
            format!(
                "coordinate {} carries licenses {:?} and {:?}",
                shared, left_license, right_license
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactFact, Coordinate, LicenseExpression, LicenseScope, SecurityIssue};

    fn artifact_with_license(group: &str, name: &str, version: &str, license: &str) -> Artifact {
        Artifact::new("test")
            .with_fact(ArtifactFact::coordinates(Coordinate::maven(group, name, version)))
            .with_fact(ArtifactFact::license(
                LicenseScope::Declared,
                LicenseExpression::atom(license),
            ))
            .with_fact(ArtifactFact::match_state(MatchState::Exact))
    }

    #[test]
    fn test_copyleft_rule_fires_on_gpl_only() {
        let rule = CopyleftLicenseRule;
        let gpl = artifact_with_license("org.x", "lib", "1.0", "GPL-2.0-only");
        let mit = artifact_with_license("org.y", "lib2", "2.0", "MIT");

        let violation = rule.evaluate(&gpl).expect("GPL must violate");
        assert!(violation.references(&gpl));
        assert_eq!(violation.severity, Severity::Fail);
        assert!(rule.evaluate(&mit).is_none());
    }

    #[test]
    fn test_missing_license_skips_proprietary() {
        let rule = MissingLicenseRule;
        let mut unlicensed = Artifact::new("test");
        unlicensed.add_fact(ArtifactFact::coordinates(Coordinate::maven("org.x", "lib", "1.0")));
        assert!(rule.evaluate(&unlicensed).is_some());

        unlicensed.proprietary = true;
        assert!(rule.evaluate(&unlicensed).is_none());
    }

    #[test]
    fn test_security_issue_cutoff() {
        let rule = KnownSecurityIssueRule;
        let mut artifact = artifact_with_license("org.x", "lib", "1.0", "MIT");
        artifact.add_fact(ArtifactFact::issues(vec![SecurityIssue {
            reference: "CVE-2020-0001".into(),
            severity_score: 5.0,
            source: None,
            url: None,
        }]));
        assert!(rule.evaluate(&artifact).is_none());

        artifact.add_fact(ArtifactFact::issues(vec![SecurityIssue {
            reference: "CVE-2021-44228".into(),
            severity_score: 10.0,
            source: None,
            url: None,
        }]));
        let violation = rule.evaluate(&artifact).expect("critical issue must violate");
        assert!(violation.description.contains("CVE-2021-44228"));
    }

    #[test]
    fn test_missing_sources_honors_exemption_flag() {
        let rule = MissingSourcesRule;
        let mut artifact = artifact_with_license("org.x", "lib", "1.0", "MIT");
        assert!(rule.evaluate(&artifact).is_some());

        artifact.add_flag(IGNORE_SOURCES_FLAG);
        assert!(rule.evaluate(&artifact).is_none());
    }

    #[test]
    fn test_coordinate_clash() {
        let rule = CoordinateClashRule;
        let a = artifact_with_license("org.x", "lib", "1.0", "MIT");
        let b = artifact_with_license("org.x", "lib", "1.0", "GPL-3.0-only");
        let c = artifact_with_license("org.x", "lib", "1.0", "MIT");

        assert!(rule.evaluate(&a, &b).is_some());
        // same coordinate, same license: no clash
        assert!(rule.evaluate(&a, &c).is_none());
        // different coordinates: no clash
        let d = artifact_with_license("org.z", "other", "3.0", "GPL-3.0-only");
        assert!(rule.evaluate(&a, &d).is_none());
    }
}
