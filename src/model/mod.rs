//! Artifact model — the fact store and its identity/matching primitives
//!
//! An [`Artifact`] represents one analyzed dependency: an ordered collection
//! of typed facts plus a proprietary flag, an analysis source label, and a
//! bag of string flags. Adding a fact of a kind already present merges
//! instead of replacing.

pub mod coordinate;
pub mod fact;
pub mod license;
pub mod selector;

pub use coordinate::{Coordinate, CoordinateType};
pub use fact::{ArtifactFact, FactKind, LicenseScope, MatchState, SecurityIssue};
pub use license::{License, LicenseExpression, LicenseFamily};
pub use selector::{CoordinateSelector, LegacyArtifactSelector};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Analysis source label for artifacts created by configuration directives
pub const CONFIGURATION_SOURCE: &str = "configuration";

// ─── Artifact ───────────────────────────────────────────────────────

/// The aggregate entity representing one analyzed dependency.
///
/// Facts live in insertion order with at most one fact per [`FactKind`];
/// [`Artifact::add_fact`] merges on duplicate kinds. An artifact may be
/// identified under several ecosystems simultaneously (one coordinate fact
/// per ecosystem). After the Analyze stage the coordinate set is only empty
/// for artifacts explicitly flagged proprietary with no identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    facts: Vec<ArtifactFact>,
    pub proprietary: bool,
    analysis_source: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    flags: BTreeSet<String>,
}

impl Artifact {
    pub fn new(analysis_source: impl Into<String>) -> Self {
        Self {
            facts: Vec::new(),
            proprietary: false,
            analysis_source: analysis_source.into(),
            flags: BTreeSet::new(),
        }
    }

    // ── Fact store ──

    /// Store a fact; if one of the same kind exists, replace it with
    /// `existing.merge_with(fact)`. Fluent.
    pub fn add_fact(&mut self, fact: ArtifactFact) -> &mut Self {
        let kind = fact.kind();
        match self.facts.iter_mut().find(|f| f.kind() == kind) {
            Some(existing) => *existing = existing.merge_with(&fact),
            None => self.facts.push(fact),
        }
        self
    }

    /// Builder-style [`Artifact::add_fact`]
    pub fn with_fact(mut self, fact: ArtifactFact) -> Self {
        self.add_fact(fact);
        self
    }

    pub fn fact(&self, kind: FactKind) -> Option<&ArtifactFact> {
        self.facts.iter().find(|f| f.kind() == kind)
    }

    /// Like [`Artifact::fact`] but treats an empty fact as absent
    pub fn non_empty_fact(&self, kind: FactKind) -> Option<&ArtifactFact> {
        self.fact(kind).filter(|f| !f.is_empty())
    }

    pub fn facts(&self) -> &[ArtifactFact] {
        &self.facts
    }

    // ── Identity ──

    /// Every ecosystem coordinate this artifact is known under
    pub fn coordinates(&self) -> Vec<&Coordinate> {
        self.facts
            .iter()
            .filter_map(|f| match f {
                ArtifactFact::Coordinates { coordinate } if !coordinate.is_empty() => {
                    Some(coordinate)
                }
                _ => None,
            })
            .collect()
    }

    pub fn coordinate_of(&self, coordinate_type: CoordinateType) -> Option<&Coordinate> {
        self.coordinates()
            .into_iter()
            .find(|c| c.coordinate_type == coordinate_type)
    }

    /// True once the Analyze-stage identity invariant is satisfied:
    /// at least one coordinate, or explicitly proprietary
    pub fn has_identity(&self) -> bool {
        !self.coordinates().is_empty() || self.proprietary
    }

    /// Short identity string for reports and violation messages
    pub fn display_identity(&self) -> String {
        if let Some(c) = self.coordinates().first() {
            return c.to_string();
        }
        if let Some(name) = self.file_name() {
            return name;
        }
        "<unidentified artifact>".to_string()
    }

    pub fn file_name(&self) -> Option<String> {
        match self.fact(FactKind::ArtifactFile) {
            Some(ArtifactFact::ArtifactFile { filename, .. }) => filename.clone(),
            _ => None,
        }
    }

    pub fn file_hash(&self) -> Option<String> {
        match self.fact(FactKind::ArtifactFile) {
            Some(ArtifactFact::ArtifactFile { hash, .. }) => hash.clone(),
            _ => None,
        }
    }

    // ── Typed views ──

    pub fn match_state(&self) -> MatchState {
        match self.fact(FactKind::MatchData) {
            Some(ArtifactFact::MatchData { state }) => *state,
            _ => MatchState::Unknown,
        }
    }

    pub fn license(&self, scope: LicenseScope) -> Option<&LicenseExpression> {
        match self.non_empty_fact(FactKind::License(scope)) {
            Some(ArtifactFact::License { expression, .. }) => expression.as_ref(),
            _ => None,
        }
    }

    /// The effective license: configured > overridden > observed > declared,
    /// falling through the chain until a non-empty expression is found.
    pub fn final_license(&self) -> Option<&LicenseExpression> {
        [
            LicenseScope::Configured,
            LicenseScope::Overridden,
            LicenseScope::Observed,
            LicenseScope::Declared,
        ]
        .into_iter()
        .find_map(|scope| self.license(scope))
    }

    pub fn issues(&self) -> &[SecurityIssue] {
        match self.fact(FactKind::Issues) {
            Some(ArtifactFact::Issues { issues }) => issues,
            _ => &[],
        }
    }

    pub fn source_archive(&self) -> Option<&std::path::Path> {
        match self.fact(FactKind::SourceArchive) {
            Some(ArtifactFact::SourceArchive { path }) => path.as_deref(),
            _ => None,
        }
    }

    // ── Metadata ──

    pub fn analysis_source(&self) -> &str {
        &self.analysis_source
    }

    pub fn set_analysis_source(&mut self, source: impl Into<String>) {
        self.analysis_source = source.into();
    }

    pub fn add_flag(&mut self, flag: impl Into<String>) -> &mut Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(|s| s.as_str())
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_identity())
    }
}
