//! Typed facts — mergeable attributes attached to an artifact
//!
//! Facts form a closed tagged union keyed by [`FactKind`]. Coordinate facts
//! carry their ecosystem inside the kind, so two ecosystems can never merge
//! into each other. Merging is per-field: the ARGUMENT's non-empty fields
//! take precedence over the receiver's.

use super::coordinate::{Coordinate, CoordinateType};
use super::license::LicenseExpression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ─── Fact Kinds ─────────────────────────────────────────────────────

/// Which of the four license slots a license fact occupies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LicenseScope {
    Declared,
    Observed,
    Overridden,
    Configured,
}

/// Stable key of a fact inside an artifact's fact map.
/// At most one fact per kind exists on an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactKind {
    Coordinates(CoordinateType),
    License(LicenseScope),
    MatchData,
    Issues,
    ArtifactFile,
    SourceArchive,
    Copyright,
    Bundle,
}

// ─── Fact Payloads ──────────────────────────────────────────────────

/// Confidence that an artifact's identity was resolved correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    Exact,
    Similar,
    Unknown,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Similar => write!(f, "similar"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One known security issue attached to an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityIssue {
    /// Tracker reference (CVE id or vendor advisory)
    pub reference: String,
    /// CVSS-like score, 0.0 - 10.0
    pub severity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ─── The Fact Union ─────────────────────────────────────────────────

/// A typed, immutable-by-convention attribute of an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum ArtifactFact {
    Coordinates {
        coordinate: Coordinate,
    },
    License {
        scope: LicenseScope,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<LicenseExpression>,
    },
    MatchData {
        state: MatchState,
    },
    Issues {
        issues: Vec<SecurityIssue>,
    },
    /// Where the analyzed binary/package file lives
    ArtifactFile {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hash: Option<String>,
    },
    /// Where the matching source archive lives
    SourceArchive {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Copyright {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        statement: Option<String>,
    },
    /// OSGi bundle identity carried alongside the primary coordinates
    Bundle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbolic_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bundle_version: Option<String>,
    },
}

impl ArtifactFact {
    pub fn coordinates(coordinate: Coordinate) -> Self {
        Self::Coordinates { coordinate }
    }

    pub fn license(scope: LicenseScope, expression: LicenseExpression) -> Self {
        Self::License {
            scope,
            expression: Some(expression),
        }
    }

    pub fn match_state(state: MatchState) -> Self {
        Self::MatchData { state }
    }

    pub fn issues(issues: Vec<SecurityIssue>) -> Self {
        Self::Issues { issues }
    }

    /// The map key this fact lives under
    pub fn kind(&self) -> FactKind {
        match self {
            Self::Coordinates { coordinate } => FactKind::Coordinates(coordinate.coordinate_type),
            Self::License { scope, .. } => FactKind::License(*scope),
            Self::MatchData { .. } => FactKind::MatchData,
            Self::Issues { .. } => FactKind::Issues,
            Self::ArtifactFile { .. } => FactKind::ArtifactFile,
            Self::SourceArchive { .. } => FactKind::SourceArchive,
            Self::Copyright { .. } => FactKind::Copyright,
            Self::Bundle { .. } => FactKind::Bundle,
        }
    }

    /// Stable human-readable tag
    pub fn content_name(&self) -> &'static str {
        match self {
            Self::Coordinates { coordinate } => match coordinate.coordinate_type {
                CoordinateType::Maven => "MavenCoordinates",
                CoordinateType::Npm => "NpmCoordinates",
                CoordinateType::Nuget => "NugetCoordinates",
                CoordinateType::P2 => "P2Coordinates",
                CoordinateType::Generic => "GenericCoordinates",
            },
            Self::License { scope, .. } => match scope {
                LicenseScope::Declared => "DeclaredLicense",
                LicenseScope::Observed => "ObservedLicense",
                LicenseScope::Overridden => "OverriddenLicense",
                LicenseScope::Configured => "ConfiguredLicense",
            },
            Self::MatchData { .. } => "MatchData",
            Self::Issues { .. } => "SecurityIssues",
            Self::ArtifactFile { .. } => "ArtifactFile",
            Self::SourceArchive { .. } => "SourceArchive",
            Self::Copyright { .. } => "CopyrightStatement",
            Self::Bundle { .. } => "BundleCoordinates",
        }
    }

    /// A fact with no usable payload. Empty facts are treated as absent by
    /// [`crate::model::Artifact::non_empty_fact`].
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Coordinates { coordinate } => coordinate.is_empty(),
            Self::License { expression, .. } => {
                expression.as_ref().map(|e| e.is_empty()).unwrap_or(true)
            }
            Self::MatchData { state } => matches!(state, MatchState::Unknown),
            Self::Issues { issues } => issues.is_empty(),
            Self::ArtifactFile { filename, path, hash } => {
                filename.is_none() && path.is_none() && hash.is_none()
            }
            Self::SourceArchive { path } => path.is_none(),
            Self::Copyright { statement } => {
                statement.as_ref().map(|s| s.trim().is_empty()).unwrap_or(true)
            }
            Self::Bundle { symbolic_name, bundle_version } => {
                symbolic_name.is_none() && bundle_version.is_none()
            }
        }
    }

    /// Per-field merge where the argument's non-empty fields win.
    ///
    /// The fact map keys by kind, so both sides always share a kind;
    /// should the kinds ever differ the argument wins wholly, which keeps
    /// the "last write wins" direction intact.
    pub fn merge_with(&self, other: &ArtifactFact) -> ArtifactFact {
        match (self, other) {
            (Self::Coordinates { coordinate: a }, Self::Coordinates { coordinate: b })
                if a.coordinate_type == b.coordinate_type =>
            {
                Self::Coordinates {
                    coordinate: a.merge_with(b),
                }
            }
            (
                Self::License { scope, expression: a },
                Self::License { scope: scope_b, expression: b },
            ) if scope == scope_b => Self::License {
                scope: *scope,
                expression: match b {
                    Some(expr) if !expr.is_empty() => Some(expr.clone()),
                    _ => a.clone(),
                },
            },
            (Self::MatchData { state: a }, Self::MatchData { state: b }) => Self::MatchData {
                state: if matches!(b, MatchState::Unknown) { *a } else { *b },
            },
            // Issue collections union rather than overwrite: a configured
            // overlay must not erase analyzer-discovered issues
            (Self::Issues { issues: a }, Self::Issues { issues: b }) => {
                let mut merged = a.clone();
                for issue in b {
                    if !merged.iter().any(|i| i.reference == issue.reference) {
                        merged.push(issue.clone());
                    }
                }
                Self::Issues { issues: merged }
            }
            (
                Self::ArtifactFile { filename: f1, path: p1, hash: h1 },
                Self::ArtifactFile { filename: f2, path: p2, hash: h2 },
            ) => Self::ArtifactFile {
                filename: f2.clone().or_else(|| f1.clone()),
                path: p2.clone().or_else(|| p1.clone()),
                hash: h2.clone().or_else(|| h1.clone()),
            },
            (Self::SourceArchive { path: a }, Self::SourceArchive { path: b }) => {
                Self::SourceArchive {
                    path: b.clone().or_else(|| a.clone()),
                }
            }
            (Self::Copyright { statement: a }, Self::Copyright { statement: b }) => {
                Self::Copyright {
                    statement: match b {
                        Some(s) if !s.trim().is_empty() => Some(s.clone()),
                        _ => a.clone(),
                    },
                }
            }
            (
                Self::Bundle { symbolic_name: n1, bundle_version: v1 },
                Self::Bundle { symbolic_name: n2, bundle_version: v2 },
            ) => Self::Bundle {
                symbolic_name: n2.clone().or_else(|| n1.clone()),
                bundle_version: v2.clone().or_else(|| v1.clone()),
            },
            _ => other.clone(),
        }
    }
}
