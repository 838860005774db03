//! Wildcard selectors — identity patterns for configuration and rule targeting
//!
//! A selector is a coordinate-shaped pattern whose components may contain the
//! wildcard token `*` (whole-component or partial, e.g. `org.apache.*`).
//! A selector matches a candidate iff every non-wildcard component matches
//! the corresponding candidate component; absent/blank pattern components
//! are wildcards. The all-wildcard selector is valid and matches everything,
//! including an empty coordinate.

use super::coordinate::{Coordinate, CoordinateType};
use super::Artifact;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Component Matching ─────────────────────────────────────────────

/// True when the pattern component places no constraint at all
fn is_wildcard(pattern: Option<&str>) -> bool {
    match pattern {
        None => true,
        Some(p) => {
            let p = p.trim();
            p.is_empty() || p == "*"
        }
    }
}

/// Case-sensitive comparison honoring embedded `*` tokens.
///
/// A pattern that fails to compile degrades to "matches nothing" so a
/// malformed directive can never turn into an accidental universal match.
fn wildcard_match(pattern: &str, value: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == value;
    }
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut first = true;
    for literal in pattern.split('*') {
        if !first {
            expr.push_str(".*");
        }
        expr.push_str(&regex::escape(literal));
        first = false;
    }
    expr.push('$');
    Regex::new(&expr).map(|re| re.is_match(value)).unwrap_or(false)
}

/// Match one selector component against one candidate component.
/// An unspecified candidate component only satisfies a wildcard pattern.
fn component_matches(pattern: Option<&str>, candidate: Option<&str>) -> bool {
    if is_wildcard(pattern) {
        return true;
    }
    match pattern {
        Some(p) => wildcard_match(p.trim(), candidate.unwrap_or("").trim()),
        None => true,
    }
}

// ─── Coordinate Selector ────────────────────────────────────────────

/// Wildcard pattern over a [`Coordinate`].
///
/// All specified components must match (AND semantics across fields); a
/// typed selector only matches coordinates of the same ecosystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateSelector {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub coordinate_type: Option<CoordinateType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl CoordinateSelector {
    /// The selector that matches every coordinate
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of_type(coordinate_type: CoordinateType) -> Self {
        Self {
            coordinate_type: Some(coordinate_type),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// True when no component constrains anything
    pub fn is_universal(&self) -> bool {
        self.coordinate_type.is_none()
            && is_wildcard(self.namespace.as_deref())
            && is_wildcard(self.name.as_deref())
            && is_wildcard(self.version.as_deref())
    }

    /// Wildcard comparison against a candidate coordinate
    pub fn matches(&self, candidate: &Coordinate) -> bool {
        if let Some(t) = self.coordinate_type {
            if t != candidate.coordinate_type {
                return false;
            }
        }
        component_matches(self.namespace.as_deref(), candidate.namespace.as_deref())
            && component_matches(self.name.as_deref(), candidate.name.as_deref())
            && component_matches(self.version.as_deref(), candidate.version.as_deref())
    }

    /// An artifact matches when any of its coordinates matches.
    /// A coordinate-less artifact only matches the universal selector.
    pub fn matches_artifact(&self, artifact: &Artifact) -> bool {
        if self.is_universal() {
            return true;
        }
        artifact.coordinates().iter().any(|c| self.matches(c))
    }
}

impl Coordinate {
    /// Symmetric view of [`CoordinateSelector::matches`]
    pub fn matches(&self, selector: &CoordinateSelector) -> bool {
        selector.matches(self)
    }
}

impl fmt::Display for CoordinateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |o: &Option<String>| o.clone().unwrap_or_else(|| "*".to_string());
        write!(
            f,
            "{}:{}:{}:{}",
            self.coordinate_type.map(|t| t.as_str()).unwrap_or("*"),
            part(&self.namespace),
            part(&self.name),
            part(&self.version),
        )
    }
}

// ─── Legacy Selector ────────────────────────────────────────────────

/// Back-compatibility selector over filename/hash identity, for
/// configurations written before coordinates existed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyArtifactSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl LegacyArtifactSelector {
    pub fn matches(&self, filename: Option<&str>, hash: Option<&str>) -> bool {
        component_matches(self.filename.as_deref(), filename)
            && component_matches(self.hash.as_deref(), hash)
    }

    pub fn matches_artifact(&self, artifact: &Artifact) -> bool {
        self.matches(artifact.file_name().as_deref(), artifact.file_hash().as_deref())
    }
}
