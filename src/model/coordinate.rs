//! Canonical dependency identity — ecosystem-typed coordinate tuples
//!
//! A `Coordinate` names one dependency inside one packaging ecosystem.
//! An artifact discovered under several ecosystems (e.g. Maven + P2)
//! carries one coordinate per ecosystem.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Coordinate Type ────────────────────────────────────────────────

/// Packaging ecosystem a coordinate belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateType {
    /// groupId / artifactId / version
    Maven,
    /// scope (optional) / package name / version
    Npm,
    /// package id / version
    Nuget,
    /// bundle symbolic name / bundle version
    P2,
    /// name / version with no ecosystem semantics
    Generic,
}

impl CoordinateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::P2 => "p2",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for CoordinateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Coordinate ─────────────────────────────────────────────────────

/// Immutable identity tuple: ecosystem type plus up to three components.
///
/// Maven reads the components as groupId/artifactId/version; NPM as
/// scope/name/version. A blank component and an absent component are
/// interchangeable: both mean "unspecified".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "type")]
    pub coordinate_type: CoordinateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Normalize a component: blank collapses to `None`
fn component(value: Option<&str>) -> Option<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        _ => None,
    }
}

impl Coordinate {
    pub fn new(
        coordinate_type: CoordinateType,
        namespace: Option<&str>,
        name: Option<&str>,
        version: Option<&str>,
    ) -> Self {
        Self {
            coordinate_type,
            namespace: component(namespace),
            name: component(name),
            version: component(version),
        }
    }

    /// Maven groupId:artifactId:version
    pub fn maven(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self::new(CoordinateType::Maven, Some(group_id), Some(artifact_id), Some(version))
    }

    /// NPM package, optionally scoped (`@babel/core` style scope goes in `scope`)
    pub fn npm(scope: Option<&str>, name: &str, version: &str) -> Self {
        Self::new(CoordinateType::Npm, scope, Some(name), Some(version))
    }

    pub fn nuget(package_id: &str, version: &str) -> Self {
        Self::new(CoordinateType::Nuget, None, Some(package_id), Some(version))
    }

    /// Eclipse P2 bundle symbolic name + bundle version
    pub fn p2(symbolic_name: &str, version: &str) -> Self {
        Self::new(CoordinateType::P2, None, Some(symbolic_name), Some(version))
    }

    pub fn generic(name: &str, version: &str) -> Self {
        Self::new(CoordinateType::Generic, None, Some(name), Some(version))
    }

    /// An identity with no usable components
    pub fn empty(coordinate_type: CoordinateType) -> Self {
        Self::new(coordinate_type, None, None, None)
    }

    /// True when every component is absent or blank
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.name.is_none() && self.version.is_none()
    }

    /// Field-wise merge: the dominant's non-blank components win, the
    /// receiver fills the gaps. Used when two analyzers discover the same
    /// artifact with partial identity.
    pub fn merge_with(&self, dominant: &Coordinate) -> Coordinate {
        Coordinate {
            coordinate_type: dominant.coordinate_type,
            namespace: dominant.namespace.clone().or_else(|| self.namespace.clone()),
            name: dominant.name.clone().or_else(|| self.name.clone()),
            version: dominant.version.clone().or_else(|| self.version.clone()),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coordinate_type)?;
        for part in [&self.namespace, &self.name, &self.version].into_iter().flatten() {
            write!(f, ":{}", part)?;
        }
        Ok(())
    }
}
