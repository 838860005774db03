//! Ruleset registry — explicit name-to-constructor resolution
//!
//! Configurations reference rulesets by name. Resolution goes through an
//! explicit constructor map populated at startup; an unknown name is a
//! configuration error raised immediately, not at evaluation time.

use super::rulesets::DefaultComplianceRules;
use super::Ruleset;
use crate::{GreinaError, GreinaResult};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

type RulesetConstructor = fn() -> Box<dyn Ruleset>;

/// Maps ruleset names to constructors
pub struct RulesetRegistry {
    constructors: BTreeMap<String, RulesetConstructor>,
}

impl RulesetRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry preloaded with the rulesets this crate ships
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(DefaultComplianceRules::NAME, || {
            Box::new(DefaultComplianceRules)
        });
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, constructor: RulesetConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    pub fn known_names(&self) -> Vec<&str> {
        self.constructors.keys().map(|k| k.as_str()).collect()
    }

    /// Resolve one name; unknown names fail fast
    pub fn load(&self, name: &str) -> GreinaResult<Box<dyn Ruleset>> {
        match self.constructors.get(name) {
            Some(constructor) => Ok(constructor()),
            None => Err(GreinaError::Configuration(format!(
                "Unknown ruleset '{}' (known: {})",
                name,
                self.known_names().join(", ")
            ))),
        }
    }

    /// Resolve a list of names, preserving order
    pub fn load_all(&self, names: &[String]) -> GreinaResult<Vec<Box<dyn Ruleset>>> {
        names.iter().map(|n| self.load(n)).collect()
    }
}

static DEFAULT_REGISTRY: Lazy<RulesetRegistry> = Lazy::new(RulesetRegistry::with_builtins);

/// The process-wide registry of built-in rulesets
pub fn default_registry() -> &'static RulesetRegistry {
    &DEFAULT_REGISTRY
}
