//! Configuration lint — selectors that match nothing are dead weight
//!
//! Cross-validates every configured selector against the current artifact
//! collection. A selector matching no artifact is reported as unnecessary
//! configuration through the reporter; it is a linting aid, never fatal.
//! Run it against the pre-directive collection: a remove selector that just
//! did its job would otherwise always look unnecessary.

use super::CompliancePolicy;
use crate::model::Artifact;
use crate::report::{MessageType, ProcessingReporter};

/// Report each selector of the policy that matches no artifact.
/// Returns how many selectors were flagged.
pub fn check_policy(
    policy: &CompliancePolicy,
    artifacts: &[Artifact],
    reporter: &dyn ProcessingReporter,
) -> usize {
    let mut unnecessary = 0;
    for (section, selector) in policy.all_selectors() {
        if !artifacts.iter().any(|a| selector.matches_artifact(a)) {
            unnecessary += 1;
            reporter.report(
                Some(&selector.to_string()),
                MessageType::UnnecessaryConfig,
                &format!("{} selector matches no artifact", section),
            );
        }
    }
    if unnecessary > 0 {
        tracing::warn!("{} configured selector(s) match no artifact", unnecessary);
    }
    unnecessary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactFact, Coordinate, CoordinateSelector};
    use crate::report::MessageCollector;

    #[test]
    fn test_unmatched_selector_is_reported() {
        let reporter = MessageCollector::new();
        let policy = CompliancePolicy {
            remove: vec![CoordinateSelector::any().with_name("no-such-artifact")],
            ..Default::default()
        };
        let artifacts = vec![Artifact::new("test")
            .with_fact(ArtifactFact::coordinates(Coordinate::maven("org.x", "lib", "1.0")))];

        let flagged = check_policy(&policy, &artifacts, &reporter);
        assert_eq!(flagged, 1);
        let messages = reporter.messages_of_type(MessageType::UnnecessaryConfig);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].message.contains("remove"));
    }

    #[test]
    fn test_matched_selector_is_silent() {
        let reporter = MessageCollector::new();
        let policy = CompliancePolicy {
            remove: vec![CoordinateSelector::any().with_name("lib")],
            ..Default::default()
        };
        let artifacts = vec![Artifact::new("test")
            .with_fact(ArtifactFact::coordinates(Coordinate::maven("org.x", "lib", "1.0")))];

        assert_eq!(check_policy(&policy, &artifacts, &reporter), 0);
        assert!(reporter.is_empty());
    }
}
