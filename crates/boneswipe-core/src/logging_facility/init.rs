//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Silent subscriber, so walk events are built but go nowhere
    Test,
}

const DEV_FILTER: &str = "boneswipe_core=debug,boneswipe_store=debug,boneswipe_cli=debug";
const PROD_FILTER: &str = "boneswipe_core=info,boneswipe_store=info,boneswipe_cli=info";

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// This function should be called once at application startup.
/// It sets up the tracing subscriber based on the selected profile.
/// Logs go to stderr so that stdout stays free for walk output.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Capture mode for test assertions
///
/// # Example
///
/// ```
/// use boneswipe_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEV_FILTER)),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(PROD_FILTER)),
                )
                .init();
        }
        Profile::Test => {
            // No layers; tests that assert on walk events use init_test_capture()
            tracing_subscriber::registry().init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocalTransform;
    use crate::rules::{RuleSet, SpawnMarker};
    use crate::{Rule, SceneGraph, TreeWalker, WalkOutcome};

    #[test]
    fn test_walk_after_repeated_init() {
        // Only the first call installs a subscriber; later profiles are ignored
        init(Profile::Test);
        init(Profile::Production);

        let mut scene = SceneGraph::new("init");
        scene.add_node("hips", LocalTransform::default()).unwrap();
        scene.add_node("hips_end", LocalTransform::default()).unwrap();
        scene.attach("hips", "hips_end").unwrap();
        let rules =
            RuleSet::new().with_forward(Rule::when("endswith(\"_end\")", SpawnMarker).unwrap());

        let report = TreeWalker::default()
            .walk("hips", &rules, &scene, &scene)
            .unwrap();

        assert_eq!(report.outcome, WalkOutcome::Completed);
        assert_eq!(scene.markers().len(), 1);
    }

    #[test]
    fn test_filters_cover_every_crate() {
        for filter in [DEV_FILTER, PROD_FILTER] {
            for target in ["boneswipe_core", "boneswipe_store", "boneswipe_cli"] {
                assert!(filter.contains(target), "{} missing {}", filter, target);
            }
        }
    }
}
