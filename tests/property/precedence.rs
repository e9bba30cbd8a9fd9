//! Property-based tests for tier precedence

use barnstorm::command::{handler_fn, CommandRegistry, ResolveLayout, Tier};
use barnstorm::environment::Environment;
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

/// Which tiers carry a target for the command under test
#[derive(Debug, Clone)]
struct Setup {
    name: String,
    remote: bool,
    local_file: bool,
    local_binding: bool,
    package_file: bool,
    package_binding: bool,
    builtin: bool,
}

fn setup_strategy() -> impl Strategy<Value = Setup> {
    (
        "[a-z][a-z0-9_-]{0,12}",
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(name, remote, local_file, local_binding, package_file, package_binding, builtin)| {
                Setup {
                    name,
                    remote,
                    local_file,
                    local_binding,
                    package_file,
                    package_binding,
                    builtin,
                }
            },
        )
}

fn build_registry(temp: &TempDir, setup: &Setup) -> CommandRegistry {
    let mut layout = ResolveLayout::new(temp.path());
    if setup.remote {
        layout = layout.with_remote(setup.name.clone());
    }

    if setup.local_file {
        let path = layout.local_path(&setup.name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
    }
    if setup.package_file {
        std::fs::create_dir_all(layout.namespaced_path(&setup.name)).unwrap();
    }

    let local_key = layout.local_key(&setup.name);
    let package_key = layout.namespaced_key(&setup.name);
    let mut registry = CommandRegistry::new(layout, Arc::new(Environment::default()));
    if setup.local_binding {
        registry
            .bind(local_key, handler_fn("local", |_| Ok("local".to_string())))
            .unwrap();
    }
    if setup.package_binding {
        registry
            .bind(package_key, handler_fn("package", |_| Ok("package".to_string())))
            .unwrap();
    }
    if setup.builtin {
        registry
            .bind(setup.name.clone(), handler_fn("builtin", |_| Ok("builtin".to_string())))
            .unwrap();
    }
    registry
}

fn expected_tier(setup: &Setup, remote: bool) -> Option<Tier> {
    if !remote && (setup.local_file || setup.local_binding) {
        Some(Tier::LocalOverride)
    } else if setup.package_file || setup.package_binding {
        Some(Tier::NamespacedPackage)
    } else if setup.builtin {
        Some(Tier::BuiltIn)
    } else {
        None
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// The highest-precedence tier with a target always wins; remote commands never use
    /// the local tier.
    #[test]
    fn test_resolution_picks_highest_present_tier(setup in setup_strategy()) {
        let temp = TempDir::new().unwrap();
        let registry = build_registry(&temp, &setup);
        let remote = registry.layout().is_remote(&setup.name);

        match (registry.resolve(&setup.name), expected_tier(&setup, remote)) {
            (Ok(resolution), Some(tier)) => {
                prop_assert_eq!(resolution.tier, tier);
                prop_assert!(!(remote && resolution.tier == Tier::LocalOverride));
            }
            (Err(_), None) => {}
            (got, want) => prop_assert!(false, "got {:?}, expected {:?}", got, want),
        }
    }

    /// Resolving twice gives the same answer and never changes the bindings.
    #[test]
    fn test_resolution_is_stable(setup in setup_strategy()) {
        let temp = TempDir::new().unwrap();
        let registry = build_registry(&temp, &setup);
        let keys_before: Vec<String> =
            registry.binding_keys().into_iter().map(str::to_string).collect();

        let first = registry.resolve(&setup.name).ok();
        let second = registry.resolve(&setup.name).ok();
        prop_assert_eq!(first, second);

        let keys_after: Vec<String> =
            registry.binding_keys().into_iter().map(str::to_string).collect();
        prop_assert_eq!(keys_before, keys_after);
    }
}
