// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests check prefix matching and layer precedence over arbitrary
//! keys and values.

use overlaycfg::adapters::MapSource;
use overlaycfg::domain::{ConfigKey, ConfigValue};
use overlaycfg::ports::{RebindFn, Rebindable};
use overlaycfg::service::{ChangeRegistry, SourceChain};
use proptest::prelude::*;
use std::sync::Arc;

fn consumer(name: &str) -> Arc<dyn Rebindable> {
    Arc::new(RebindFn::new(name, |_env: &dyn overlaycfg::ports::Environment| Ok(())))
}

// A consumer is returned iff its prefix is a literal prefix of the key
proptest! {
    #[test]
    fn test_registry_lookup_matches_literal_prefix(
        prefix in "[a-c.]{0,4}",
        key in "[a-c.]{0,8}",
    ) {
        let registry = ChangeRegistry::new();
        registry.register(prefix.clone(), consumer("c"));
        let found = registry.lookup(&ConfigKey::from(key.as_str()));
        prop_assert_eq!(found.len() == 1, key.starts_with(prefix.as_str()));
    }
}

// Every matching prefix contributes its own consumer exactly once
proptest! {
    #[test]
    fn test_registry_lookup_collects_all_matching_prefixes(
        prefixes in prop::collection::btree_set("[ab]{0,3}", 1..6),
        key in "[ab]{0,6}",
    ) {
        let registry = ChangeRegistry::new();
        for prefix in &prefixes {
            registry.register(prefix.clone(), consumer(prefix));
        }
        let expected: Vec<&str> = prefixes
            .iter()
            .filter(|p| key.starts_with(p.as_str()))
            .map(String::as_str)
            .collect();

        let found = registry.lookup(&ConfigKey::from(key.as_str()));
        let mut names: Vec<&str> = found.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        prop_assert_eq!(names, expected);
    }
}

// Unicode keys never split a character when probing prefixes
proptest! {
    #[test]
    fn test_prefixes_are_char_boundaries(s in "\\PC{0,12}") {
        let key = ConfigKey::from(s.clone());
        let prefixes: Vec<&str> = key.prefixes().collect();
        prop_assert_eq!(prefixes.len(), s.chars().count() + 1);
        for p in prefixes {
            prop_assert!(s.starts_with(p));
        }
    }
}

// The lowest priority number that defines a key supplies its value
proptest! {
    #[test]
    fn test_chain_lowest_priority_wins(
        layers in prop::collection::vec((0i32..5, prop::option::of("[a-z]{1,4}")), 1..8),
    ) {
        let mut chain = SourceChain::new("composed");
        for (i, (priority, value)) in layers.iter().enumerate() {
            let pairs: Vec<(&str, &str)> = value.iter().map(|v| ("k", v.as_str())).collect();
            chain.add_layer(*priority, Arc::new(MapSource::from_pairs(format!("layer{}", i), pairs)));
        }

        // Stable sort keeps declaration order among equal priorities.
        let mut ordered: Vec<&(i32, Option<String>)> = layers.iter().collect();
        ordered.sort_by_key(|(priority, _)| *priority);
        let expected = ordered.iter().find_map(|(_, value)| value.clone());

        let resolved = chain.resolve(&ConfigKey::from("k")).map(ConfigValue::into_string);
        prop_assert_eq!(resolved, expected);
    }
}
