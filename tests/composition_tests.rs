// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for namespace composition.

mod common;

use common::remote_only_settings;
use overlaycfg::prelude::*;
use std::sync::Arc;

fn app_and_common() -> Arc<InMemoryConfigClient> {
    let client = Arc::new(InMemoryConfigClient::new());
    client.publish("app", [("timeout", "30")]);
    client.publish("common", [("timeout", "10"), ("retries", "3")]);
    client
}

fn overlay(client: &Arc<InMemoryConfigClient>) -> ConfigOverlay {
    ConfigOverlay::builder(client.clone())
        .with_settings(remote_only_settings())
        .build()
        .unwrap()
}

#[test]
fn test_lower_priority_number_wins() {
    let client = app_and_common();
    let overlay = overlay(&client);
    overlay.add_namespaces(["common"], 2);
    overlay.add_namespaces(["app"], 1);

    let stack = PropertyStack::new();
    let outcome = overlay.compose_once(&stack);

    assert_eq!(
        outcome,
        ComposeOutcome::Composed {
            layers: vec!["app".to_string(), "common".to_string()],
            local_layers: Vec::new(),
        }
    );
    assert_eq!(stack.get_property_str("timeout").unwrap(), "30");
    assert_eq!(stack.get_property_str("retries").unwrap(), "3");
}

#[test]
fn test_compose_twice_inserts_one_layer() {
    let client = app_and_common();
    let overlay = overlay(&client);
    overlay.add_namespaces(["app", "common"], 1);

    let stack = PropertyStack::new();
    stack.add_last(Arc::new(MapSource::from_pairs("host", [("x", "1")])));
    overlay.compose_once(&stack);
    assert_eq!(overlay.compose_once(&stack), ComposeOutcome::AlreadyComposed);

    assert_eq!(stack.names(), vec!["host", "RemoteNamespaceSources"]);
    assert!(overlay.is_composed());
}

#[test]
fn test_concurrent_compose_inserts_one_layer() {
    let client = app_and_common();
    let overlay = Arc::new(overlay(&client));
    overlay.add_namespaces(["app"], 1);
    let stack = Arc::new(PropertyStack::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let overlay = Arc::clone(&overlay);
            let stack = Arc::clone(&stack);
            std::thread::spawn(move || overlay.compose_once(&stack))
        })
        .collect();
    let composed = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|o| matches!(o, ComposeOutcome::Composed { .. }))
        .count();

    assert_eq!(composed, 1);
    assert_eq!(stack.len(), 1);
}

#[test]
fn test_chain_goes_behind_bootstrap_layer() {
    let client = app_and_common();
    let overlay = overlay(&client);
    overlay.add_namespaces(["app"], 1);

    let stack = PropertyStack::new();
    stack.add_last(Arc::new(MapSource::from_pairs(
        "RemoteBootstrapSources",
        [("timeout", "99")],
    )));
    stack.add_last(Arc::new(MapSource::from_pairs("defaults", [("timeout", "1")])));
    overlay.compose_once(&stack);

    assert_eq!(
        stack.names(),
        vec!["RemoteBootstrapSources", "RemoteNamespaceSources", "defaults"]
    );
    // Bootstrapped values are never shadowed by composed namespaces.
    assert_eq!(stack.get_property_str("timeout").unwrap(), "99");
}

#[test]
fn test_chain_is_appended_without_bootstrap_layer() {
    let client = app_and_common();
    let overlay = overlay(&client);
    overlay.add_namespaces(["app"], 1);

    let stack = PropertyStack::new();
    stack.add_last(Arc::new(MapSource::from_pairs("system", [("timeout", "5")])));
    overlay.compose_once(&stack);

    assert_eq!(stack.names(), vec!["system", "RemoteNamespaceSources"]);
    assert_eq!(stack.get_property_str("timeout").unwrap(), "5");
}

#[test]
fn test_unavailable_namespace_is_skipped() {
    let client = app_and_common();
    client.set_unavailable("app", true);
    let overlay = overlay(&client);
    overlay.add_namespaces(["app"], 1);
    overlay.add_namespaces(["common"], 2);

    let stack = PropertyStack::new();
    overlay.compose_once(&stack);

    assert_eq!(overlay.composed_namespaces(), vec!["common"]);
    assert_eq!(stack.get_property_str("timeout").unwrap(), "10");
}

#[test]
fn test_namespaces_from_declaration_property() {
    let client = app_and_common();
    let overlay = ConfigOverlay::builder(client.clone())
        .with_settings(remote_only_settings().with_namespace_property("my.namespaces"))
        .build()
        .unwrap();

    let stack = PropertyStack::new();
    stack.add_last(Arc::new(MapSource::from_pairs(
        "host",
        [("my.namespaces", "app,common")],
    )));
    overlay.compose_once(&stack);

    assert_eq!(overlay.composed_namespaces(), vec!["app", "common"]);
    assert_eq!(stack.get_property_str("retries").unwrap(), "3");
}

#[test]
fn test_no_declaration_means_no_composition() {
    let client = app_and_common();
    let overlay = overlay(&client);
    let stack = PropertyStack::new();

    assert_eq!(overlay.compose_once(&stack), ComposeOutcome::NothingDeclared);
    assert!(!overlay.is_composed());
    assert!(stack.is_empty());

    // A declaration made later still composes.
    overlay.add_namespaces(["app"], 1);
    assert!(matches!(
        overlay.compose_once(&stack),
        ComposeOutcome::Composed { .. }
    ));
}

#[test]
fn test_composed_view_is_live() {
    let client = app_and_common();
    let overlay = overlay(&client);
    overlay.add_namespaces(["app"], 1);
    overlay.add_namespaces(["common"], 2);
    let stack = PropertyStack::new();
    overlay.compose_once(&stack);

    client.publish("app", [("timeout", "45")]);
    assert_eq!(stack.get_property_str("timeout").unwrap(), "45");

    client.publish("app", Vec::<(String, String)>::new());
    assert_eq!(stack.get_property_str("timeout").unwrap(), "10");
}
