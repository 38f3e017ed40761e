// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compose remote namespaces, then watch a bound consumer follow live changes.
//!
//! This example demonstrates:
//! - Declaring namespaces at two priorities and composing them into a stack
//! - Binding a consumer under a key prefix
//! - A visible change rebinding the consumer
//! - A shadowed change leaving the consumer alone
//!
//! To run this example:
//! ```bash
//! cargo run --example live_update
//! ```

use overlaycfg::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== overlaycfg: Live Update ===\n");

    let client = Arc::new(InMemoryConfigClient::new());
    client.publish("app", [("db.pool.size", "8")]);
    client.publish("common", [("db.pool.size", "4"), ("db.url", "jdbc:common")]);

    let overlay = ConfigOverlay::builder(client.clone())
        .with_settings(OverlaySettings::default().with_search_locations(Vec::<PathBuf>::new()))
        .build()?;
    overlay.add_namespaces(["app"], 1);
    overlay.add_namespaces(["common"], 2);

    let stack = Arc::new(PropertyStack::new());
    println!("compose: {:?}", overlay.compose_once(&stack));
    println!("db.pool.size = {:?}\n", stack.get_property_str("db.pool.size"));

    let pool_size = Arc::new(AtomicU64::new(0));
    let target = Arc::clone(&pool_size);
    let pool: Arc<dyn Rebindable> = Arc::new(RebindFn::new("pool", move |env: &dyn Environment| {
        let size = env
            .get_property_str("db.pool.size")
            .map(|v| v.parse::<u64>("db.pool.size"))
            .transpose()?
            .unwrap_or(0);
        target.store(size, Ordering::SeqCst);
        println!("  pool rebound with size {}", size);
        Ok(())
    }));

    println!("wire: {:?}\n", overlay.wire_auto_update_once(stack.clone(), [("db.", pool)]));

    println!("--- app raises the pool size (visible) ---");
    client.publish("app", [("db.pool.size", "16")]);
    println!("pool size is now {}\n", pool_size.load(Ordering::SeqCst));

    println!("--- common changes it too (shadowed by app) ---");
    client.publish("common", [("db.pool.size", "2"), ("db.url", "jdbc:common")]);
    println!("pool size is still {}\n", pool_size.load(Ordering::SeqCst));

    println!("--- app drops its override ---");
    client.publish("app", Vec::<(String, String)>::new());
    println!("pool size falls back to {}", pool_size.load(Ordering::SeqCst));

    Ok(())
}
