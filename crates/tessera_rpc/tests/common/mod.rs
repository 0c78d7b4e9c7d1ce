//! Shared test utilities for `tessera_rpc` integration tests.
//!
//! Import via `mod common;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities; not all items used in every test binary"
)]

use std::sync::Once;

use futures::future;
use serde_json::Value;
use tessera_core::RunContext;
use tessera_core::context::FeatureSupport;
use tessera_output::output::Output;
use tessera_output::resource::{Resource, ResourceHandle, ResourceSet};

static INIT: Once = Once::new();

/// Installs a test-writer tracing subscriber (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXTS
// ═══════════════════════════════════════════════════════════════════════════════

/// An update run against an engine with no optional wire support.
pub fn legacy() -> RunContext {
    RunContext::update()
}

/// An update run against an engine with every optional wire form.
pub fn modern() -> RunContext {
    RunContext::update().with_features(FeatureSupport::all())
}

/// An update run with resource references only.
pub fn with_references() -> RunContext {
    RunContext::update().with_features(FeatureSupport {
        resource_references: true,
        ..FeatureSupport::default()
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Creates an output whose value resolves after yielding to the scheduler.
pub fn create_output(value: Value, known: bool, secret: bool, resources: ResourceSet) -> Output {
    Output::with_secret(
        resources,
        async move {
            tokio::task::yield_now().await;
            Ok(value)
        },
        future::ready(Ok(known)),
        future::ready(Ok(secret)),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════════════

pub struct CustomResource {
    urn: Output,
    id: Output,
}

impl Resource for CustomResource {
    fn urn(&self) -> &Output {
        &self.urn
    }

    fn id(&self) -> Option<&Output> {
        Some(&self.id)
    }
}

pub struct ComponentResource {
    urn: Output,
}

impl Resource for ComponentResource {
    fn urn(&self) -> &Output {
        &self.urn
    }
}

/// A custom resource with the given urn and the id `"id"`.
pub fn custom(urn: &str) -> ResourceHandle {
    ResourceHandle::new(CustomResource {
        urn: Output::from_value(Value::from(urn)),
        id: Output::from_value(Value::from("id")),
    })
}

/// A component resource with the given urn.
pub fn component(urn: &str) -> ResourceHandle {
    ResourceHandle::new(ComponentResource {
        urn: Output::from_value(Value::from(urn)),
    })
}

/// Collects handles into a dependency set.
pub fn resource_set(handles: &[&ResourceHandle]) -> ResourceSet {
    handles.iter().map(|handle| (*handle).clone()).collect()
}
