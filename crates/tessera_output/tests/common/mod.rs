//! Shared test utilities for `tessera_output` integration tests.
//!
//! Import via `mod common;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities; not all items used in every test binary"
)]

use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future;
use serde_json::Value;
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
// OUTPUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Creates an output whose value resolves after yielding to the scheduler.
pub fn create_output(value: Value, known: bool, secret: bool) -> Output {
    create_output_with_resources(value, known, secret, ResourceSet::new())
}

/// Like [`create_output`], with dependencies.
pub fn create_output_with_resources(
    value: Value,
    known: bool,
    secret: bool,
    resources: ResourceSet,
) -> Output {
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

/// Counts how often a transform ran.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
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

/// A custom resource with settled urn and id.
pub fn custom(urn: &str, id: &str) -> ResourceHandle {
    custom_with(
        Output::from_value(Value::from(urn)),
        Output::from_value(Value::from(id)),
    )
}

/// A custom resource with arbitrary urn and id outputs.
pub fn custom_with(urn: Output, id: Output) -> ResourceHandle {
    ResourceHandle::new(CustomResource { urn, id })
}

/// A component resource with a settled urn.
pub fn component(urn: &str) -> ResourceHandle {
    ResourceHandle::new(ComponentResource {
        urn: Output::from_value(Value::from(urn)),
    })
}

/// Collects handles into a dependency set.
pub fn resource_set(handles: &[&ResourceHandle]) -> ResourceSet {
    handles.iter().map(|handle| (*handle).clone()).collect()
}
