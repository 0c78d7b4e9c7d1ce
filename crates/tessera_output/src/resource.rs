//! Resource handles.
//!
//! Resources are registered and owned by code outside Tessera. Tessera only
//! needs to name them on the wire and to track which resources a deferred
//! value depends on, so it sees them through the [`Resource`] trait and
//! holds them as [`ResourceHandle`]s.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexSet;

use crate::output::Output;

/// A provisioned or in-flight resource.
///
/// Custom resources have an instance id assigned by their provider;
/// component resources only group other resources and have none.
pub trait Resource: Send + Sync + 'static {
    /// The resource's identity, resolved asynchronously by the engine.
    fn urn(&self) -> &Output;

    /// The provider-assigned instance id, or `None` for component resources.
    fn id(&self) -> Option<&Output> {
        None
    }
}

/// Shared, identity-compared reference to a [`Resource`].
///
/// Two handles are equal only if they point at the same resource object;
/// the resource's own properties play no part.
#[derive(Clone)]
pub struct ResourceHandle(Arc<dyn Resource>);

impl ResourceHandle {
    /// Wraps a resource.
    pub fn new<R: Resource>(resource: R) -> Self {
        Self(Arc::new(resource))
    }

    /// Wraps an already shared resource.
    #[must_use]
    pub fn from_arc(resource: Arc<dyn Resource>) -> Self {
        Self(resource)
    }

    /// Returns the resource's urn output.
    #[must_use]
    pub fn urn(&self) -> &Output {
        self.0.urn()
    }

    /// Returns the resource's id output, if it is a custom resource.
    #[must_use]
    pub fn id(&self) -> Option<&Output> {
        self.0.id()
    }

    /// Returns `true` for component resources, which carry no instance id.
    #[must_use]
    pub fn is_component(&self) -> bool {
        self.0.id().is_none()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for ResourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for ResourceHandle {}

impl Hash for ResourceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_component() {
            "component"
        } else {
            "custom"
        };
        write!(f, "ResourceHandle({kind} @ {:p})", self.addr())
    }
}

/// Insertion-ordered set of resource dependencies.
pub type ResourceSet = IndexSet<ResourceHandle>;
