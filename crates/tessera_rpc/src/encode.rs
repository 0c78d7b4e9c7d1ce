//! Structural encoder.
//!
//! [`PropertyEncoder`] turns an [`Input`] tree into a plain wire
//! [`Value`], resolving every deferred value it meets and recording the
//! resources the result depends on in a caller-provided sink.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tessera_core::RunContext;
//! use tessera_output::input::Input;
//! use tessera_output::output::Output;
//! use tessera_rpc::encode::PropertyEncoder;
//!
//! # futures::executor::block_on(async {
//! let encoder = PropertyEncoder::new(RunContext::update());
//! let input = Input::from_iter([
//!     ("name", Input::from("web")),
//!     ("port", Output::from_value(json!(8080)).into()),
//! ]);
//!
//! let mut deps = Vec::new();
//! let wire = encoder.encode(&input, &mut deps).await.unwrap();
//! assert_eq!(wire, json!({"name": "web", "port": 8080}));
//! assert!(deps.is_empty());
//! # });
//! ```

use core::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tessera_core::RunContext;
use tessera_core::sig::{Signature, resource_reference, wrap_secret};
use tessera_core::unknown::unknown;
use tessera_output::input::Input;
use tessera_output::output::Output;
use tessera_output::resource::{ResourceHandle, ResourceSet};

use crate::error::EncodeError;

/// Rewrites map keys on their way to the wire.
pub type KeyTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Encoded top-level properties with per-property dependencies.
#[derive(Debug, Clone, Default)]
pub struct EncodedProperties {
    /// The encoded properties, without those that encoded to null.
    pub properties: Map<String, Value>,
    /// The resources each property depends on, keyed by wire name.
    pub dependencies: IndexMap<String, Vec<ResourceHandle>>,
}

/// Encodes [`Input`] trees into wire values.
#[derive(Clone)]
pub struct PropertyEncoder {
    ctx: RunContext,
    key_transform: Option<KeyTransform>,
    output_values: bool,
}

impl PropertyEncoder {
    /// Creates an encoder for the given run.
    #[must_use]
    pub fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            key_transform: None,
            output_values: false,
        }
    }

    /// Rewrites keys of plain maps with `transform`.
    ///
    /// Wire names of argument bags, archive member names and the keys of
    /// special forms are never rewritten.
    #[must_use]
    pub fn with_key_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.key_transform = Some(Arc::new(transform));
        self
    }

    /// Emits deferred values as first-class output values when the engine
    /// supports them.
    #[must_use]
    pub fn with_output_values(mut self, enabled: bool) -> Self {
        self.output_values = enabled;
        self
    }

    /// Returns the run context.
    #[must_use]
    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Encodes `input`, appending every resource the result depends on to
    /// `sink` in traversal order.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Output`] if a deferred value in the tree
    /// fails. Resources appended before the failure are left in `sink`.
    pub fn encode<'a>(
        &'a self,
        input: &'a Input,
        sink: &'a mut Vec<ResourceHandle>,
    ) -> BoxFuture<'a, Result<Value, EncodeError>> {
        Box::pin(async move {
            match input {
                Input::Value(value) => Ok(self.encode_plain(value)),
                Input::List(items) => {
                    let mut encoded = Vec::with_capacity(items.len());
                    for item in items {
                        encoded.push(self.encode(item, sink).await?);
                    }
                    Ok(Value::Array(encoded))
                }
                Input::Map(entries) => {
                    let mut encoded = Map::new();
                    for (key, item) in entries {
                        let value = self.encode(item, sink).await?;
                        encoded.insert(self.transform_key(key), value);
                    }
                    Ok(Value::Object(encoded))
                }
                Input::Args(args) => {
                    let mut encoded = Map::new();
                    for field in args.fields() {
                        let value = self.encode(&field.value, sink).await?;
                        encoded.insert(field.wire_name.clone(), value);
                    }
                    Ok(Value::Object(encoded))
                }
                Input::Output(output) => self.encode_output(output, sink).await,
                Input::Future(pending) => {
                    let resolved = pending.clone().await?;
                    self.encode(&resolved, sink).await
                }
                Input::Resource(resource) => self.encode_resource(resource, sink).await,
                Input::Asset(asset) => Ok(asset.to_value()),
                Input::Archive(archive) => Ok(archive.to_value()),
            }
        })
    }

    /// Encodes arbitrary serde data.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Input`] for shapes without an encoder rule,
    /// such as structs, tuples and byte buffers.
    pub async fn encode_serializable<T: Serialize + ?Sized>(
        &self,
        value: &T,
        sink: &mut Vec<ResourceHandle>,
    ) -> Result<Value, EncodeError> {
        let input = Input::from_serialize(value)?;
        self.encode(&input, sink).await
    }

    /// Encodes a resource's top-level property map.
    ///
    /// Property names go through the key transform. Properties that encode
    /// to null are left out of the map, but still get a (possibly empty)
    /// dependency entry.
    ///
    /// # Errors
    ///
    /// Fails on the first property that fails to encode.
    pub async fn encode_properties(
        &self,
        props: &IndexMap<String, Input>,
    ) -> Result<EncodedProperties, EncodeError> {
        let mut encoded = EncodedProperties::default();
        for (name, input) in props {
            let mut sink = Vec::new();
            let value = self.encode(input, &mut sink).await?;
            let key = self.transform_key(name);
            if !value.is_null() {
                encoded.properties.insert(key.clone(), value);
            }
            encoded.dependencies.insert(key, sink);
        }
        Ok(encoded)
    }

    async fn encode_output(
        &self,
        output: &Output,
        sink: &mut Vec<ResourceHandle>,
    ) -> Result<Value, EncodeError> {
        let resources = output.resources().await?;
        if !resources.is_empty() {
            tracing::trace!(count = resources.len(), "recording output dependencies");
        }
        sink.extend(resources.iter().cloned());

        if self.output_values && self.ctx.features().output_values {
            return self.output_value_form(output, &resources).await;
        }
        self.encode_deferred(output).await
    }

    async fn encode_deferred(&self, output: &Output) -> Result<Value, EncodeError> {
        if !output.is_known().await? {
            return Ok(unknown());
        }
        let value = self.encode_plain(&output.future_with_unknowns().await?);
        if output.is_secret().await? && self.ctx.features().secrets {
            tracing::trace!("wrapping secret value");
            return Ok(wrap_secret(value));
        }
        Ok(value)
    }

    async fn output_value_form(
        &self,
        output: &Output,
        resources: &ResourceSet,
    ) -> Result<Value, EncodeError> {
        let mut form = Signature::OutputValue.tagged_map();
        if output.is_known().await? {
            let value = self.encode_plain(&output.future_with_unknowns().await?);
            form.insert("value".to_owned(), value);
        }
        if output.is_secret().await? {
            form.insert("secret".to_owned(), Value::Bool(true));
        }

        let mut urns = Vec::with_capacity(resources.len());
        for resource in resources {
            if let Some(Value::String(urn)) = resource.urn().future().await? {
                urns.push(urn);
            }
        }
        urns.sort();
        urns.dedup();
        if !urns.is_empty() {
            form.insert(
                "dependencies".to_owned(),
                Value::Array(urns.into_iter().map(Value::String).collect()),
            );
        }
        Ok(Value::Object(form))
    }

    async fn encode_resource(
        &self,
        resource: &ResourceHandle,
        sink: &mut Vec<ResourceHandle>,
    ) -> Result<Value, EncodeError> {
        tracing::trace!(?resource, "recording resource dependency");
        sink.push(resource.clone());

        sink.extend(resource.urn().resources().await?);
        let urn = self.encode_deferred(resource.urn()).await?;
        let id = match resource.id() {
            Some(id) => {
                sink.extend(id.resources().await?);
                Some(self.encode_deferred(id).await?)
            }
            None => None,
        };

        if self.ctx.features().resource_references {
            return Ok(resource_reference(urn, id));
        }
        Ok(id.unwrap_or(urn))
    }

    /// Copies a plain value, rewriting keys of ordinary maps.
    ///
    /// Resource references embedded in the value (a lifted resource, for
    /// instance) collapse to their id or urn when the engine does not
    /// accept references.
    fn encode_plain(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| self.encode_plain(v)).collect()),
            Value::Object(map) => match Signature::of_map(map) {
                None => Value::Object(
                    map.iter()
                        .map(|(key, v)| (self.transform_key(key), self.encode_plain(v)))
                        .collect(),
                ),
                Some(Ok(Signature::Resource)) if !self.ctx.features().resource_references => {
                    tracing::trace!("collapsing embedded resource reference");
                    reference_target(map)
                }
                // Special forms keep their field names.
                Some(_) => value.clone(),
            },
            other => other.clone(),
        }
    }

    fn transform_key(&self, key: &str) -> String {
        let Some(transform) = &self.key_transform else {
            return key.to_owned();
        };
        let transformed = transform(key);
        if transformed != key {
            tracing::debug!(from = key, to = %transformed, "transformed property key");
        }
        transformed
    }
}

impl fmt::Debug for PropertyEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyEncoder")
            .field("ctx", &self.ctx)
            .field("key_transform", &self.key_transform.is_some())
            .field("output_values", &self.output_values)
            .finish()
    }
}

/// The id of a resource reference map if it has a non-empty one, else its urn.
fn reference_target(map: &Map<String, Value>) -> Value {
    match map.get("id") {
        Some(id @ Value::String(s)) if !s.is_empty() => id.clone(),
        _ => map.get("urn").cloned().unwrap_or(Value::Null),
    }
}

/// Encodes `input` with a default [`PropertyEncoder`] for `ctx`.
///
/// # Errors
///
/// See [`PropertyEncoder::encode`].
pub async fn encode(
    ctx: &RunContext,
    input: &Input,
    sink: &mut Vec<ResourceHandle>,
) -> Result<Value, EncodeError> {
    PropertyEncoder::new(*ctx).encode(input, sink).await
}
