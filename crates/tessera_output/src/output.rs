//! Deferred values.
//!
//! An [`Output`] is a value that becomes available later, together with
//! three facts that travel with it:
//!
//! - the set of resources it depends on
//! - whether it is known (a preview may never learn the real value)
//! - whether it is secret
//!
//! Each fact is an independently awaitable, memoized computation. Cloning
//! an `Output` is cheap and every clone observes the same results; no
//! underlying computation runs more than once.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tessera_core::RunContext;
//! use tessera_output::output::Output;
//!
//! # futures::executor::block_on(async {
//! let ctx = RunContext::update();
//! let port = Output::from_value(json!(8080));
//! let url = port.apply(&ctx, |port| json!(format!("http://localhost:{port}")));
//!
//! assert_eq!(url.future().await.unwrap(), Some(json!("http://localhost:8080")));
//! assert!(url.is_known().await.unwrap());
//! # });
//! ```

use core::fmt;
use core::future::Future;

use futures::future::{self, BoxFuture, FutureExt, Shared, TryFutureExt};
use serde_json::Value;
use tessera_core::RunContext;
use tessera_core::sig::resource_reference;
use tessera_core::unknown::{contains_unknowns, is_unknown, unknown};

use crate::error::OutputError;
use crate::input::Input;
use crate::resource::{ResourceHandle, ResourceSet};

/// A memoized asynchronous fact shared by every clone of an [`Output`].
type Fact<T> = Shared<BoxFuture<'static, Result<T, OutputError>>>;

fn fact<T, F>(future: F) -> Fact<T>
where
    T: Clone,
    F: Future<Output = Result<T, OutputError>> + Send + 'static,
{
    future.boxed().shared()
}

fn ready<T>(value: T) -> Fact<T>
where
    T: Clone + Send + 'static,
{
    fact(future::ready(Ok(value)))
}

/// All four facts of an output, resolved.
#[derive(Clone)]
struct Resolution {
    resources: ResourceSet,
    value: Value,
    known: bool,
    secret: bool,
}

/// A deferred value with dependency, known-ness and secrecy tracking.
#[derive(Clone)]
pub struct Output {
    resources: Fact<ResourceSet>,
    value: Fact<Value>,
    known: Fact<bool>,
    secret: Fact<bool>,
}

impl Output {
    /// Creates a non-secret output from pending value and known-ness.
    pub fn new<V, K>(resources: ResourceSet, value: V, known: K) -> Self
    where
        V: Future<Output = Result<Value, OutputError>> + Send + 'static,
        K: Future<Output = Result<bool, OutputError>> + Send + 'static,
    {
        Self::with_secret(resources, value, known, future::ready(Ok(false)))
    }

    /// Creates an output from pending value, known-ness and secrecy.
    ///
    /// Whatever `known` resolves to, the output reports unknown when its
    /// value contains the unknown sentinel anywhere.
    pub fn with_secret<V, K, S>(resources: ResourceSet, value: V, known: K, secret: S) -> Self
    where
        V: Future<Output = Result<Value, OutputError>> + Send + 'static,
        K: Future<Output = Result<bool, OutputError>> + Send + 'static,
        S: Future<Output = Result<bool, OutputError>> + Send + 'static,
    {
        Self::assemble(ready(resources), fact(value), fact(known), fact(secret))
    }

    /// Creates an output whose facts are already settled.
    #[must_use]
    pub fn from_resolved(resources: ResourceSet, value: Value, known: bool, secret: bool) -> Self {
        Self::assemble(ready(resources), ready(value), ready(known), ready(secret))
    }

    /// A known, non-secret output without dependencies.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self::from_resolved(ResourceSet::new(), value, true, false)
    }

    /// An output whose value is the unknown sentinel.
    #[must_use]
    pub fn unknown() -> Self {
        Self::from_resolved(ResourceSet::new(), unknown(), false, false)
    }

    fn assemble(
        resources: Fact<ResourceSet>,
        value: Fact<Value>,
        known: Fact<bool>,
        secret: Fact<bool>,
    ) -> Self {
        let known = {
            let value = value.clone();
            fact(async move {
                if !known.await? {
                    return Ok(false);
                }
                Ok(!contains_unknowns(&value.await?))
            })
        };
        Self {
            resources,
            value,
            known,
            secret,
        }
    }

    fn from_resolution<F>(run: F) -> Self
    where
        F: Future<Output = Result<Resolution, OutputError>> + Send + 'static,
    {
        let run = fact(run);
        Self::assemble(
            fact(run.clone().map_ok(|r| r.resources)),
            fact(run.clone().map_ok(|r| r.value)),
            fact(run.clone().map_ok(|r| r.known)),
            fact(run.map_ok(|r| r.secret)),
        )
    }

    async fn resolve(&self) -> Result<Resolution, OutputError> {
        let (resources, value, known, secret) = futures::try_join!(
            self.resources.clone(),
            self.value.clone(),
            self.known.clone(),
            self.secret.clone(),
        )?;
        Ok(Resolution {
            resources,
            value,
            known,
            secret,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Readers
    // ─────────────────────────────────────────────────────────────────────

    /// Resolves the value, or `None` if it is not fully known.
    ///
    /// # Errors
    ///
    /// Returns the [`OutputError`] the value failed with.
    pub async fn future(&self) -> Result<Option<Value>, OutputError> {
        let value = self.value.clone().await?;
        Ok((!contains_unknowns(&value)).then_some(value))
    }

    /// Resolves the value with any unknown sentinels left in place.
    ///
    /// # Errors
    ///
    /// Returns the [`OutputError`] the value failed with.
    pub async fn future_with_unknowns(&self) -> Result<Value, OutputError> {
        self.value.clone().await
    }

    /// Resolves whether the value is known.
    ///
    /// # Errors
    ///
    /// Returns the [`OutputError`] the output failed with.
    pub async fn is_known(&self) -> Result<bool, OutputError> {
        self.known.clone().await
    }

    /// Resolves whether the value is secret.
    ///
    /// # Errors
    ///
    /// Returns the [`OutputError`] the output failed with.
    pub async fn is_secret(&self) -> Result<bool, OutputError> {
        self.secret.clone().await
    }

    /// Resolves the resources this output depends on.
    ///
    /// # Errors
    ///
    /// Returns the [`OutputError`] the output failed with.
    pub async fn resources(&self) -> Result<ResourceSet, OutputError> {
        self.resources.clone().await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Combinators
    // ─────────────────────────────────────────────────────────────────────

    /// Transforms the value once it is available.
    ///
    /// `f` may return a plain [`Value`], another [`Output`] or a pending
    /// future (see [`Applied`]). During a preview `f` is not called at all
    /// when the value is unknown; the result is then unknown, keeps this
    /// output's secrecy and depends on the same resources.
    ///
    /// When `f` returns an output, the result depends on both outputs'
    /// resources, is secret if either is, and takes its known-ness from
    /// the returned output.
    pub fn apply<F, R>(&self, ctx: &RunContext, f: F) -> Output
    where
        F: FnOnce(Value) -> R + Send + 'static,
        R: Into<Applied>,
    {
        self.apply_inner(ctx.is_preview(), false, f)
    }

    /// Like [`apply`](Self::apply), but always calls `f`.
    ///
    /// If this output is unknown and its value holds no sentinel, `f` sees
    /// the sentinel in its place.
    pub fn apply_with_unknowns<F, R>(&self, f: F) -> Output
    where
        F: FnOnce(Value) -> R + Send + 'static,
        R: Into<Applied>,
    {
        self.apply_inner(false, true, f)
    }

    fn apply_inner<F, R>(&self, preview: bool, with_unknowns: bool, f: F) -> Output
    where
        F: FnOnce(Value) -> R + Send + 'static,
        R: Into<Applied>,
    {
        let source = self.clone();
        Self::from_resolution(async move {
            let Resolution {
                mut resources,
                mut value,
                known,
                secret,
            } = source.resolve().await?;

            if !known && preview && !with_unknowns {
                tracing::trace!("skipping transform of unknown value during preview");
                return Ok(Resolution {
                    resources,
                    value: unknown(),
                    known: false,
                    secret,
                });
            }
            if !known && with_unknowns && !contains_unknowns(&value) {
                value = unknown();
            }

            let applied: Applied = f(value).into();
            let value = match applied {
                Applied::Output(inner) => {
                    let inner = inner.resolve().await?;
                    resources.extend(inner.resources);
                    return Ok(Resolution {
                        resources,
                        value: inner.value,
                        known: inner.known,
                        secret: secret || inner.secret,
                    });
                }
                Applied::Future(pending) => pending.await?,
                Applied::Value(value) => value,
            };
            Ok(Resolution {
                resources,
                known: !contains_unknowns(&value),
                value,
                secret,
            })
        })
    }

    /// Looks up a map field or list position.
    ///
    /// Indexing an unknown value yields an unknown output; indexing a
    /// known value that lacks the key fails with
    /// [`OutputError::MissingKey`].
    pub fn index(&self, key: impl Into<Key>) -> Output {
        let key = key.into();
        self.apply_with_unknowns(move |value| {
            if is_unknown(&value) {
                return Ok(value);
            }
            lookup(value, &key)
        })
    }

    /// Combines outputs into one whose value is the list of their values.
    ///
    /// The result depends on every input's resources, is known only if
    /// all inputs are and is secret if any input is.
    pub fn all(outputs: impl IntoIterator<Item = Output>) -> Output {
        Self::join(outputs.into_iter().collect(), Value::Array)
    }

    fn join<F>(outputs: Vec<Output>, assemble: F) -> Output
    where
        F: FnOnce(Vec<Value>) -> Value + Send + 'static,
    {
        Self::from_resolution(async move {
            let resolved = future::try_join_all(outputs.iter().map(Output::resolve)).await?;

            let mut resources = ResourceSet::new();
            let mut known = true;
            let mut secret = false;
            let mut values = Vec::with_capacity(resolved.len());
            for part in resolved {
                resources.extend(part.resources);
                known &= part.known;
                secret |= part.secret;
                if !part.known && !contains_unknowns(&part.value) {
                    values.push(unknown());
                } else {
                    values.push(part.value);
                }
            }

            Ok(Resolution {
                resources,
                value: assemble(values),
                known,
                secret,
            })
        })
    }

    fn join_fields(fields: impl IntoIterator<Item = (String, Input)>) -> Output {
        let (keys, outputs): (Vec<String>, Vec<Output>) = fields
            .into_iter()
            .map(|(key, input)| (key, Output::from_input(input)))
            .unzip();
        Self::join(outputs, move |values| {
            Value::Object(keys.into_iter().zip(values).collect())
        })
    }

    /// Lifts any [`Input`] into a single output.
    ///
    /// Lists and maps are joined element-wise as by [`all`](Self::all);
    /// argument bags become maps keyed by wire name. A resource lifts to
    /// its reference map and depends on itself.
    pub fn from_input(input: impl Into<Input>) -> Output {
        match input.into() {
            Input::Value(value) => Self::from_value(value),
            Input::Output(output) => output,
            Input::List(items) => Self::all(items.into_iter().map(Output::from_input)),
            Input::Map(entries) => Self::join_fields(entries),
            Input::Args(args) => Self::join_fields(args.into_wire_fields()),
            Input::Future(pending) => Self::from_resolution(async move {
                Output::from_input(pending.await?).resolve().await
            }),
            Input::Resource(resource) => Self::from_resource(resource),
            Input::Asset(asset) => Self::from_value(asset.to_value()),
            Input::Archive(archive) => Self::from_value(archive.to_value()),
        }
    }

    fn from_resource(resource: ResourceHandle) -> Output {
        Self::from_resolution(async move {
            let urn = resource.urn().future_with_unknowns().await?;
            let id = match resource.id() {
                Some(id) => Some(id.future_with_unknowns().await?),
                None => None,
            };
            let mut resources = ResourceSet::new();
            resources.insert(resource);
            Ok(Resolution {
                resources,
                value: resource_reference(urn, id),
                known: true,
                secret: false,
            })
        })
    }

    /// Lifts `input` and marks the result secret.
    pub fn secret(input: impl Into<Input>) -> Output {
        let output = Self::from_input(input);
        Self {
            secret: ready(true),
            ..output
        }
    }

    /// Returns this output with secrecy removed.
    #[must_use]
    pub fn unsecret(&self) -> Output {
        Self {
            secret: ready(false),
            ..self.clone()
        }
    }

    /// Concatenates the string forms of `parts`.
    ///
    /// Strings contribute their contents, other values their JSON text. If
    /// any part is unknown the result is unknown.
    pub fn concat<T: Into<Input>>(parts: impl IntoIterator<Item = T>) -> Output {
        Self::all(parts.into_iter().map(Output::from_input)).apply_with_unknowns(|joined| {
            if contains_unknowns(&joined) {
                return unknown();
            }
            let parts = match joined {
                Value::Array(parts) => parts,
                other => return other,
            };
            let text: String = parts
                .iter()
                .map(|part| match part {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Value::String(text)
        })
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Output");
        if matches!(self.secret.peek(), Some(Ok(true))) {
            out.field("value", &"[secret]");
        } else {
            match self.value.peek() {
                Some(Ok(value)) => out.field("value", value),
                Some(Err(err)) => out.field("error", err),
                None => out.field("value", &"<pending>"),
            };
        }
        if let Some(Ok(known)) = self.known.peek() {
            out.field("known", known);
        }
        out.finish_non_exhaustive()
    }
}

/// What an [`Output::apply`] transform may return.
pub enum Applied {
    /// A plain value.
    Value(Value),
    /// Another output, flattened into the result.
    Output(Output),
    /// A pending value.
    Future(BoxFuture<'static, Result<Value, OutputError>>),
}

impl Applied {
    /// Wraps a pending value.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, OutputError>> + Send + 'static,
    {
        Self::Future(future.boxed())
    }
}

impl From<Value> for Applied {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Output> for Applied {
    fn from(output: Output) -> Self {
        Self::Output(output)
    }
}

impl From<Result<Value, OutputError>> for Applied {
    fn from(result: Result<Value, OutputError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(err) => Self::Future(future::ready(Err(err)).boxed()),
        }
    }
}

/// A map field or list position for [`Output::index`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A map field.
    Field(String),
    /// A list position.
    Position(usize),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Field(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for Key {
    fn from(position: usize) -> Self {
        Self::Position(position)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name:?}"),
            Self::Position(position) => write!(f, "{position}"),
        }
    }
}

fn lookup(value: Value, key: &Key) -> Result<Value, OutputError> {
    match (value, key) {
        (Value::Object(mut map), Key::Field(name)) => map
            .remove(name)
            .ok_or_else(|| OutputError::MissingKey(key.to_string())),
        (Value::Array(mut items), Key::Position(position)) if *position < items.len() => {
            Ok(items.swap_remove(*position))
        }
        (Value::Array(_), Key::Position(_)) => Err(OutputError::MissingKey(key.to_string())),
        (other, _) => Err(OutputError::NotIndexable {
            key: key.to_string(),
            kind: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
