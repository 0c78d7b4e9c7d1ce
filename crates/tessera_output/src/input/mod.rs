//! Encoder inputs.
//!
//! [`Input`] is the closed set of shapes a property tree may be built from:
//! plain data, deferred values, pending futures, resources, payload
//! references and declared argument bags. The encoder has exactly one rule
//! per variant, and [`Output::from_input`](crate::output::Output::from_input)
//! lifts any of them into a single deferred value.
//!
//! Arbitrary [`serde::Serialize`] data enters through
//! [`Input::from_serialize`], which is also where shapes without an encoder
//! rule are rejected.

mod ser;

use core::fmt;
use core::future::Future;

use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tessera_core::asset::{Archive, Asset, AssetOrArchive};

use crate::error::{InputError, OutputError};
use crate::output::Output;
use crate::resource::ResourceHandle;

pub use input_macros::InputType;

/// A pending computation producing an [`Input`], awaited at most once.
pub type InputFuture = Shared<BoxFuture<'static, Result<Input, OutputError>>>;

/// One node of a property tree.
#[derive(Clone)]
pub enum Input {
    /// Plain data. Nested JSON maps are still subject to key transforms.
    Value(Value),
    /// An ordered sequence of inputs.
    List(Vec<Input>),
    /// A string-keyed mapping of inputs, in insertion order.
    Map(IndexMap<String, Input>),
    /// A declared argument bag with explicit wire names.
    Args(InputArgs),
    /// A deferred value.
    Output(Output),
    /// A future resolving to another input.
    Future(InputFuture),
    /// A resource handle.
    Resource(ResourceHandle),
    /// An asset.
    Asset(Asset),
    /// An archive.
    Archive(Archive),
}

impl Input {
    /// The null input.
    #[must_use]
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// Wraps a future whose result is itself an input.
    ///
    /// The future is polled to completion at most once, however many times
    /// the input is cloned or encoded.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<Input, OutputError>> + Send + 'static,
    {
        Self::Future(future.boxed().shared())
    }

    /// Converts serde data into an input tree.
    ///
    /// Sequences become lists, maps become maps, unit enum variants become
    /// their variant name and scalars pass through. A `Vec<u8>` or `&[u8]`
    /// is an ordinary sequence to serde and becomes a list of numbers; only
    /// types that serialize as raw bytes are rejected.
    ///
    /// # Errors
    ///
    /// - [`InputError::UnsupportedShape`] for tuples, tuple structs, ranges
    ///   and raw byte buffers
    /// - [`InputError::UnexpectedType`] for structs and data-carrying enum
    ///   variants; declare those as [`InputType`]s instead
    /// - [`InputError::NonStringKey`] for maps keyed by non-strings
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, InputError> {
        value.serialize(ser::InputSerializer)
    }

    /// Returns `true` for the null input.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Returns a short name for the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Args(_) => "args",
            Self::Output(_) => "output",
            Self::Future(_) => "future",
            Self::Resource(_) => "resource",
            Self::Asset(_) => "asset",
            Self::Archive(_) => "archive",
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Args(args) => f.debug_tuple("Args").field(args).finish(),
            Self::Output(output) => f.debug_tuple("Output").field(output).finish(),
            Self::Future(_) => f.write_str("Future(..)"),
            Self::Resource(resource) => f.debug_tuple("Resource").field(resource).finish(),
            Self::Asset(asset) => f.debug_tuple("Asset").field(asset).finish(),
            Self::Archive(archive) => f.debug_tuple("Archive").field(archive).finish(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_owned()))
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Input {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_from_number!(i32, i64, u32, u64, f64);

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

impl<T: Into<Input>> From<Vec<T>> for Input {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Input>> From<IndexMap<K, V>> for Input {
    fn from(entries: IndexMap<K, V>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Input>> FromIterator<(K, V)> for Input {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Output> for Input {
    fn from(output: Output) -> Self {
        Self::Output(output)
    }
}

impl From<&Output> for Input {
    fn from(output: &Output) -> Self {
        Self::Output(output.clone())
    }
}

impl From<ResourceHandle> for Input {
    fn from(resource: ResourceHandle) -> Self {
        Self::Resource(resource)
    }
}

impl From<&ResourceHandle> for Input {
    fn from(resource: &ResourceHandle) -> Self {
        Self::Resource(resource.clone())
    }
}

impl From<Asset> for Input {
    fn from(asset: Asset) -> Self {
        Self::Asset(asset)
    }
}

impl From<Archive> for Input {
    fn from(archive: Archive) -> Self {
        Self::Archive(archive)
    }
}

impl From<AssetOrArchive> for Input {
    fn from(value: AssetOrArchive) -> Self {
        match value {
            AssetOrArchive::Asset(asset) => Self::Asset(asset),
            AssetOrArchive::Archive(archive) => Self::Archive(archive),
        }
    }
}

impl From<InputArgs> for Input {
    fn from(args: InputArgs) -> Self {
        Self::Args(args)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Declared argument bags
// ─────────────────────────────────────────────────────────────────────────────

/// One declared field of an [`InputArgs`] bag.
#[derive(Debug, Clone)]
pub struct ArgField {
    /// The programming-facing field name.
    pub name: String,
    /// The name the field travels under on the wire.
    pub wire_name: String,
    /// The field's value.
    pub value: Input,
}

/// A declared argument bag: fields tagged with explicit wire names.
///
/// Encoders emit each field under its wire name and never run wire names
/// through a key transform. Fields whose value is null are left out.
///
/// Most bags come from `#[derive(InputType)]`; building one by hand looks
/// like this:
///
/// ```
/// use tessera_output::input::InputArgs;
///
/// let args = InputArgs::new("BucketArgs")
///     .field("bucket_name", "bucketName", "logs")
///     .field("force_destroy", "forceDestroy", Some(true))
///     .field("website", "website", None::<String>);
///
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.fields()[0].wire_name, "bucketName");
/// ```
#[derive(Debug, Clone)]
pub struct InputArgs {
    type_name: &'static str,
    fields: Vec<ArgField>,
}

impl InputArgs {
    /// Creates an empty bag for the named declared type.
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    /// Adds a field, skipping it when `value` is null.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        wire_name: impl Into<String>,
        value: impl Into<Input>,
    ) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.fields.push(ArgField {
                name: name.into(),
                wire_name: wire_name.into(),
                value,
            });
        }
        self
    }

    /// Returns the declared type's name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the present fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[ArgField] {
        &self.fields
    }

    /// Returns the number of present fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks a field up by its programming-facing name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Input> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Consumes the bag, yielding `(wire name, value)` pairs in order.
    pub fn into_wire_fields(self) -> impl Iterator<Item = (String, Input)> {
        self.fields
            .into_iter()
            .map(|field| (field.wire_name, field.value))
    }
}

/// A record type declared as an argument bag.
///
/// Usually derived:
///
/// ```
/// use tessera_output::input::{Input, InputType};
///
/// #[derive(InputType)]
/// struct FooArgs {
///     #[input(name = "firstArg")]
///     first_arg: Input,
///     #[input(name = "secondArg")]
///     second_arg: Option<Input>,
/// }
///
/// let args = FooArgs { first_arg: "hello".into(), second_arg: None }.into_args();
/// assert_eq!(args.type_name(), "FooArgs");
/// assert_eq!(args.len(), 1);
/// ```
pub trait InputType {
    /// Converts the record into its argument bag.
    fn into_args(self) -> InputArgs;
}
