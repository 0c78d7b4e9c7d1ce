//! Error types for deferred values and encoder inputs.

/// A deferred value failed to resolve.
///
/// Failures are shared with every observer of the failed fact, so the type
/// is cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    /// The underlying computation failed.
    #[error("output failed: {0}")]
    Failed(String),

    /// Indexing looked up a key or position that does not exist.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Indexing was applied to a value that is neither a list nor a map.
    #[error("cannot index {kind} with {key}")]
    NotIndexable {
        /// The key or position used.
        key: String,
        /// The JSON type of the indexed value.
        kind: &'static str,
    },
}

impl OutputError {
    /// Creates a [`Failed`](Self::Failed) error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// A value could not be converted into an [`Input`](crate::input::Input).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The value's type has no encoder rule.
    #[error("unexpected input of type {0}")]
    UnexpectedType(String),

    /// The value is an iterable shape other than a list or map.
    #[error("{0} is not a supported sequence; only lists and maps are")]
    UnsupportedShape(&'static str),

    /// A map key did not serialize to a string.
    #[error("map keys must be strings")]
    NonStringKey,

    /// Any other serialization failure.
    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for InputError {
    fn custom<T: core::fmt::Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}
