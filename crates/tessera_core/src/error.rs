//! Error types for configuration and payload references.

/// Error building a [`RunContext`](crate::context::RunContext).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A boolean flag held an unparseable value.
    #[error("invalid boolean for {name}: '{value}'")]
    InvalidBool {
        /// The variable name.
        name: &'static str,
        /// The raw value found.
        value: String,
    },
}

/// Error rehydrating an asset or archive from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    /// The value does not carry an asset or archive signature.
    #[error("value is not an asset or archive")]
    NotAnAsset,

    /// None of the recognized content fields is present.
    #[error("{kind} has none of the fields {expected}")]
    MissingContent {
        /// `"asset"` or `"archive"`.
        kind: &'static str,
        /// The accepted field names.
        expected: &'static str,
    },

    /// A content field has the wrong type.
    #[error("{kind} field '{field}' must be a {expected}")]
    InvalidField {
        /// `"asset"` or `"archive"`.
        kind: &'static str,
        /// The offending field.
        field: String,
        /// The expected JSON type.
        expected: &'static str,
    },
}
