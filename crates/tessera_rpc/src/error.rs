//! Error types for the wire encoder and decoder.

use tessera_core::error::AssetError;
use tessera_output::error::{InputError, OutputError};

/// An input tree could not be encoded.
///
/// Dependencies appended to the sink before the failure stay there.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The input has no encoder rule.
    #[error(transparent)]
    Input(#[from] InputError),

    /// A deferred value in the tree failed to resolve.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// A wire value could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A map carries a signature marker this decoder does not know.
    #[error("unrecognized signature: {0}")]
    UnrecognizedSignature(String),

    /// A special form lacks a required field.
    #[error("{kind} is missing {field}")]
    MissingField {
        /// The special form being decoded.
        kind: &'static str,
        /// The missing field.
        field: String,
    },

    /// A special form has a field of the wrong type.
    #[error("{kind} has an invalid {field}")]
    InvalidField {
        /// The special form being decoded.
        kind: &'static str,
        /// The offending field.
        field: String,
    },
}

impl From<AssetError> for DecodeError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotAnAsset => Self::InvalidField {
                kind: "asset",
                field: "signature".to_owned(),
            },
            AssetError::MissingContent { kind, expected } => Self::MissingField {
                kind,
                field: format!("one of {expected}"),
            },
            AssetError::InvalidField { kind, field, .. } => Self::InvalidField { kind, field },
        }
    }
}
