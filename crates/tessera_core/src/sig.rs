//! Reserved structural markers of the wire format.
//!
//! A wire map that carries the [`SIG_KEY`] entry is not plain data: the
//! value under that key names which special payload the map encodes.
//!
//! | Signature | Payload |
//! |-----------|---------|
//! | [`ASSET_SIG`] | inline text, local path or remote uri content |
//! | [`ARCHIVE_SIG`] | a named mapping of assets, or a path/uri archive |
//! | [`SECRET_SIG`] | a `value` that must not be displayed in plaintext |
//! | [`RESOURCE_SIG`] | a reference to a resource by `urn` (and `id`) |
//! | [`OUTPUT_VALUE_SIG`] | a deferred value with its known/secret/dependency facts |

use core::fmt;

use serde_json::{Map, Value};

/// Key identifying a special payload inside a wire map.
pub const SIG_KEY: &str = "4dabf18193072939515e22adb298388d";

/// Signature of an asset payload.
pub const ASSET_SIG: &str = "c44067f5952c0a294b673a41bacd8c17";

/// Signature of an archive payload.
pub const ARCHIVE_SIG: &str = "0def7320c3a5731c473e5ecbe6d01bc7";

/// Signature of a secret payload.
pub const SECRET_SIG: &str = "1b47061264138c4ac30d75fd1eb44270";

/// Signature of a resource reference.
pub const RESOURCE_SIG: &str = "5cf8f73096256a8f31e491e813e4eb8e";

/// Signature of a first-class output value.
pub const OUTPUT_VALUE_SIG: &str = "d0e6a833031e9bbcd3f4e8bde6ca49a4";

/// The closed set of recognized signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// [`ASSET_SIG`]
    Asset,
    /// [`ARCHIVE_SIG`]
    Archive,
    /// [`SECRET_SIG`]
    Secret,
    /// [`RESOURCE_SIG`]
    Resource,
    /// [`OUTPUT_VALUE_SIG`]
    OutputValue,
}

impl Signature {
    /// Returns the literal marker string for this signature.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => ASSET_SIG,
            Self::Archive => ARCHIVE_SIG,
            Self::Secret => SECRET_SIG,
            Self::Resource => RESOURCE_SIG,
            Self::OutputValue => OUTPUT_VALUE_SIG,
        }
    }

    /// Parses a marker string.
    #[must_use]
    pub fn parse(sig: &str) -> Option<Self> {
        match sig {
            ASSET_SIG => Some(Self::Asset),
            ARCHIVE_SIG => Some(Self::Archive),
            SECRET_SIG => Some(Self::Secret),
            RESOURCE_SIG => Some(Self::Resource),
            OUTPUT_VALUE_SIG => Some(Self::OutputValue),
            _ => None,
        }
    }

    /// Inspects the [`SIG_KEY`] entry of a wire map.
    ///
    /// Returns `None` for plain maps, `Some(Ok(_))` for a recognized
    /// signature and `Some(Err(raw))` when the marker is present but not one
    /// of the known signatures.
    #[must_use]
    pub fn of_map(map: &Map<String, Value>) -> Option<Result<Self, String>> {
        let raw = map.get(SIG_KEY)?;
        Some(match raw.as_str().and_then(Self::parse) {
            Some(sig) => Ok(sig),
            None => Err(match raw {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        })
    }

    /// Starts a wire map tagged with this signature.
    #[must_use]
    pub fn tagged_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(SIG_KEY.to_owned(), Value::String(self.as_str().to_owned()));
        map
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Asset => "asset",
            Self::Archive => "archive",
            Self::Secret => "secret",
            Self::Resource => "resource",
            Self::OutputValue => "output value",
        };
        f.write_str(name)
    }
}

/// Wraps `value` in the secret marker.
///
/// Already-wrapped values are returned unchanged, so wrapping is idempotent.
#[must_use]
pub fn wrap_secret(value: Value) -> Value {
    if is_secret(&value) {
        return value;
    }
    let mut map = Signature::Secret.tagged_map();
    map.insert("value".to_owned(), value);
    Value::Object(map)
}

/// Removes one level of secret wrapping, reporting whether there was one.
#[must_use]
pub fn unwrap_secret(value: Value) -> (Value, bool) {
    match value {
        Value::Object(mut map) if matches!(Signature::of_map(&map), Some(Ok(Signature::Secret))) => {
            (map.remove("value").unwrap_or(Value::Null), true)
        }
        other => (other, false),
    }
}

/// Returns `true` if `value` is a secret-wrapped wire map.
#[must_use]
pub fn is_secret(value: &Value) -> bool {
    match value {
        Value::Object(map) => matches!(Signature::of_map(map), Some(Ok(Signature::Secret))),
        _ => false,
    }
}

/// Builds the wire form of a resource reference.
///
/// Component resources have no instance id and pass `None`.
#[must_use]
pub fn resource_reference(urn: Value, id: Option<Value>) -> Value {
    let mut map = Signature::Resource.tagged_map();
    map.insert("urn".to_owned(), urn);
    if let Some(id) = id {
        map.insert("id".to_owned(), id);
    }
    Value::Object(map)
}
