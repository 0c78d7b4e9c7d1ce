//! Structural decoder.
//!
//! [`PropertyDecoder`] turns wire values received from the engine back
//! into plain values. Special forms are resolved to what a program should
//! see: resource references become ids (or urns), output values become
//! their payload, and secrecy anywhere inside a container is pushed up to
//! a single marker around that container.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tessera_core::RunContext;
//! use tessera_core::sig::{SECRET_SIG, SIG_KEY};
//! use tessera_rpc::decode::PropertyDecoder;
//!
//! let decoder = PropertyDecoder::new(RunContext::update());
//! let wire = json!(["plain", {SIG_KEY: SECRET_SIG, "value": "hidden"}]);
//!
//! assert_eq!(
//!     decoder.decode(&wire).unwrap(),
//!     json!({SIG_KEY: SECRET_SIG, "value": ["plain", "hidden"]})
//! );
//! ```

use serde_json::{Map, Value};
use tessera_core::RunContext;
use tessera_core::asset::AssetOrArchive;
use tessera_core::sig::{Signature, wrap_secret};
use tessera_core::unknown::{UNKNOWN, unknown};

use crate::error::DecodeError;

/// Internal keys kept by default.
pub const DEFAULT_RETAINED_KEYS: &[&str] = &["__provider"];

/// Prefix of engine-internal property names.
const INTERNAL_PREFIX: &str = "__";

/// Decodes wire values into plain values.
#[derive(Debug, Clone)]
pub struct PropertyDecoder {
    ctx: RunContext,
    keep_unknowns: bool,
    keep_internal: bool,
    retained: Vec<String>,
}

impl PropertyDecoder {
    /// Creates a decoder for the given run.
    #[must_use]
    pub fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            keep_unknowns: false,
            keep_internal: false,
            retained: DEFAULT_RETAINED_KEYS.iter().map(|&k| k.to_owned()).collect(),
        }
    }

    /// Keeps the unknown sentinel outside of previews instead of nulling it.
    #[must_use]
    pub fn keep_unknowns(mut self, keep: bool) -> Self {
        self.keep_unknowns = keep;
        self
    }

    /// Keeps every `__`-prefixed key.
    #[must_use]
    pub fn keep_internal(mut self, keep: bool) -> Self {
        self.keep_internal = keep;
        self
    }

    /// Adds an internal key whose value is kept verbatim.
    #[must_use]
    pub fn retain_key(mut self, key: impl Into<String>) -> Self {
        self.retained.push(key.into());
        self
    }

    /// Decodes a single wire value.
    ///
    /// A secret anywhere inside the value makes the whole result a single
    /// secret-wrapped value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for unrecognized signatures and malformed
    /// special forms.
    pub fn decode(&self, value: &Value) -> Result<Value, DecodeError> {
        let (value, secret) = self.decode_inner(value)?;
        Ok(if secret { wrap_secret(value) } else { value })
    }

    /// Decodes a top-level property map.
    ///
    /// Each property gets its own secret wrapper as needed; the map itself
    /// is never wrapped. Internal keys are dropped and properties that
    /// decode to null are left out.
    ///
    /// # Errors
    ///
    /// Fails on the first property that fails to decode.
    pub fn decode_properties(
        &self,
        props: &Map<String, Value>,
    ) -> Result<Map<String, Value>, DecodeError> {
        let mut decoded = Map::new();
        for (key, value) in props {
            if self.is_retained(key) {
                decoded.insert(key.clone(), value.clone());
                continue;
            }
            if self.is_dropped(key) {
                tracing::debug!(key = %key, "dropping internal property");
                continue;
            }
            let value = self.decode(value)?;
            if !value.is_null() {
                decoded.insert(key.clone(), value);
            }
        }
        Ok(decoded)
    }

    fn decode_inner(&self, value: &Value) -> Result<(Value, bool), DecodeError> {
        match value {
            Value::String(s) if s == UNKNOWN => Ok((self.decode_unknown(), false)),
            Value::Array(items) => {
                let mut secret = false;
                let mut decoded = Vec::with_capacity(items.len());
                for item in items {
                    let (item, item_secret) = self.decode_inner(item)?;
                    secret |= item_secret;
                    decoded.push(item);
                }
                Ok((Value::Array(decoded), secret))
            }
            Value::Object(map) => match Signature::of_map(map) {
                None => self.decode_map(map),
                Some(Ok(sig)) => self.decode_special(sig, map, value),
                Some(Err(raw)) => Err(DecodeError::UnrecognizedSignature(raw)),
            },
            other => Ok((other.clone(), false)),
        }
    }

    fn decode_map(&self, map: &Map<String, Value>) -> Result<(Value, bool), DecodeError> {
        let mut secret = false;
        let mut decoded = Map::new();
        for (key, value) in map {
            if self.is_retained(key) {
                decoded.insert(key.clone(), value.clone());
                continue;
            }
            if self.is_dropped(key) {
                continue;
            }
            let (value, value_secret) = self.decode_inner(value)?;
            secret |= value_secret;
            if !value.is_null() {
                decoded.insert(key.clone(), value);
            }
        }
        if secret {
            tracing::trace!("pushing secret up to enclosing map");
        }
        Ok((Value::Object(decoded), secret))
    }

    fn decode_special(
        &self,
        sig: Signature,
        map: &Map<String, Value>,
        raw: &Value,
    ) -> Result<(Value, bool), DecodeError> {
        match sig {
            Signature::Secret => {
                let inner = required(map, "secret", "value")?;
                let (inner, _) = self.decode_inner(inner)?;
                Ok((inner, true))
            }
            Signature::Asset | Signature::Archive => {
                let payload = AssetOrArchive::from_value(raw)?;
                Ok((payload.to_value(), false))
            }
            Signature::Resource => {
                let urn = required(map, "resource reference", "urn")?;
                let target = match map.get("id") {
                    Some(id @ Value::String(s)) if !s.is_empty() => id,
                    None | Some(Value::Null | Value::String(_)) => urn,
                    Some(_) => {
                        return Err(DecodeError::InvalidField {
                            kind: "resource reference",
                            field: "id".to_owned(),
                        });
                    }
                };
                self.decode_inner(target)
            }
            Signature::OutputValue => {
                let flagged = match map.get("secret") {
                    None | Some(Value::Null) => false,
                    Some(Value::Bool(secret)) => *secret,
                    Some(_) => {
                        return Err(DecodeError::InvalidField {
                            kind: "output value",
                            field: "secret".to_owned(),
                        });
                    }
                };
                match map.get("value") {
                    Some(value) => {
                        let (value, secret) = self.decode_inner(value)?;
                        Ok((value, secret || flagged))
                    }
                    None => Ok((self.decode_unknown(), flagged)),
                }
            }
        }
    }

    fn decode_unknown(&self) -> Value {
        if self.keep_unknowns || self.ctx.is_preview() {
            unknown()
        } else {
            Value::Null
        }
    }

    fn is_retained(&self, key: &str) -> bool {
        self.retained.iter().any(|retained| retained == key)
    }

    fn is_dropped(&self, key: &str) -> bool {
        !self.keep_internal && key.starts_with(INTERNAL_PREFIX)
    }
}

fn required<'a>(
    map: &'a Map<String, Value>,
    kind: &'static str,
    field: &str,
) -> Result<&'a Value, DecodeError> {
    map.get(field).ok_or_else(|| DecodeError::MissingField {
        kind,
        field: field.to_owned(),
    })
}

/// Decodes `value` with a default [`PropertyDecoder`] for `ctx`.
///
/// # Errors
///
/// See [`PropertyDecoder::decode`].
pub fn decode(ctx: &RunContext, value: &Value) -> Result<Value, DecodeError> {
    PropertyDecoder::new(*ctx).decode(value)
}
