//! Execution mode and engine capabilities.
//!
//! A [`RunContext`] is passed explicitly to every operation whose behavior
//! depends on how the program is being run. Nothing in Tessera reads a
//! process-wide setting.
//!
//! # Example
//!
//! ```
//! use tessera_core::context::{FeatureSupport, RunContext};
//!
//! let ctx = RunContext::preview().with_features(FeatureSupport {
//!     secrets: true,
//!     resource_references: true,
//!     output_values: false,
//! });
//!
//! assert!(ctx.is_preview());
//! assert!(ctx.features().secrets);
//! ```

use crate::error::ConfigError;

/// Environment variable selecting preview (dry-run) mode.
pub const DRY_RUN_ENV: &str = "TESSERA_DRY_RUN";

/// Environment variable declaring secret wire support.
pub const SUPPORTS_SECRETS_ENV: &str = "TESSERA_SUPPORTS_SECRETS";

/// Environment variable declaring resource-reference wire support.
pub const SUPPORTS_RESOURCE_REFERENCES_ENV: &str = "TESSERA_SUPPORTS_RESOURCE_REFERENCES";

/// Environment variable declaring output-value wire support.
pub const SUPPORTS_OUTPUT_VALUES_ENV: &str = "TESSERA_SUPPORTS_OUTPUT_VALUES";

/// Wire forms the engine on the other side of the transport understands.
///
/// Every capability defaults to `false`; the encoder then falls back to the
/// plain forms older engines accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSupport {
    /// Secrets may be sent wrapped in the secret marker.
    pub secrets: bool,
    /// Resources may be sent as `{urn, id}` references instead of bare ids.
    pub resource_references: bool,
    /// Deferred values may be sent as first-class output values.
    pub output_values: bool,
}

impl FeatureSupport {
    /// Returns a set with every capability enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            secrets: true,
            resource_references: true,
            output_values: true,
        }
    }
}

/// Execution mode plus engine capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunContext {
    preview: bool,
    features: FeatureSupport,
}

impl RunContext {
    /// Context for a preview, where unresolved resources yield unknowns.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            preview: true,
            features: FeatureSupport::default(),
        }
    }

    /// Context for an update, where every value eventually resolves.
    #[must_use]
    pub fn update() -> Self {
        Self::default()
    }

    /// Sets the preview flag.
    #[must_use]
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Sets the engine capabilities.
    #[must_use]
    pub fn with_features(mut self, features: FeatureSupport) -> Self {
        self.features = features;
        self
    }

    /// Returns `true` during a preview.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// Returns the engine capabilities.
    #[must_use]
    pub fn features(&self) -> FeatureSupport {
        self.features
    }

    /// Builds a context from the `TESSERA_*` environment variables.
    ///
    /// Unset variables leave the corresponding flag `false`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBool`] if a variable is set to something
    /// other than `true`/`false`/`1`/`0`/`yes`/`no`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a context from an arbitrary variable lookup.
    ///
    /// This is what [`from_env`](Self::from_env) uses; it exists so callers
    /// can feed configuration from somewhere other than the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBool`] on unparseable flags.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let flag = |name: &'static str| -> Result<bool, ConfigError> {
            match lookup(name) {
                None => Ok(false),
                Some(raw) => parse_bool(name, &raw),
            }
        };

        let ctx = Self {
            preview: flag(DRY_RUN_ENV)?,
            features: FeatureSupport {
                secrets: flag(SUPPORTS_SECRETS_ENV)?,
                resource_references: flag(SUPPORTS_RESOURCE_REFERENCES_ENV)?,
                output_values: flag(SUPPORTS_OUTPUT_VALUES_ENV)?,
            },
        };
        tracing::debug!(preview = ctx.preview, features = ?ctx.features, "loaded run context");
        Ok(ctx)
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: raw.to_owned(),
        }),
    }
}
