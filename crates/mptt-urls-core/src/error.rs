//! Core error types for mptt-urls.
//!
//! Two layers exist. [`ConfigError`] categorizes everything that can be wrong
//! with the `node` / `leaf` routing settings; these are deployment mistakes and
//! are never retried. [`MpttError`] is the crate-family error that wraps
//! configuration errors alongside store, template, and I/O failures.
//!
//! A path that does not match any tree entity is *not* an error: the resolver
//! answers it with a 404 response.

use thiserror::Error;

use crate::settings::Role;

/// A problem with the routing settings, detected before any database access.
///
/// The display text of each variant is stable: callers and tests match on its
/// prefix (`'node' settings cannot`, `"template" or "view"`, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `node` or `leaf` table is absent or empty.
    #[error("'{role}' settings cannot be empty")]
    MissingRoleConfig {
        /// The role whose table is missing.
        role: Role,
    },

    /// A level table has no `model` value.
    #[error("'{role}' settings require a \"model\" value")]
    MissingModel {
        /// The role whose model is missing.
        role: Role,
    },

    /// Both `template` and `view` were given for one level.
    #[error("\"template\" and \"view\" values cannot be used simultaneously ('{role}' settings)")]
    RedundantRenderSpec {
        /// The role carrying both values.
        role: Role,
    },

    /// A level that has to render carries neither `template` nor `view`.
    #[error("\"template\" or \"view\" value is required ('{role}' settings)")]
    MissingRenderSpec {
        /// The role that cannot render.
        role: Role,
    },

    /// A `model` value does not name a registered model.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// A `view` value does not name a registered view.
    #[error("unknown view '{0}'")]
    UnknownView(String),

    /// A model was registered with a table name that is not a plain SQL identifier.
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),
}

impl ConfigError {
    /// Returns the role this error is attached to, if any.
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::MissingRoleConfig { role }
            | Self::MissingModel { role }
            | Self::RedundantRenderSpec { role }
            | Self::MissingRenderSpec { role } => Some(*role),
            Self::UnknownModel(_) | Self::UnknownView(_) | Self::InvalidTableName(_) => None,
        }
    }
}

/// The primary error type for mptt-urls.
///
/// Each variant maps to an HTTP status code via [`MpttError::status_code`].
#[derive(Error, Debug)]
pub enum MpttError {
    // ── Configuration ────────────────────────────────────────────────

    /// The routing settings are invalid.
    #[error(transparent)]
    ImproperlyConfigured(#[from] ConfigError),

    /// A settings file or environment value could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Store ────────────────────────────────────────────────────────

    /// A query against the tree store failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The tree store could not be opened or prepared.
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Templates ────────────────────────────────────────────────────

    /// The requested template is not registered with the engine.
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    /// A template failed to parse or render.
    #[error("Template error: {0}")]
    TemplateError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An entity could not be serialized into a template context.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MpttError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// Every variant is a server-side failure; unmatched paths never reach
    /// this type.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ImproperlyConfigured(_)
            | Self::ConfigurationError(_)
            | Self::DatabaseError(_)
            | Self::OperationalError(_)
            | Self::TemplateDoesNotExist(_)
            | Self::TemplateError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns the wrapped configuration error, if this is one.
    pub const fn as_config_error(&self) -> Option<&ConfigError> {
        match self {
            Self::ImproperlyConfigured(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MpttError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, MpttError>`.
pub type MpttResult<T> = Result<T, MpttError>;
