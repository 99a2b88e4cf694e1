//! # mptt-urls-core
//!
//! Core types shared by every mptt-urls crate: the error hierarchy, the
//! application settings (including the `node` / `leaf` routing settings),
//! settings loading from TOML/JSON/environment, and tracing setup.
//!
//! ## Modules
//!
//! - [`error`] - Configuration errors and the crate-family error type
//! - [`settings`] - Application settings and the routing settings tables
//! - [`settings_loader`] - Loading settings from files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{ConfigError, MpttError, MpttResult};
pub use settings::{LevelSettings, MpttUrlsSettings, Role, Settings};
