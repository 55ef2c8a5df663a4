//! Configuration layer for reachwatch.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`], [`WebhookConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments**
//! 2. **TOML config file**
//! 3. **Built-in defaults**
//!
//! The webhook is optional. Without a URL, transitions are only logged;
//! passing webhook options (`--method`, `--header`, ...) without a URL is
//! an error.
//!
//! # Boolean Flag Semantics
//!
//! Boolean flags (`--unmetered-cellular`, `--require-gateway`) use OR semantics:
//! - If enabled in either CLI or TOML, the result is enabled.
//! - Flags only enable; the CLI cannot undo a setting made in TOML.
//!
//! # TOML-Only Options
//!
//! - `retry.max_delay` (default: 30s)
//! - `retry.multiplier` (default: 2.0)

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command, OutputArgs};
pub use error::ConfigError;
pub use self::toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, WebhookConfig, write_default_config};
