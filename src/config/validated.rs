//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use handlebars::Handlebars;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use url::Url;

use crate::network::platform::PlatformOptions;
use crate::webhook::RetryPolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Transition webhook; `None` when no URL is configured.
    pub webhook: Option<WebhookConfig>,

    /// Snapshot derivation options
    pub platform: PlatformOptions,

    /// Dry-run mode (log transitions without sending webhooks)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

/// Validated webhook settings.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Target URL
    pub url: Url,

    /// HTTP method
    pub method: Method,

    /// Headers sent with every request
    pub headers: HeaderMap,

    /// Handlebars body template (optional)
    pub body_template: Option<String>,

    /// Retry policy for failed deliveries
    pub retry_policy: RetryPolicy,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config {{ webhook: ")?;
        match &self.webhook {
            Some(webhook) => write!(
                f,
                "{} {} (retry: {}x/{}s, template: {})",
                webhook.method,
                webhook.url,
                webhook.retry_policy.max_attempts,
                webhook.retry_policy.initial_delay.as_secs(),
                webhook.body_template.is_some(),
            )?,
            None => write!(f, "none")?,
        }
        write!(
            f,
            ", cellular_metered: {}, require_gateway: {}, dry_run: {} }}",
            self.platform.cellular_metered, self.platform.require_gateway, self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Webhook options are given without a URL
    /// - URL, method, header or template are invalid
    /// - Retry values are out of range
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let webhook = Self::resolve_webhook(cli, toml)?;
        let platform = Self::resolve_platform(cli, toml);

        Ok(Self {
            webhook,
            platform,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_webhook(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<WebhookConfig>, ConfigError> {
        let url_str = cli
            .url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.webhook.url.as_deref()));

        let Some(url_str) = url_str else {
            if has_webhook_options(cli) {
                return Err(ConfigError::missing(
                    field::URL,
                    "Webhook options need --url or webhook.url in the config file",
                ));
            }
            return Ok(None);
        };

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(Some(WebhookConfig {
            url,
            method: Self::resolve_method(cli, toml)?,
            headers: Self::resolve_headers(cli, toml)?,
            body_template: Self::resolve_body_template(cli, toml)?,
            retry_policy: Self::build_retry_policy(cli, toml)?,
        }))
    }

    fn resolve_method(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Method, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let method_str = cli
            .method
            .as_deref()
            .or_else(|| toml.and_then(|t| t.webhook.method.as_deref()))
            .unwrap_or(defaults::METHOD);

        method_str
            .parse::<Method>()
            .map_err(|_| ConfigError::InvalidMethod(method_str.to_string()))
    }

    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        // TOML first so CLI overrides
        if let Some(toml) = toml {
            for (name, value) in &toml.webhook.headers {
                headers.insert(parse_header_name(name)?, parse_header_value(name, value)?);
            }
        }

        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            headers.insert(parse_header_name(&name)?, parse_header_value(&name, &value)?);
        }

        let bearer = cli
            .bearer
            .as_deref()
            .or_else(|| toml.and_then(|t| t.webhook.bearer.as_deref()));

        if let Some(token) = bearer {
            let mut value = parse_header_value("Authorization", &format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn resolve_body_template(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<String>, ConfigError> {
        let template = cli
            .body_template
            .clone()
            .or_else(|| toml.and_then(|t| t.webhook.body_template.clone()));

        if let Some(ref tmpl) = template {
            validate_template(tmpl)?;
        }

        Ok(template)
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_attempts = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_attempts))
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

        let initial_delay_secs = cli
            .retry_delay
            .or_else(|| retry.and_then(|r| r.initial_delay))
            .unwrap_or(defaults::RETRY_INITIAL_DELAY_SECS);

        let max_delay_secs = retry
            .and_then(|r| r.max_delay)
            .unwrap_or(defaults::RETRY_MAX_DELAY_SECS);

        let multiplier = retry
            .and_then(|r| r.multiplier)
            .unwrap_or(defaults::RETRY_MULTIPLIER);

        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if initial_delay_secs == 0 {
            return Err(ConfigError::InvalidRetry(
                "initial_delay must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if max_delay_secs < initial_delay_secs {
            return Err(ConfigError::InvalidRetry(format!(
                "max_delay ({max_delay_secs}s) must be >= initial_delay ({initial_delay_secs}s)"
            )));
        }

        Ok(RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_initial_delay(Duration::from_secs(initial_delay_secs))
            .with_max_delay(Duration::from_secs(max_delay_secs))
            .with_multiplier(multiplier))
    }

    // Boolean options only enable: a flag set in either source wins.
    fn resolve_platform(cli: &Cli, toml: Option<&TomlConfig>) -> PlatformOptions {
        let platform = toml.map(|t| &t.platform);
        let mut options = PlatformOptions::default();

        if cli.unmetered_cellular || platform.and_then(|p| p.cellular_metered) == Some(false) {
            options.cellular_metered = false;
        }
        if cli.require_gateway || platform.is_some_and(|p| p.require_gateway) {
            options.require_gateway = true;
        }

        options
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn has_webhook_options(cli: &Cli) -> bool {
    cli.method.is_some()
        || !cli.headers.is_empty()
        || cli.bearer.is_some()
        || cli.body_template.is_some()
        || cli.retry_max.is_some()
        || cli.retry_delay.is_some()
}

/// Renders against a sample transition in strict mode.
fn validate_template(template: &str) -> Result<(), ConfigError> {
    let mut hbs = Handlebars::new();
    hbs.set_strict_mode(true);
    let sample = serde_json::json!({
        "from": "offline",
        "to": "wifi_like",
        "connected": true,
        "metered": false,
        "timestamp": 0,
    });
    hbs.render_template(template, &sample)
        .map(drop)
        .map_err(|e| ConfigError::InvalidTemplate {
            reason: e.to_string(),
        })
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // "Key=Value" first, then "Key: Value"
    s.split_once('=')
        .or_else(|| s.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| ConfigError::InvalidHeader {
            value: s.to_string(),
        })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
