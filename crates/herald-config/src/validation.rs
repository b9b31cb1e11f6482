// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as parseable cron expressions, unique bundle names, and sane timing values.

use std::collections::HashSet;
use std::str::FromStr;

use croner::Cron;

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate log level is a known tracing level
    let level = config.gateway.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "gateway.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.gateway.log_level
            ),
        });
    }

    // Validate bridge URL shape
    let base_url = config.bridge.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "bridge.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("bridge.base_url must start with http:// or https://, got `{base_url}`"),
        });
    }

    // The request timeout bounds the long poll; equal or smaller would
    // abort every poll before the bridge answers.
    if config.bridge.request_timeout_secs <= config.bridge.poll_timeout_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "bridge.request_timeout_secs ({}) must exceed bridge.poll_timeout_secs ({})",
                config.bridge.request_timeout_secs, config.bridge.poll_timeout_secs
            ),
        });
    }

    // Validate data_dir is not empty
    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    // Validate delivery policy has at least one attempt
    if config.delivery.retry_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.retry_attempts must be at least 1".to_string(),
        });
    }

    // Validate responder texts and windows
    if config.responder.greeting.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "responder.greeting must not be empty".to_string(),
        });
    }

    if config.responder.greeting_cooldown_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "responder.greeting_cooldown_hours must be at least 1".to_string(),
        });
    }

    if config.responder.command_prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "responder.command_prefix must not be empty".to_string(),
        });
    }

    if config.responder.dedup_window_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "responder.dedup_window_secs must be at least 1".to_string(),
        });
    }

    if config.responder.menu_keywords.is_empty() {
        errors.push(ConfigError::Validation {
            message: "responder.menu_keywords must contain at least one keyword".to_string(),
        });
    }

    // Validate no duplicate bundle names
    let mut seen_names = HashSet::new();
    for bundle in &config.responder.bundles {
        if !seen_names.insert(&bundle.name) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate bundle name `{}` in [[responder.bundles]] array",
                    bundle.name
                ),
            });
        }
    }

    // Validate bundle names and file lists are non-empty
    for (i, bundle) in config.responder.bundles.iter().enumerate() {
        if bundle.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("responder.bundles[{i}].name must not be empty"),
            });
        }
        if bundle.files.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "responder.bundles[{i}] (`{}`) must list at least one file",
                    bundle.name
                ),
            });
        }
    }

    // Validate the sweep schedule parses as a cron expression
    if let Err(e) = Cron::from_str(&config.sweep.schedule) {
        errors.push(ConfigError::Validation {
            message: format!(
                "sweep.schedule `{}` is not a valid cron expression: {e}",
                config.sweep.schedule
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
