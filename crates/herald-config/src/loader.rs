// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./herald.toml` > `~/.config/herald/herald.toml` > `/etc/herald/herald.toml`
//! with environment variable overrides via `HERALD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HeraldConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/herald/herald.toml` (system-wide)
/// 3. `~/.config/herald/herald.toml` (user XDG config)
/// 4. `./herald.toml` (local directory)
/// 5. `HERALD_*` environment variables
pub fn load_config() -> Result<HeraldConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file("/etc/herald/herald.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("herald/herald.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("herald.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<HeraldConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HeraldConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HERALD_BRIDGE_BASE_URL` must map to
/// `bridge.base_url`, not `bridge.base.url`.
fn env_provider() -> Env {
    // `key` is the lowercased env var name with prefix stripped.
    // Example: HERALD_RESPONDER_COMMAND_PREFIX -> "responder_command_prefix"
    Env::prefixed("HERALD_").map(|key| map_env_key(key.as_str()).into())
}

/// Rewrite a prefix-stripped env key into its dotted config path.
fn map_env_key(key: &str) -> String {
    key.replacen("gateway_", "gateway.", 1)
        .replacen("bridge_", "bridge.", 1)
        .replacen("storage_", "storage.", 1)
        .replacen("broadcast_", "broadcast.", 1)
        .replacen("delivery_", "delivery.", 1)
        .replacen("responder_", "responder.", 1)
        .replacen("sweep_", "sweep.", 1)
        .replacen("contacts_", "contacts.", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_sources() {
        let config = load_config_from_str("").expect("empty config should load");
        assert_eq!(config.gateway.name, "herald");
        assert_eq!(config.broadcast.pace_ms, 1500);
        assert_eq!(config.delivery.retry_attempts, 2);
        assert_eq!(config.responder.greeting_cooldown_hours, 8);
        assert_eq!(config.sweep.schedule, "0 9 * * *");
        assert!(config.contacts.csv_path.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[broadcast]
pace_ms = 250

[responder]
admins = ["4470001110000@c.us"]
"#,
        )
        .expect("config should load");
        assert_eq!(config.broadcast.pace_ms, 250);
        assert_eq!(config.responder.admins, vec!["4470001110000@c.us"]);
        // Untouched sections keep their defaults.
        assert_eq!(config.broadcast.pause_poll_ms, 500);
    }

    #[test]
    fn bundles_array_deserializes() {
        let config = load_config_from_str(
            r#"
[[responder.bundles]]
name = "Catalog"
announcement = "Sending the catalog..."
files = ["catalog.pdf", "prices.pdf"]

[[responder.bundles]]
name = "Wholesale"
files = ["wholesale.pdf"]
"#,
        )
        .expect("config should load");
        assert_eq!(config.responder.bundles.len(), 2);
        assert_eq!(config.responder.bundles[0].name, "Catalog");
        assert_eq!(config.responder.bundles[0].files.len(), 2);
        // announcement defaults to empty when omitted.
        assert_eq!(config.responder.bundles[1].announcement, "");
    }

    #[test]
    fn env_keys_map_to_dotted_paths() {
        assert_eq!(map_env_key("bridge_base_url"), "bridge.base_url");
        assert_eq!(
            map_env_key("responder_command_prefix"),
            "responder.command_prefix"
        );
        assert_eq!(map_env_key("sweep_schedule"), "sweep.schedule");
        // Only the leading section name is rewritten.
        assert_eq!(
            map_env_key("broadcast_pause_poll_ms"),
            "broadcast.pause_poll_ms"
        );
    }
}
