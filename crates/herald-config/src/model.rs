// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Herald messaging gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// Gateway identity and logging settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Transport bridge daemon settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Persistence settings for the directory and greeting files.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Bulk broadcast pacing and pause behavior.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Retry and backoff policy for reliable delivery.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Automated responder behavior (greeting, menu, admin commands).
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Daily liveness sweep schedule.
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Contact list source for broadcast target resolution.
    #[serde(default)]
    pub contacts: ContactsConfig,
}

/// Gateway identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Display name of the gateway instance.
    #[serde(default = "default_gateway_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: default_gateway_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_gateway_name() -> String {
    "herald".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Transport bridge daemon configuration.
///
/// The bridge owns the real messaging session; Herald reaches it over
/// local HTTP.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Base URL of the bridge daemon.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the bridge API. `None` disables auth.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Long-poll hold time for the event feed, in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Overall HTTP request timeout, in seconds. Must exceed the poll hold.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            poll_timeout_secs: default_poll_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    65
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the recipient directory and greeting record files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("herald"))
        .unwrap_or_else(|| std::path::PathBuf::from("data"))
        .to_string_lossy()
        .into_owned()
}

/// Bulk broadcast pacing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Delay between consecutive broadcast targets, in milliseconds.
    #[serde(default = "default_broadcast_pace_ms")]
    pub pace_ms: u64,

    /// Polling increment while a broadcast is paused, in milliseconds.
    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            pace_ms: default_broadcast_pace_ms(),
            pause_poll_ms: default_pause_poll_ms(),
        }
    }
}

fn default_broadcast_pace_ms() -> u64 {
    1500
}

fn default_pause_poll_ms() -> u64 {
    500
}

/// Retry and backoff policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Total delivery attempts per recipient before giving up.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Wait between failed attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    2000
}

/// Automated responder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponderConfig {
    /// Greeting sent to private senders outside the cooldown window.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Hours between greetings to the same recipient.
    #[serde(default = "default_greeting_cooldown_hours")]
    pub greeting_cooldown_hours: u64,

    /// Keywords that open the menu (matched trimmed, case-insensitive).
    #[serde(default = "default_menu_keywords")]
    pub menu_keywords: Vec<String>,

    /// Recipient ids allowed to issue the broadcast command.
    #[serde(default)]
    pub admins: Vec<String>,

    /// Prefix of the in-chat admin broadcast command.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Retention window for inbound event deduplication, in seconds.
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,

    /// Delay between sends within responder-driven loops, in milliseconds.
    #[serde(default = "default_responder_pace_ms")]
    pub pace_ms: u64,

    /// Line shown above the numbered main-menu choices.
    #[serde(default = "default_menu_header")]
    pub menu_header: String,

    /// Label of the main-menu choice that opens the products sub-menu.
    #[serde(default = "default_products_label")]
    pub products_label: String,

    /// Line shown above the numbered product choices.
    #[serde(default = "default_products_header")]
    pub products_header: String,

    /// Label of the product choice that returns to the main menu.
    #[serde(default = "default_back_label")]
    pub back_label: String,

    /// Canned main-menu replies, in choice order after the products entry.
    #[serde(default = "default_replies")]
    pub replies: Vec<MenuReplyConfig>,

    /// Document bundles offered in the products sub-menu.
    #[serde(default)]
    pub bundles: Vec<BundleConfig>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            greeting_cooldown_hours: default_greeting_cooldown_hours(),
            menu_keywords: default_menu_keywords(),
            admins: Vec::new(),
            command_prefix: default_command_prefix(),
            dedup_window_secs: default_dedup_window_secs(),
            pace_ms: default_responder_pace_ms(),
            menu_header: default_menu_header(),
            products_label: default_products_label(),
            products_header: default_products_header(),
            back_label: default_back_label(),
            replies: default_replies(),
            bundles: Vec::new(),
        }
    }
}

fn default_greeting() -> String {
    "Hello! Thanks for getting in touch. Send \"menu\" any time to see what I can help with."
        .to_string()
}

fn default_greeting_cooldown_hours() -> u64 {
    8
}

fn default_menu_keywords() -> Vec<String> {
    vec!["hi".to_string(), "hello".to_string(), "menu".to_string()]
}

fn default_command_prefix() -> String {
    "/broadcast".to_string()
}

fn default_dedup_window_secs() -> u64 {
    300
}

fn default_responder_pace_ms() -> u64 {
    1500
}

fn default_menu_header() -> String {
    "How can we help? Reply with a number:".to_string()
}

fn default_products_label() -> String {
    "Our products".to_string()
}

fn default_products_header() -> String {
    "Which catalog would you like? Reply with a number:".to_string()
}

fn default_back_label() -> String {
    "Back to the main menu".to_string()
}

fn default_replies() -> Vec<MenuReplyConfig> {
    vec![
        MenuReplyConfig {
            label: "Opening hours".to_string(),
            text: "We are available Monday to Saturday, 09:00 to 18:00.".to_string(),
        },
        MenuReplyConfig {
            label: "Talk to a person".to_string(),
            text: "Thanks! A member of our team will reply here as soon as possible.".to_string(),
        },
    ]
}

/// One canned main-menu reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MenuReplyConfig {
    /// Label shown in the menu listing.
    pub label: String,

    /// Text sent when the choice is picked.
    pub text: String,
}

/// One document bundle offered in the products sub-menu.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Bundle name, shown as the menu choice label. Must be unique.
    pub name: String,

    /// Text sent before the documents.
    #[serde(default)]
    pub announcement: String,

    /// Paths of the documents to send, in order.
    pub files: Vec<String>,
}

/// Daily liveness sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Enable the scheduled sweep. When false, sweeps run only on demand.
    #[serde(default = "default_sweep_enabled")]
    pub enabled: bool,

    /// Cron expression for sweep times (five fields, evaluated in UTC).
    #[serde(default = "default_sweep_schedule")]
    pub schedule: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: default_sweep_enabled(),
            schedule: default_sweep_schedule(),
        }
    }
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_sweep_schedule() -> String {
    "0 9 * * *".to_string()
}

/// Contact list source configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContactsConfig {
    /// Path to a CSV file with `id,category` columns. `None` resolves
    /// every filter to an empty list.
    #[serde(default)]
    pub csv_path: Option<String>,
}
