//! Configuration types and loading.
//!
//! Config is loaded from an optional JSON file (e.g. `~/.line-relay/config.json`) and
//! the environment. Environment variables win over the file so the relay can run from
//! env alone, which is how it is usually deployed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CHANNEL_SECRET: &str = "LINE_BOT_CHANNEL_SECRET";
pub const ENV_CHANNEL_ACCESS_TOKEN: &str = "LINE_BOT_CHANNEL_ACCESS_TOKEN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_API_BASE: &str = "LINE_API_BASE";
pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,
}

/// Bind address, port and request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 8080). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the LINE platform has to reach /callback).
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Upper bound on request bodies read by /push_message and /callback.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// LINE channel credentials and API endpoint.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel secret, used to verify webhook signatures. Overridden by LINE_BOT_CHANNEL_SECRET.
    pub channel_secret: Option<String>,

    /// Long-lived channel access token. Overridden by LINE_BOT_CHANNEL_ACCESS_TOKEN.
    pub channel_access_token: Option<String>,

    /// Messaging API base URL. Overridden by LINE_API_BASE (tests point this at a mock).
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Alt text shown in notifications and chat lists for pushed flex messages.
    #[serde(default = "default_flex_alt_text")]
    pub flex_alt_text: String,
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_flex_alt_text() -> String {
    "notify from Taskflow".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: None,
            channel_access_token: None,
            api_base: default_api_base(),
            flex_alt_text: default_flex_alt_text(),
        }
    }
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_secret", &redacted(&self.channel_secret))
            .field("channel_access_token", &redacted(&self.channel_access_token))
            .field("api_base", &self.api_base)
            .field("flex_alt_text", &self.flex_alt_text)
            .finish()
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

/// Channel secret and access token, both known to be non-empty.
#[derive(Clone)]
pub struct LineCredentials {
    pub channel_secret: String,
    pub channel_access_token: String,
}

impl std::fmt::Debug for LineCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineCredentials")
            .field("channel_secret", &"<redacted>")
            .field("channel_access_token", &"<redacted>")
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the channel credentials. Both must be present; startup fails otherwise.
pub fn resolve_credentials(config: &Config) -> Result<LineCredentials> {
    let channel_secret = non_empty(config.line.channel_secret.as_deref()).with_context(|| {
        format!(
            "LINE channel secret not configured (set {} or line.channelSecret)",
            ENV_CHANNEL_SECRET
        )
    })?;
    let channel_access_token = non_empty(config.line.channel_access_token.as_deref())
        .with_context(|| {
            format!(
                "LINE channel access token not configured (set {} or line.channelAccessToken)",
                ENV_CHANNEL_ACCESS_TOKEN
            )
        })?;
    Ok(LineCredentials {
        channel_secret,
        channel_access_token,
    })
}

/// Apply environment overrides on top of file config. Blank values are ignored.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides read through `lookup` (the environment, in production).
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| non_empty(lookup(key).as_deref());
    if let Some(secret) = get(ENV_CHANNEL_SECRET) {
        config.line.channel_secret = Some(secret);
    }
    if let Some(token) = get(ENV_CHANNEL_ACCESS_TOKEN) {
        config.line.channel_access_token = Some(token);
    }
    if let Some(base) = get(ENV_API_BASE) {
        config.line.api_base = base;
    }
    if let Some(port) = get(ENV_PORT) {
        config.server.port = port
            .parse()
            .with_context(|| format!("parsing {}={:?} as a port", ENV_PORT, port))?;
    }
    Ok(())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH).map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".line-relay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path (or the default). Missing file => default config.
/// Environment overrides are applied afterwards. Returns the config and the path used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    apply_env_overrides(&mut config)?;
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_and_line_settings() {
        let c = Config::default();
        assert_eq!(c.server.port, 8080);
        assert_eq!(c.server.bind, "0.0.0.0");
        assert_eq!(c.line.api_base, "https://api.line.me");
        assert_eq!(c.line.flex_alt_text, "notify from Taskflow");
    }

    #[test]
    fn parses_camel_case_file_with_partial_sections() {
        let c: Config = serde_json::from_str(
            r#"{"server":{"port":9000},"line":{"channelSecret":"s","channelAccessToken":"t"}}"#,
        )
        .unwrap();
        assert_eq!(c.server.port, 9000);
        assert_eq!(c.server.bind, "0.0.0.0");
        assert_eq!(c.line.channel_secret.as_deref(), Some("s"));
        assert_eq!(c.line.api_base, "https://api.line.me");
    }

    #[test]
    fn resolve_credentials_requires_both() {
        let mut c = Config::default();
        c.line.channel_secret = Some("secret".to_string());
        let err = resolve_credentials(&c).unwrap_err();
        assert!(err.to_string().contains(ENV_CHANNEL_ACCESS_TOKEN));

        c.line.channel_access_token = Some("token".to_string());
        let creds = resolve_credentials(&c).unwrap();
        assert_eq!(creds.channel_secret, "secret");
        assert_eq!(creds.channel_access_token, "token");
    }

    #[test]
    fn resolve_credentials_rejects_blank_values() {
        let mut c = Config::default();
        c.line.channel_secret = Some("   ".to_string());
        c.line.channel_access_token = Some("token".to_string());
        let err = resolve_credentials(&c).unwrap_err();
        assert!(err.to_string().contains(ENV_CHANNEL_SECRET));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = LineCredentials {
            channel_secret: "abc".to_string(),
            channel_access_token: "xyz".to_string(),
        };
        let s = format!("{:?}", creds);
        assert!(!s.contains("abc"));
        assert!(!s.contains("xyz"));
    }

    #[test]
    fn load_config_missing_file_uses_defaults() {
        let path = std::env::temp_dir()
            .join(format!("line-relay-missing-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let (c, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(c.line.flex_alt_text, "notify from Taskflow");
    }

    fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn env_values_override_file_values() {
        let mut c: Config = serde_json::from_str(
            r#"{"server":{"port":9000},"line":{"channelSecret":"file-secret","channelAccessToken":"file-token"}}"#,
        )
        .unwrap();
        apply_overrides_from(
            &mut c,
            lookup_from(&[
                (ENV_CHANNEL_SECRET, "env-secret"),
                (ENV_CHANNEL_ACCESS_TOKEN, "env-token"),
                (ENV_PORT, "3000"),
                (ENV_API_BASE, "http://127.0.0.1:9999"),
            ]),
        )
        .unwrap();
        assert_eq!(c.line.channel_secret.as_deref(), Some("env-secret"));
        assert_eq!(c.line.channel_access_token.as_deref(), Some("env-token"));
        assert_eq!(c.server.port, 3000);
        assert_eq!(c.line.api_base, "http://127.0.0.1:9999");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut c: Config = serde_json::from_str(
            r#"{"server":{"port":9000},"line":{"channelSecret":"file-secret"}}"#,
        )
        .unwrap();
        apply_overrides_from(
            &mut c,
            lookup_from(&[
                (ENV_CHANNEL_SECRET, "   "),
                (ENV_PORT, ""),
                (ENV_API_BASE, "\t"),
            ]),
        )
        .unwrap();
        assert_eq!(c.line.channel_secret.as_deref(), Some("file-secret"));
        assert_eq!(c.server.port, 9000);
        assert_eq!(c.line.api_base, "https://api.line.me");
    }

    #[test]
    fn non_numeric_port_is_a_config_error() {
        let mut c = Config::default();
        let err = apply_overrides_from(&mut c, lookup_from(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
        assert_eq!(c.server.port, 8080);
    }

    #[test]
    fn line_config_debug_is_redacted() {
        let mut c = Config::default();
        c.line.channel_secret = Some("abc-secret".to_string());
        c.line.channel_access_token = Some("xyz-token".to_string());
        let s = format!("{:?}", c);
        assert!(!s.contains("abc-secret"));
        assert!(!s.contains("xyz-token"));
        assert!(s.contains("<redacted>"));
        assert!(s.contains("https://api.line.me"));
    }
}
