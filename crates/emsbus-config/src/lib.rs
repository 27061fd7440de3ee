//! Shared configuration for emsbus.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `emsbus_core::DashboardConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use emsbus_core::{DashboardConfig, TlsVerification};

const KEYRING_SERVICE: &str = "emsbus";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, then `default_profile`,
    /// then `"default"`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Refresh period in seconds while watching.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    emsbus_core::DEFAULT_TIMEOUT.as_secs()
}
fn default_poll_interval() -> u64 {
    emsbus_core::DEFAULT_POLL_INTERVAL.as_secs()
}

/// A named gateway profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway base URL (e.g., "http://ems-esp.local").
    pub gateway: String,

    /// Access token in plaintext. Prefer keyring or `token_env`.
    pub token: Option<String>,

    /// Environment variable name containing the access token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override refresh period.
    pub poll_interval: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "emsbus").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("emsbus");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment.
///
/// Environment keys nest on `__`, e.g. `EMSBUS_DEFAULTS__POLL_INTERVAL=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("EMSBUS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution (without CLI flags) ────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Resolve the access token from the credential chain (no CLI flag step).
///
/// `None` means anonymous access: status reads still work, scans will be
/// refused.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Some(SecretString::from(token.clone()));
    }

    debug!(profile = profile_name, "no token configured, using anonymous access");
    None
}

/// Store a profile's token in the OS keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse a gateway address. A bare host gets `http://`, which is what
/// gateways on a home network usually speak.
pub fn parse_gateway_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&candidate).map_err(|e| ConfigError::Validation {
        field: "gateway".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "gateway".into(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Build a `DashboardConfig` from a profile, without CLI flag overrides.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let url = parse_gateway_url(&profile.gateway)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(DashboardConfig {
        url,
        access_token: resolve_token(profile, profile_name),
        tls,
        timeout: positive_secs("timeout", profile.timeout.unwrap_or(defaults.timeout))?,
        poll_interval: positive_secs(
            "poll_interval",
            profile.poll_interval.unwrap_or(defaults.poll_interval),
        )?,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("write config");
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.poll_interval, 30);
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profiles_parse_from_toml() {
        let (_dir, path) = write_config(
            r#"
default_profile = "home"

[defaults]
poll_interval = 15

[profiles.home]
gateway = "http://ems-esp.local"
token = "abc"
timeout = 5
"#,
        );
        let cfg = load_config_from(&path).expect("load");
        assert_eq!(cfg.profile_name(None), "home");
        assert_eq!(cfg.profile_name(Some("other")), "other");
        assert_eq!(cfg.defaults.poll_interval, 15);

        let home = cfg.profile("home").expect("profile");
        assert_eq!(home.gateway, "http://ems-esp.local");
        assert_eq!(home.timeout, Some(5));
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                gateway: "http://10.0.0.5".into(),
                poll_interval: Some(60),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        let profile = loaded.profile("default").expect("profile");
        assert_eq!(profile.gateway, "http://10.0.0.5");
        assert_eq!(profile.poll_interval, Some(60));
    }

    #[test]
    fn bare_host_defaults_to_http() {
        let url = parse_gateway_url("ems-esp.local").expect("url");
        assert_eq!(url.as_str(), "http://ems-esp.local/");
        assert!(parse_gateway_url("ftp://ems-esp.local").is_err());
    }

    #[test]
    fn profile_translation_applies_overrides() {
        let profile = Profile {
            gateway: "https://ems-esp.local".into(),
            ca_cert: Some(PathBuf::from("/etc/ems/ca.pem")),
            poll_interval: Some(10),
            ..Profile::default()
        };
        let cfg = profile_to_dashboard_config(&profile, "test-no-keyring", &Defaults::default())
            .expect("config");
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ems/ca.pem"))
        );
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let profile = Profile {
            gateway: "http://ems-esp.local".into(),
            poll_interval: Some(0),
            ..Profile::default()
        };
        let err = profile_to_dashboard_config(&profile, "test-no-keyring", &Defaults::default())
            .expect_err("zero interval");
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn token_env_takes_precedence_over_plaintext() {
        let Ok(expected) = std::env::var("PATH") else {
            return;
        };
        let profile = Profile {
            gateway: "http://ems-esp.local".into(),
            token: Some("from-file".into()),
            token_env: Some("PATH".into()),
            ..Profile::default()
        };
        let token = resolve_token(&profile, "test-no-keyring").expect("token");
        assert_eq!(token.expose_secret(), expected);
    }

    #[test]
    fn plaintext_token_used_when_env_unset() {
        let profile = Profile {
            gateway: "http://ems-esp.local".into(),
            token: Some("from-file".into()),
            token_env: Some("EMSBUS_TEST_TOKEN_UNSET".into()),
            ..Profile::default()
        };
        let token = resolve_token(&profile, "test-no-keyring").expect("token");
        assert_eq!(token.expose_secret(), "from-file");
    }
}
