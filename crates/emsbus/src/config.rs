//! CLI configuration: thin wrapper around `emsbus_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--gateway, --token, --insecure, --timeout, --interval).

use std::time::Duration;

use secrecy::SecretString;

use emsbus_core::{DashboardConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use emsbus_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Build a `DashboardConfig` from the config file, profile, and CLI flags.
///
/// Without a matching profile, `--gateway` alone is enough; an explicitly
/// requested profile that doesn't exist is an error.
pub fn resolve_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let adhoc;
    let profile = if let Some(profile) = cfg.profiles.get(&profile_name) {
        profile
    } else {
        if global.profile.is_some() {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        let gateway = global.gateway.clone().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        adhoc = Profile {
            gateway,
            ..Profile::default()
        };
        &adhoc
    };

    let mut dashboard =
        emsbus_config::profile_to_dashboard_config(profile, &profile_name, &cfg.defaults)?;
    apply_overrides(&mut dashboard, global)?;
    Ok(dashboard)
}

/// CLI flags take priority over profile values.
fn apply_overrides(config: &mut DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref gateway) = global.gateway {
        config.url = emsbus_config::parse_gateway_url(gateway)?;
    }
    if let Some(ref token) = global.token {
        config.access_token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = global.interval {
        config.poll_interval = Duration::from_secs(secs);
    }
    Ok(())
}
