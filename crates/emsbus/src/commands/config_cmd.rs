//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the token.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval = {}", cfg.defaults.poll_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "gateway = \"{}\"", p.gateway);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"{MASK}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.poll_interval {
            let _ = writeln!(out, "poll_interval = {interval}");
        }
    }

    out.trim_end().to_owned()
}

fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
    cfg
}

/// Map a dialoguer failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Offer to store the token in the system keyring.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in
/// the keyring.
fn prompt_token_storage(token: String, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the access token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        emsbus_config::store_token(profile_name, &SecretString::from(token))?;
        eprintln!("   Token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => format_config_redacted(&cfg),
                OutputFormat::Json => serde_json::to_string_pretty(&redact(cfg))?,
                OutputFormat::JsonCompact => serde_json::to_string(&redact(cfg))?,
                OutputFormat::Yaml => serde_yaml::to_string(&redact(cfg))?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("EMS bus dashboard configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let gateway: String = Input::new()
        .with_prompt("Gateway URL")
        .default("http://ems-esp.local".into())
        .validate_with(|input: &String| {
            emsbus_config::parse_gateway_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    eprintln!("   Leave the token empty for read-only access (scans need an admin token).");
    let token = Password::new()
        .with_prompt("Access token")
        .allow_empty_password(true)
        .interact()
        .map_err(prompt_err)?;

    let token = if token.is_empty() {
        None
    } else {
        prompt_token_storage(token, &profile_name)?
    };

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            gateway,
            token,
            ..Profile::default()
        },
    );
    if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }

    let written = config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", written.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: emsbus --profile {profile_name} status");
    Ok(())
}
