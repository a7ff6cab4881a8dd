//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use stcheck_core::models::StcheckConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a configuration value
    Get {
        /// Dotted key (e.g., "extraction.timeout_ms")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Dotted key
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },

    /// Show the configuration file path
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            let config = load_or_default(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { force } => init_config(&path, force)?,
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(load_or_default(&path)?)?;
            let value = json
                .pointer(&json_pointer(&key))
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value)?,
        ConfigCommand::Path => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!(
                    "{} not created yet, run 'stcheck config init'",
                    style("ℹ").blue()
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// `~/.config/stcheck/config.json` or the platform equivalent.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stcheck")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<StcheckConfig> {
    if path.exists() {
        Ok(StcheckConfig::from_file(path)?)
    } else {
        Ok(StcheckConfig::default())
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    StcheckConfig::default().save(path)?;
    println!("{} Created {}", style("✓").green(), path.display());
    Ok(())
}

fn set_config(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let value: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = serde_json::to_value(load_or_default(path)?)?;
    let slot = json
        .pointer_mut(&json_pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value.clone();

    // Round-trip through the typed config so bad values are rejected.
    let config: StcheckConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}

fn json_pointer(key: &str) -> String {
    key.split('.').fold(String::new(), |mut acc, part| {
        acc.push('/');
        acc.push_str(part);
        acc
    })
}
