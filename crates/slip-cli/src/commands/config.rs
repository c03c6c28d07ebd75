//! Config command: inspect and edit the JSON configuration file.
//!
//! Every subcommand works on the file given with the global `--config`
//! option, or on the per-user default location when it is absent.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use slip_core::models::config::SlipConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration, or a single dotted key of it
    Show {
        /// Dotted key such as "export.file_prefix"
        key: Option<String>,
    },

    /// Write a configuration file holding the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Change one dotted key and save the file
    Set {
        key: String,
        /// JSON literal, or a plain string
        value: String,
    },

    /// Print where the configuration file lives
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = target_path(config_path);

    match args.command {
        ConfigCommand::Show { key } => show(&path, key.as_deref()),
        ConfigCommand::Init { force } => init(&path, force),
        ConfigCommand::Set { key, value } => set(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slip")
        .join("config.json")
}

fn target_path(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the explicit config file, else the default one, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SlipConfig> {
    if let Some(path) = config_path {
        debug!("Loading configuration from {}", path);
        return Ok(SlipConfig::from_file(Path::new(path))?);
    }

    Ok(read_or_default(&default_config_path())?.0)
}

/// Returns the config and whether it came from `path`.
fn read_or_default(path: &Path) -> anyhow::Result<(SlipConfig, bool)> {
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok((SlipConfig::from_file(path)?, true))
    } else {
        Ok((SlipConfig::default(), false))
    }
}

fn show(path: &Path, key: Option<&str>) -> anyhow::Result<()> {
    let (config, from_file) = read_or_default(path)?;
    if !from_file {
        eprintln!(
            "{} {} does not exist, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }

    let json = serde_json::to_value(&config)?;
    let selected = match key {
        Some(key) => lookup(&json, key)?,
        None => &json,
    };

    println!("{}", serde_json::to_string_pretty(selected)?);
    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to replace it",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    SlipConfig::default().save(path)?;

    println!("{} Wrote defaults to {}", style("✓").green(), path.display());
    Ok(())
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let (config, _) = read_or_default(path)?;
    let value = parse_value(raw);
    let updated = with_value(&config, key, value.clone())?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    updated.save(path)?;

    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    let status = if path.exists() {
        style("present").green()
    } else {
        style("missing, run 'slip config init'").yellow()
    };

    println!("{} ({})", path.display(), status);
    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.')
        .try_fold(json, |node, part| node.get(part))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
}

/// JSON literals are taken as-is, anything else as a string.
fn parse_value(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

/// Return a copy of `config` with the dotted `key` replaced by `value`.
///
/// Only existing keys can be set, and the result must still deserialize.
fn with_value(config: &SlipConfig, key: &str, value: Value) -> anyhow::Result<SlipConfig> {
    let mut json = serde_json::to_value(config)?;

    let (section, field) = key
        .rsplit_once('.')
        .ok_or_else(|| anyhow::anyhow!("Configuration key must be dotted: {}", key))?;

    let slot = section
        .split('.')
        .try_fold(&mut json, |node, part| node.get_mut(part))
        .and_then(Value::as_object_mut)
        .and_then(|obj| obj.get_mut(field))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value;

    Ok(serde_json::from_value(json)?)
}
