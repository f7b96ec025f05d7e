//! Config command - inspect and edit the stmt configuration file.
//!
//! Every subcommand works on the file named by the global `--config` flag,
//! falling back to `<config dir>/stmt/config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use stmt_core::models::config::StmtConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show,

    /// Write a configuration file with default values
    Init(InitArgs),

    /// Print one value by dotted key
    Get {
        /// Dotted key, e.g. "extraction.unmarked_side"
        key: String,
    },

    /// Change one value by dotted key
    Set {
        /// Dotted key, e.g. "output.organize_by_bank"
        key: String,
        /// JSON value; anything that is not valid JSON is taken as a string
        value: String,
    },

    /// Print where the configuration file lives
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write the file (default: the active config path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show(&path),
        ConfigCommand::Init(init) => init_file(init.output.unwrap_or(path), init.force),
        ConfigCommand::Get { key } => get(&path, &key),
        ConfigCommand::Set { key, value } => set(&path, &key, &value),
        ConfigCommand::Path => print_path(&path),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stmt")
        .join("config.json")
}

fn load(path: &Path) -> anyhow::Result<StmtConfig> {
    if path.exists() {
        StmtConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
    } else {
        Ok(StmtConfig::default())
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

fn show(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} {} does not exist; these are the defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }

    println!("{}", serde_json::to_string_pretty(&load(path)?)?);
    Ok(())
}

fn init_file(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Pass --force to replace it.",
            path.display()
        );
    }

    ensure_parent(&path)?;
    StmtConfig::default().save(&path)?;

    println!("{} Wrote default configuration to {}", style("✓").green(), path.display());
    Ok(())
}

/// Follow a dotted key through the serialized configuration.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Replace the value at a dotted key. Only existing keys can be set, and the
/// result must still deserialize as a configuration.
fn assign(config: &StmtConfig, key: &str, value: Value) -> anyhow::Result<StmtConfig> {
    let mut json = serde_json::to_value(config)?;

    let (section, leaf) = match key.rsplit_once('.') {
        Some((section, leaf)) => (Some(section), leaf),
        None => (None, key),
    };

    let mut node = &mut json;
    for part in section.into_iter().flat_map(|s| s.split('.')) {
        node = node
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    }

    match node.as_object_mut() {
        Some(fields) if fields.contains_key(leaf) => {
            fields.insert(leaf.to_string(), value);
        }
        Some(_) => anyhow::bail!("Configuration key not found: {}", key),
        None => anyhow::bail!("{} is a value, not a section", section.unwrap_or(key)),
    }

    serde_json::from_value(json).map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

fn get(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load(path)?)?;
    println!("{}", serde_json::to_string_pretty(lookup(&json, key)?)?);
    Ok(())
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let value: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let shown = value.to_string();

    let config = assign(&load(path)?, key, value)?;
    ensure_parent(path)?;
    config.save(path)?;

    println!("{} {} = {}", style("✓").green(), key, shown);
    Ok(())
}

fn print_path(path: &Path) -> anyhow::Result<()> {
    println!("{}", path.display());

    if !path.exists() {
        eprintln!(
            "{} not created yet; run 'stmt config init' to write defaults",
            style("ℹ").yellow()
        );
    }

    Ok(())
}
