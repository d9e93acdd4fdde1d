//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use jotter_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str =
    "data_dir, listen_addr, owner_header, server_url, owner, autosave_delay_ms, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "listen_addr": config.listen_addr,
                    "owner_header": config.owner_header,
                    "server_url": config.server_url,
                    "owner": config.owner,
                    "autosave_delay_ms": config.autosave_delay_ms,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.server_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:          {}", config.data_dir.display());
            println!("  listen_addr:       {}", config.listen_addr);
            println!("  owner_header:      {}", config.owner_header);
            println!("  server_url:        {}", config.server_url);
            println!(
                "  owner:             {}",
                config.owner.as_deref().unwrap_or("(not set)")
            );
            println!("  autosave_delay_ms: {}", config.autosave_delay_ms);
            println!(
                "  log_file:          {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";

    match key {
        "data_dir" => config.data_dir = value.into(),
        "listen_addr" => config.listen_addr = value.to_string(),
        "owner_header" => {
            if value.is_empty() {
                bail!("owner_header cannot be empty");
            }
            config.owner_header = value.to_ascii_lowercase();
        }
        "server_url" => config.server_url = value.trim_end_matches('/').to_string(),
        "owner" => {
            config.owner = if unset {
                None
            } else {
                Some(value.trim().to_string())
            };
        }
        "autosave_delay_ms" => {
            config.autosave_delay_ms = value
                .parse()
                .context("Invalid value for autosave_delay_ms. Use a number of milliseconds.")?;
        }
        "log_file" => {
            config.log_file = if unset { None } else { Some(value.into()) };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}
