//! `tez config`: show or persist configuration

use serde_json::json;
use std::path::Path;

use crate::{output::Output, CliError, Config};

/// Show the configuration, or save it with a new RPC URL
pub fn execute(
    config: &mut Config,
    path: Option<&Path>,
    show: bool,
    set_rpc: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    if let Some(rpc) = set_rpc {
        config.rpc_url = rpc;
        let saved = config.save(path)?;
        Output::new(json)
            .field("status", "saved")
            .field("path", &saved.display().to_string())
            .message(&format!("Configuration saved to {}", saved.display()))
            .print();
    } else if show {
        Output::new(json)
            .field_value("config", json!(config))
            .message(&toml_text(config)?)
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-rpc to modify")
            .print();
    }
    Ok(())
}

fn toml_text(config: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(config)
        .map(|s| s.trim_end().to_string())
        .map_err(|e| CliError::Config(e.to_string()))
}
