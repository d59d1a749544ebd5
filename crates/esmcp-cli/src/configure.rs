//! Registration of this server in an MCP client settings file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::info;

use esmcp_core::{EsMcpError, Result, ENV_API_KEY, ENV_CLOUD_ID};

/// Key of our entry under `mcpServers`.
pub const SERVER_KEY: &str = "elasticsearch";

/// The Cline extension settings file under the user config directory.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join("Code")
            .join("User")
            .join("globalStorage")
            .join("saoudrizwan.claude-dev")
            .join("settings")
            .join("cline_mcp_settings.json")
    })
}

/// The `mcpServers` entry that launches `command serve` with the given
/// credentials.
pub fn server_entry(command: &Path, cloud_id: &str, api_key: &str) -> Value {
    json!({
        "command": command.display().to_string(),
        "args": ["serve"],
        "env": {
            ENV_CLOUD_ID: cloud_id,
            ENV_API_KEY: api_key,
        },
        "disabled": false,
        "autoApprove": [],
    })
}

/// Write `entry` as `mcpServers.elasticsearch` in the settings file at
/// `path`, keeping everything else in the file. The file and its directory
/// are created when missing.
pub fn register(path: &Path, entry: Value) -> Result<()> {
    let mut settings = read_settings(path)?;

    let servers = settings
        .entry("mcpServers")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(servers) = servers.as_object_mut() else {
        return Err(EsMcpError::config(format!(
            "'mcpServers' in {} is not an object",
            path.display()
        )));
    };
    servers.insert(SERVER_KEY.to_string(), entry);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut text = serde_json::to_string_pretty(&Value::Object(settings))?;
    text.push('\n');
    fs::write(path, text)?;

    info!("Registered {} server in {}", SERVER_KEY, path.display());
    Ok(())
}

fn read_settings(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(EsMcpError::config(format!(
            "{} does not contain a JSON object",
            path.display()
        ))),
        Err(e) => Err(EsMcpError::config(format!(
            "{} is not valid JSON: {}",
            path.display(),
            e
        ))),
    }
}
