use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, io::Write, path::Path};

/// Cached login persisted in the Spark CLI config file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    pub access_token: String,
}

/// Reads cached credentials. `None` when the file does not exist or holds
/// no `access_token` field; malformed JSON is propagated as an error.
pub fn load(path: &Path) -> Result<Option<Credentials>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read credential file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("malformed credential file: {}", path.display()))?;
    if value.get("access_token").is_none() {
        return Ok(None);
    }

    let credentials: Credentials = serde_json::from_value(value)
        .with_context(|| format!("malformed credential file: {}", path.display()))?;
    Ok(Some(credentials))
}

/// Writes the credential file, replacing any prior content. The write is
/// not atomic; a partial file after a crash is an accepted risk.
pub fn save(path: &Path, username: &str, access_token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let credentials = Credentials {
        username: username.to_string(),
        access_token: access_token.to_string(),
    };
    let json = serde_json::to_string_pretty(&credentials)?;

    let mut file = fs::File::create(path)
        .with_context(|| format!("failed to write credential file: {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn clear(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove credential file: {}", path.display()))?;
    }

    Ok(())
}
