use crate::config::CloudConfig;
use crate::credentials;
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::info;

// Fixed, publicly known client pair the Spark cloud uses for the
// password grant.
const CLIENT_ID: &str = "spark";
const CLIENT_SECRET: &str = "spark";

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    username: &'a str,
    password: &'a str,
}

/// Supplies a login email and password for the password grant. Abstracted
/// so tests can hand in canned credentials without a terminal.
pub trait CredentialSource {
    fn obtain(&self) -> Result<(String, String)>;
}

/// Prompts on the controlling terminal; the password is read without echo.
pub struct TerminalPrompt;

impl CredentialSource for TerminalPrompt {
    fn obtain(&self) -> Result<(String, String)> {
        print!("Please enter Spark login email address: ");
        io::stdout().flush()?;
        let mut email = String::new();
        io::stdin()
            .read_line(&mut email)
            .context("failed to read email address")?;
        let password = rpassword::prompt_password("Please enter password: ")
            .context("failed to read password")?;
        Ok((email.trim().to_string(), password))
    }
}

/// Exchanges a username and password for a token response at the OAuth
/// endpoint. The body is parsed as JSON whatever the HTTP status: the
/// cloud's error payloads are JSON too, so callers look for an
/// `access_token` field instead of matching on status codes.
pub async fn request_token(
    client: &Client,
    config: &CloudConfig,
    username: &str,
    password: &str,
) -> Result<Value> {
    let request_body = TokenRequest {
        grant_type: "password",
        username,
        password,
    };

    let resp = client
        .post(&config.auth_url)
        .basic_auth(CLIENT_ID, Some(CLIENT_SECRET))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(serde_urlencoded::to_string(&request_body)?)
        .send()
        .await
        .context("token request failed")?;

    let token: Value = resp.json().await.context("token response was not JSON")?;
    Ok(token)
}

/// Returns the cached access token, or runs the login flow and caches the
/// result. A cached token is trusted as-is; the cloud is never asked
/// whether it is still valid.
pub async fn get_access_token(
    client: &Client,
    config: &CloudConfig,
    source: &dyn CredentialSource,
) -> Result<String> {
    if let Some(cached) = credentials::load(&config.credentials_path)? {
        return Ok(cached.access_token);
    }

    let (email, password) = source.obtain()?;
    let resp = request_token(client, config, &email, &password).await?;

    let Some(token) = resp.get("access_token").and_then(Value::as_str) else {
        if let Some(fields) = resp.as_object() {
            for (key, value) in fields {
                // strings print raw, everything else as JSON
                let text = match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                };
                eprintln!("{key:<20}: {text}");
            }
        }
        bail!("could not get access token");
    };

    credentials::save(&config.credentials_path, &email, token)?;
    info!(
        "Cached access token at {}",
        config.credentials_path.display()
    );
    Ok(token.to_string())
}
