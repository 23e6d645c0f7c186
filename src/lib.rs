pub mod args;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod fetch;
pub mod poll;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::{
    args::Cli,
    auth::TerminalPrompt,
    config::CloudConfig,
    poll::{OutputFormat, PollConfig, SystemTimer, VariableRequest},
};

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();
    let config = CloudConfig::load().context("Failed to load config")?;

    if cli.clear_token {
        credentials::clear(&config.credentials_path)?;
        info!(
            "Deleted credential file at {}",
            config.credentials_path.display()
        );
        return Ok(());
    }

    let device = cli.device.context("Please give a device name")?;

    let client = Client::new();
    let token = auth::get_access_token(&client, &config, &TerminalPrompt).await?;

    let request = VariableRequest {
        device,
        variables: cli.variables,
    };
    let poll = PollConfig {
        interval: cli.poll_time,
        format: if cli.csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Plain
        },
    };

    let mut out = std::io::stdout();
    poll::run(&client, &config, &token, &request, &poll, &SystemTimer, &mut out).await
}
