use crate::config::CloudConfig;
use crate::fetch;
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use reqwest::Client;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Csv,
}

#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Seconds between cycles; `None` runs a single cycle.
    pub interval: Option<u64>,
    pub format: OutputFormat,
}

/// A device plus the variables to fetch from it each cycle. Variable
/// order is preserved in the output; duplicates are not filtered.
#[derive(Clone, Debug)]
pub struct VariableRequest {
    pub device: String,
    pub variables: Vec<String>,
}

/// Clock and sleep used by the poll loop, injectable for tests.
pub trait PollTimer {
    fn now(&self) -> NaiveDateTime;
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

pub struct SystemTimer;

impl PollTimer for SystemTimer {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One decimal place, or the literal `None` for a failed fetch.
pub fn value_str(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "None".to_string(),
    }
}

/// `DD/MM/YY,HH:MM:SS,v1,v2,...` with values in the caller's order.
pub fn csv_line(at: NaiveDateTime, values: &[Option<f64>]) -> String {
    let mut fields = vec![
        at.format("%d/%m/%y").to_string(),
        at.format("%H:%M:%S").to_string(),
    ];
    fields.extend(values.iter().map(|v| value_str(*v)));
    fields.join(",")
}

/// One `name : value` line per variable, names left-justified to 20
/// columns.
pub fn plain_block(names: &[String], results: &HashMap<String, Option<f64>>) -> String {
    names
        .iter()
        .map(|name| {
            let value = results.get(name).copied().flatten();
            format!("{name:<20}: {}", value_str(value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetches and prints the requested variables, once or on an interval.
///
/// Every cycle attempts each variable exactly once; the batch timestamp
/// is taken when the cycle starts, not per variable. In poll mode the
/// loop has no exit condition of its own, it runs until the process is
/// interrupted. CSV lines are flushed as they are written so the output
/// can be piped line-by-line into another process.
pub async fn run<T, W>(
    client: &Client,
    config: &CloudConfig,
    token: &str,
    request: &VariableRequest,
    poll: &PollConfig,
    timer: &T,
    out: &mut W,
) -> Result<()>
where
    T: PollTimer,
    W: Write,
{
    loop {
        let fetched_at = timer.now();
        let results = fetch::fetch_many(
            client,
            config,
            &request.device,
            token,
            &request.variables,
        )
        .await;

        match poll.format {
            OutputFormat::Csv => {
                let values: Vec<Option<f64>> = request
                    .variables
                    .iter()
                    .map(|name| results.get(name).copied().flatten())
                    .collect();
                writeln!(out, "{}", csv_line(fetched_at, &values))?;
                out.flush()?;
            }
            OutputFormat::Plain => {
                writeln!(out, "{}", plain_block(&request.variables, &results))?;
            }
        }

        match poll.interval {
            None => return Ok(()),
            Some(secs) => timer.sleep(Duration::from_secs(secs)).await,
        }
    }
}
