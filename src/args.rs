use clap::Parser;

/// Telemetry variables fetched when none are named on the command line.
pub const ALL_VARS: [&str; 8] = [
    "upTime",
    "connectTime",
    "wifiRSSI",
    "powerWatts",
    "powerVA",
    "mainsFreq",
    "totalWh",
    "sinPhi",
];

#[derive(Parser, Debug)]
#[command(name = "sparkmon", version, about)]
pub struct Cli {
    /// Name or id of the device to poll
    #[arg(required_unless_present = "clear_token")]
    pub device: Option<String>,

    /// Variables to fetch (defaults to the standard telemetry set)
    #[arg(default_values_t = ALL_VARS.map(String::from))]
    pub variables: Vec<String>,

    /// Repeatedly fetch data, pause TIME seconds between fetches
    #[arg(short = 't', long = "polltime", value_name = "TIME")]
    pub poll_time: Option<u64>,

    /// Output data in CSV format
    #[arg(short, long)]
    pub csv: bool,

    /// Delete the cached access token and exit
    #[arg(long)]
    pub clear_token: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
