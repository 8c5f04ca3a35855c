use serde_derive::Deserialize;

// When changing anything here, make sure to add
// #[serde(alias = "ihavenounderscores")]
// where needed, so it can be read from the ENV vars.

#[derive(Debug, Deserialize)]
pub struct Cups {
    pub uri: String,
    #[serde(alias = "ignoretlserrors")]
    pub ignore_tls_errors: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Idle {
    /// Printer names as set in CUPS. May stay empty if only one printer exists.
    #[serde(default)]
    pub printers: Vec<String>,
    /// Seconds since the last completed job before a printer counts as idle.
    pub threshold: u64,
    #[serde(alias = "webhookurl")]
    pub webhook_url: String,
    #[serde(alias = "webhookurlfile")]
    pub webhook_url_file: String,
    #[serde(alias = "statedir")]
    pub state_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct PowerOn {
    pub host: String,
    #[serde(alias = "hostfile")]
    pub host_file: String,
    pub name: String,
    pub port: u16,
    #[serde(alias = "webhookurl")]
    pub webhook_url: String,
    #[serde(alias = "webhookurlfile")]
    pub webhook_url_file: String,
    /// Seconds to wait for the printer to accept connections after the wake signal.
    #[serde(alias = "waittimeout")]
    pub wait_timeout: u64,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub cups: Cups,
    pub idle: Idle,
    #[serde(alias = "poweron")]
    pub power_on: PowerOn,
    #[serde(alias = "loglevel")]
    pub log_level: String,
    #[serde(alias = "sentrydsn")]
    pub sentry_dsn: Option<String>,
}
