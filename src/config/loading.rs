use config::{Config, ConfigError, Environment};

use super::models::Settings;

pub fn load_config() -> Result<Settings, ConfigError> {
    // As Rust has no native support for .env files,
    // we use the dotenv_flow crate to import to actual ENV vars.
    let dotenv_path = dotenv_flow::dotenv_flow();
    if dotenv_path.is_ok() {
        println!("Loaded dotenv file: {:?}", dotenv_path.unwrap());
    }

    let config = Config::builder()
        .add_source(Environment::default()
            .prefix("C2W")
            .separator("_")
            .prefix_separator("_")
            .try_parsing(true)
            .with_list_parse_key("IDLE.PRINTERS")
            .list_separator(","))
            .set_default("cups.uri", "https://localhost:631/").unwrap()
            .set_default("cups.ignoretlserrors", "true").unwrap()
            .set_default("cups.username", "").unwrap()
            .set_default("cups.password", "").unwrap()
            .set_default("idle.threshold", "3600").unwrap()
            .set_default("idle.webhookurl", "").unwrap()
            .set_default("idle.webhookurlfile", "").unwrap()
            .set_default("idle.statedir", "/run").unwrap()
            .set_default("poweron.host", "").unwrap()
            .set_default("poweron.hostfile", "").unwrap()
            .set_default("poweron.name", "Printer").unwrap()
            .set_default("poweron.port", "631").unwrap()
            .set_default("poweron.webhookurl", "").unwrap()
            .set_default("poweron.webhookurlfile", "").unwrap()
            .set_default("poweron.waittimeout", "120").unwrap()
            .set_default("loglevel", "info").unwrap()
            .set_default("poweron.source", "").unwrap()
            .set_default("sentrydsn", "").unwrap()
        .build()?;

    config.try_deserialize()
}
