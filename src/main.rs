use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use log::{debug, error, info, warn, LevelFilter};
use url::Url;

use crate::cli::{Cli, Commands};
use crate::config::models::Settings;
use crate::config::secrets;
use crate::cups_client::CupsPrintQueue;
use crate::idle_monitor::detector::{IdleClassification, IdleDetector};
use crate::idle_monitor::state::{ActivityState, StateStore};
use crate::power_on::orchestrator::{PowerOnOrchestrator, PowerOnOutcome, PowerOnWebhook};
use crate::power_on::probe::TcpProbe;
use crate::webhook_client::client::{NotifyOutcome, WebhookClient};
use crate::webhook_client::models::IdleStatusPayload;

mod cli;
mod config;
mod cups_client;
mod idle_monitor;
mod power_on;
mod webhook_client;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match crate::config::loading::load_config() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::from(2);
        }
    };

    init_logging(&settings.log_level);
    let _sentry = settings.sentry_dsn.as_deref()
        .filter(|dsn| !dsn.is_empty())
        .map(sentry::init);

    match cli.command {
        Commands::Monitor => run_idle_monitor(&settings),
        Commands::PowerOn => run_power_on(&settings),
    }
}

fn init_logging(log_level: &str) {
    let level = log_level.parse::<LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid log level: {log_level} - Defaulting to INFO");
        LevelFilter::Info
    });
    colog::default_builder().filter_level(level).init();
}

fn run_idle_monitor(settings: &Settings) -> ExitCode {
    let webhook_url = match secrets::resolve(
        &settings.idle.webhook_url,
        &settings.idle.webhook_url_file,
        "idle webhook URL",
    ) {
        Ok(Some(raw)) => match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(err) => {
                error!("Invalid idle webhook URL {raw}: {err}");
                return ExitCode::from(2);
            }
        },
        Ok(None) => None,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let notifier = match WebhookClient::new() {
        Ok(client) => client,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let queue = CupsPrintQueue::new(&settings.cups);
    let detector = IdleDetector::new(&queue, Duration::from_secs(settings.idle.threshold));
    let store = StateStore::new(&settings.idle.state_dir);

    // An empty list falls through to auto-selection of the sole printer.
    let configured: Vec<String> = if settings.idle.printers.is_empty() {
        vec![String::new()]
    } else {
        settings.idle.printers.clone()
    };

    for configured_name in &configured {
        let printer_name = match detector.resolve_printer(configured_name) {
            Ok(name) => name,
            Err(err) => {
                error!("Skipping printer: {err}");
                continue;
            }
        };

        let classification = match detector.classify(&printer_name) {
            Ok(classification) => classification,
            Err(err) => {
                error!("Skipping printer {printer_name}: {err}");
                continue;
            }
        };

        let current = ActivityState::from_idle_flag(classification.is_idle);
        let transition = match store.record(&printer_name, current) {
            Ok(transition) => transition,
            Err(err) => {
                error!("Could not update state file for {printer_name}: {err}");
                continue;
            }
        };

        if transition.changed {
            info!("Printer {printer_name} has changed to {current} state.");
        }
        log_idle_details(&printer_name, &classification);

        let Some(url) = webhook_url.as_ref() else {
            warn!("Skipping webhook - no idle webhook URL configured.");
            return ExitCode::SUCCESS;
        };

        let payload = IdleStatusPayload::new(&printer_name, &classification);
        match notifier.notify(url, &payload) {
            Ok(NotifyOutcome::Accepted) => debug!("Webhook sent successfully"),
            Ok(NotifyOutcome::UnexpectedStatus(status)) => {
                error!("Webhook responded with status {status}");
                return ExitCode::SUCCESS;
            }
            Err(err) => {
                error!("Webhook request failed: {err}");
                return ExitCode::SUCCESS;
            }
        }
    }

    ExitCode::SUCCESS
}

fn log_idle_details(printer_name: &str, classification: &IdleClassification) {
    match (classification.is_idle, classification.last_job_time) {
        (true, None) => {
            debug!("No completed jobs found for printer {printer_name}. Printer must be idle.");
        }
        (true, Some(_)) => {
            debug!(
                "Printer {printer_name} has been idle for {}.",
                humantime::format_duration(classification.idle_duration),
            );
        }
        (false, Some(last)) => {
            let since = Utc::now().signed_duration_since(last).num_seconds().max(0) as u64;
            debug!(
                "Printer {printer_name} is not idle. Last job completed {} ago.",
                humantime::format_duration(Duration::from_secs(since)),
            );
        }
        (false, None) => {}
    }
}

fn run_power_on(settings: &Settings) -> ExitCode {
    let raw_url = match secrets::resolve_required(
        &settings.power_on.webhook_url,
        &settings.power_on.webhook_url_file,
        "power-on webhook URL",
    ) {
        Ok(raw) => raw,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };
    let url = match Url::parse(&raw_url) {
        Ok(url) => url,
        Err(err) => {
            error!("Invalid power-on webhook URL {raw_url}: {err}");
            return ExitCode::from(2);
        }
    };

    let host = match secrets::resolve_required(
        &settings.power_on.host,
        &settings.power_on.host_file,
        "printer host",
    ) {
        Ok(host) => host,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let client = match WebhookClient::new() {
        Ok(client) => client,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let source = if settings.power_on.source.is_empty() {
        None
    } else {
        Some(settings.power_on.source.clone())
    };
    let wake = PowerOnWebhook::new(client, url, &settings.power_on.name, source);
    let probe = TcpProbe::new(host, settings.power_on.port);
    let orchestrator = PowerOnOrchestrator::new(
        settings.power_on.name.clone(),
        wake,
        probe,
        Duration::from_secs(settings.power_on.wait_timeout),
    );

    match orchestrator.run() {
        PowerOnOutcome::AlreadyOnline | PowerOnOutcome::Online => ExitCode::SUCCESS,
        PowerOnOutcome::TimedOut => ExitCode::FAILURE,
    }
}
