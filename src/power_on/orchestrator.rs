use std::time::Duration;

use log::{debug, error, info, warn};
use url::Url;

use crate::webhook_client::client::{NotifyError, NotifyOutcome, WebhookClient};
use crate::webhook_client::models::PowerOnPayload;

use super::probe::Probe;

/// The wake signal sent toward the automation endpoint.
pub trait WakeSignal {
    fn send(&self) -> Result<NotifyOutcome, NotifyError>;
}

pub struct PowerOnWebhook {
    client: WebhookClient,
    url: Url,
    payload: PowerOnPayload,
}

impl PowerOnWebhook {
    pub fn new(client: WebhookClient, url: Url, printer_name: &str, source: Option<String>) -> Self {
        Self { client, url, payload: PowerOnPayload::new(printer_name, source) }
    }
}

impl WakeSignal for PowerOnWebhook {
    fn send(&self) -> Result<NotifyOutcome, NotifyError> {
        self.client.notify(&self.url, &self.payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerOnOutcome {
    /// Reachable before any wake signal went out; nothing was sent.
    AlreadyOnline,
    Online,
    TimedOut,
}

pub struct PowerOnOrchestrator<W: WakeSignal, P: Probe> {
    printer_name: String,
    wake: W,
    probe: P,
    wait_timeout: Duration,
}

impl<W: WakeSignal, P: Probe> PowerOnOrchestrator<W, P> {
    pub fn new(printer_name: impl Into<String>, wake: W, probe: P, wait_timeout: Duration) -> Self {
        Self { printer_name: printer_name.into(), wake, probe, wait_timeout }
    }

    /// Pre-check, trigger, wait. A printer that already accepts connections
    /// gets no wake signal at all.
    pub fn run(&self) -> PowerOnOutcome {
        if self.probe.is_available() {
            info!("{} is already online", self.printer_name);
            return PowerOnOutcome::AlreadyOnline;
        }

        info!("Triggering webhook...");
        match self.wake.send() {
            Ok(NotifyOutcome::Accepted) => debug!("Webhook accepted the power-on request"),
            Ok(NotifyOutcome::UnexpectedStatus(status)) => warn!("Webhook responded with status {}", status),
            // A failed trigger does not end the workflow; the printer may
            // still wake through another path.
            Err(err) => error!("Error sending webhook: {}", err),
        }

        info!("Waiting for {} to become available for printing...", self.printer_name);
        if self.probe.wait_until_available(self.wait_timeout) {
            info!("{} is online", self.printer_name);
            PowerOnOutcome::Online
        } else {
            error!(
                "Timeout reached: {} did not become available within {}",
                self.printer_name,
                humantime::format_duration(self.wait_timeout),
            );
            PowerOnOutcome::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct ScriptedWake {
        calls: Cell<usize>,
        fails: bool,
    }

    impl ScriptedWake {
        fn succeeding() -> Self {
            Self { calls: Cell::new(0), fails: false }
        }

        fn failing() -> Self {
            Self { calls: Cell::new(0), fails: true }
        }
    }

    impl WakeSignal for &ScriptedWake {
        fn send(&self) -> Result<NotifyOutcome, NotifyError> {
            self.calls.set(self.calls.get() + 1);
            if self.fails {
                snafu::whatever!("connection refused");
            }
            Ok(NotifyOutcome::Accepted)
        }
    }

    struct ScriptedProbe {
        reachable_now: bool,
        comes_up: bool,
        wait_calls: Cell<usize>,
    }

    impl ScriptedProbe {
        fn new(reachable_now: bool, comes_up: bool) -> Self {
            Self { reachable_now, comes_up, wait_calls: Cell::new(0) }
        }
    }

    impl Probe for &ScriptedProbe {
        fn is_available(&self) -> bool {
            self.reachable_now
        }

        fn wait_until_available(&self, _timeout: Duration) -> bool {
            self.wait_calls.set(self.wait_calls.get() + 1);
            self.comes_up
        }
    }

    fn orchestrator<'a>(
        wake: &'a ScriptedWake,
        probe: &'a ScriptedProbe,
    ) -> PowerOnOrchestrator<&'a ScriptedWake, &'a ScriptedProbe> {
        PowerOnOrchestrator::new("Office", wake, probe, Duration::from_secs(120))
    }

    #[test]
    fn reachable_printer_short_circuits_without_webhook() {
        let wake = ScriptedWake::succeeding();
        let probe = ScriptedProbe::new(true, true);

        let outcome = orchestrator(&wake, &probe).run();

        assert_eq!(outcome, PowerOnOutcome::AlreadyOnline);
        assert_eq!(wake.calls.get(), 0);
        assert_eq!(probe.wait_calls.get(), 0);
    }

    #[test]
    fn triggers_once_then_waits() {
        let wake = ScriptedWake::succeeding();
        let probe = ScriptedProbe::new(false, true);

        let outcome = orchestrator(&wake, &probe).run();

        assert_eq!(outcome, PowerOnOutcome::Online);
        assert_eq!(wake.calls.get(), 1);
        assert_eq!(probe.wait_calls.get(), 1);
    }

    #[test]
    fn failed_trigger_still_waits_for_the_printer() {
        let wake = ScriptedWake::failing();
        let probe = ScriptedProbe::new(false, true);

        let outcome = orchestrator(&wake, &probe).run();

        assert_eq!(outcome, PowerOnOutcome::Online);
        assert_eq!(wake.calls.get(), 1);
        assert_eq!(probe.wait_calls.get(), 1);
    }

    #[test]
    fn reports_timeout_when_printer_never_shows_up() {
        let wake = ScriptedWake::succeeding();
        let probe = ScriptedProbe::new(false, false);

        let outcome = orchestrator(&wake, &probe).run();

        assert_eq!(outcome, PowerOnOutcome::TimedOut);
        assert_eq!(wake.calls.get(), 1);
    }
}
