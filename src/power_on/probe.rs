use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

/// Per-attempt connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Pause between attempts. Printer wake latency is bounded, so a fixed
/// cadence is enough; no backoff.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Transport-level reachability. A completed TCP handshake counts as
/// "powered on and ready"; no protocol exchange is attempted.
pub trait Probe {
    /// One-shot check without any polling.
    fn is_available(&self) -> bool;

    /// Poll until a connection succeeds or `timeout` of wall-clock time
    /// has elapsed.
    fn wait_until_available(&self, timeout: Duration) -> bool;
}

pub struct TcpProbe {
    host: String,
    port: u16,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl Probe for TcpProbe {
    fn is_available(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                debug!("Could not resolve {}:{}: {}", self.host, self.port, err);
                return false;
            }
        };

        addrs.into_iter().any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok())
    }

    fn wait_until_available(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if self.is_available() {
                return true;
            }
            debug!("Printer not available yet, retrying...");
            thread::sleep(POLL_INTERVAL);
        }
        false
    }
}
