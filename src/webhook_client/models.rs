use serde::{Deserialize, Serialize};

use crate::idle_monitor::detector::IdleClassification;

// //////// //
// Payloads //
// //////// //

/// Body of the idle-monitor webhook. Field names are part of the contract
/// with the receiving automation and must not change.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdleStatusPayload {
    pub printer: String,
    pub idle: bool,
    /// Seconds the printer has been idle; 0 while it is active.
    pub idle_time: u64,
    /// Epoch seconds of the last completed job; 0 when no job is known.
    pub last_job_time: i64,
}

impl IdleStatusPayload {
    pub fn new(printer: &str, classification: &IdleClassification) -> Self {
        IdleStatusPayload {
            printer: printer.to_owned(),
            idle: classification.is_idle,
            idle_time: classification.idle_duration.as_secs(),
            last_job_time: classification.last_job_time.map_or(0, |last| last.timestamp()),
        }
    }
}

/// Body of the power-on webhook.
#[derive(Debug, Serialize, Deserialize)]
pub struct PowerOnPayload {
    pub power_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PowerOnPayload {
    pub fn new(printer: &str, source: Option<String>) -> Self {
        PowerOnPayload { power_on: printer.to_owned(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn idle_status_payload_shape() {
        let classification = IdleClassification {
            is_idle: true,
            last_job_time: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
            idle_duration: Duration::from_secs(7200),
        };
        let payload = IdleStatusPayload::new("office", &classification);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "printer": "office",
                "idle": true,
                "idle_time": 7200,
                "last_job_time": 1_700_000_000i64,
            })
        );
    }

    #[test]
    fn unknown_last_job_time_serializes_as_zero() {
        let classification = IdleClassification {
            is_idle: true,
            last_job_time: None,
            idle_duration: Duration::ZERO,
        };
        let payload = IdleStatusPayload::new("office", &classification);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["last_job_time"], 0);
        assert_eq!(value["idle_time"], 0);
    }

    #[test]
    fn power_on_payload_omits_unset_source() {
        let payload = PowerOnPayload::new("office", None);

        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({ "power_on": "office" }));
    }

    #[test]
    fn power_on_payload_carries_source_tag() {
        let payload = PowerOnPayload::new("office", Some("octoprint".to_owned()));

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "power_on": "office", "source": "octoprint" })
        );
    }
}
