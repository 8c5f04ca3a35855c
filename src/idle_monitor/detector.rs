use std::time::Duration;

use chrono::{DateTime, Utc};
use snafu::whatever;

use crate::cups_client::client::{CupsError, PrinterNotFoundSnafu};
use crate::cups_client::PrintQueue;

/// Result of one idle check. Computed fresh on every run, never cached.
#[derive(Debug, Clone)]
pub struct IdleClassification {
    pub is_idle: bool,
    pub last_job_time: Option<DateTime<Utc>>,
    /// Time since the last completed job. Zero whenever the printer is
    /// active, and zero when no job history exists at all.
    pub idle_duration: Duration,
}

pub struct IdleDetector<'a, Q: PrintQueue> {
    queue: &'a Q,
    threshold: Duration,
}

impl<'a, Q: PrintQueue> IdleDetector<'a, Q> {
    pub fn new(queue: &'a Q, threshold: Duration) -> Self {
        Self { queue, threshold }
    }

    /// Validate the configured printer name against the CUPS inventory.
    /// An empty name selects the sole known printer, mirroring setups with
    /// exactly one print queue where naming it would be redundant.
    pub fn resolve_printer(&self, configured: &str) -> Result<String, CupsError> {
        let names = self.queue.printer_names()?;

        if configured.is_empty() {
            return match names.len() {
                0 => whatever!("printer name not configured and no printers found"),
                1 => Ok(names.into_iter().next().unwrap()),
                _ => whatever!("printer name not configured and multiple printers were found: {names:?}"),
            };
        }

        if names.iter().any(|name| name == configured) {
            Ok(configured.to_owned())
        } else {
            PrinterNotFoundSnafu { name: configured }.fail()
        }
    }

    pub fn classify(&self, printer_name: &str) -> Result<IdleClassification, CupsError> {
        self.classify_at(printer_name, Utc::now())
    }

    fn classify_at(&self, printer_name: &str, now: DateTime<Utc>) -> Result<IdleClassification, CupsError> {
        let jobs = self.queue.completed_jobs()?;

        // CUPS does not guarantee any ordering of the job list, so take the
        // most recent completion among the records for this printer.
        let last_job_time = jobs.iter()
            .filter(|job| job.printer_uri.ends_with(printer_name))
            .filter_map(|job| job.completed_at)
            .max();

        let is_idle = match last_job_time {
            // No job history means nothing the printer could be busy with.
            None => true,
            Some(last) => now.signed_duration_since(last).num_seconds() > self.threshold.as_secs() as i64,
        };

        let idle_duration = match (is_idle, last_job_time) {
            (true, Some(last)) => Duration::from_secs(now.signed_duration_since(last).num_seconds().max(0) as u64),
            _ => Duration::ZERO,
        };

        Ok(IdleClassification { is_idle, last_job_time, idle_duration })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cups_client::models::CompletedJob;
    use chrono::TimeZone;

    struct FakeQueue {
        printers: Vec<String>,
        jobs: Vec<CompletedJob>,
    }

    impl FakeQueue {
        fn with_jobs(jobs: Vec<CompletedJob>) -> Self {
            Self { printers: vec!["Office".to_owned()], jobs }
        }
    }

    impl PrintQueue for FakeQueue {
        fn printer_names(&self) -> Result<Vec<String>, CupsError> {
            Ok(self.printers.clone())
        }

        fn completed_jobs(&self) -> Result<Vec<CompletedJob>, CupsError> {
            Ok(self.jobs.clone())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn job(id: i32, printer: &str, completed_secs_ago: Option<i64>) -> CompletedJob {
        CompletedJob {
            id,
            printer_uri: format!("ipp://localhost/printers/{printer}"),
            completed_at: completed_secs_ago.map(|secs| now() - chrono::Duration::seconds(secs)),
        }
    }

    fn detector(queue: &FakeQueue) -> IdleDetector<'_, FakeQueue> {
        IdleDetector::new(queue, Duration::from_secs(3600))
    }

    #[test]
    fn idle_when_last_job_past_threshold() {
        let queue = FakeQueue::with_jobs(vec![job(1, "Office", Some(7200))]);
        let classification = detector(&queue).classify_at("Office", now()).unwrap();

        assert!(classification.is_idle);
        assert_eq!(classification.idle_duration, Duration::from_secs(7200));
    }

    #[test]
    fn active_within_threshold_reports_zero_idle_duration() {
        let queue = FakeQueue::with_jobs(vec![job(1, "Office", Some(60))]);
        let classification = detector(&queue).classify_at("Office", now()).unwrap();

        assert!(!classification.is_idle);
        assert_eq!(classification.idle_duration, Duration::ZERO);
        assert!(classification.last_job_time.is_some());
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        // Exactly the threshold has not *exceeded* it yet.
        let queue = FakeQueue::with_jobs(vec![job(1, "Office", Some(3600))]);
        let classification = detector(&queue).classify_at("Office", now()).unwrap();

        assert!(!classification.is_idle);
    }

    #[test]
    fn idle_when_no_jobs_exist() {
        let queue = FakeQueue::with_jobs(vec![]);
        let classification = detector(&queue).classify_at("Office", now()).unwrap();

        assert!(classification.is_idle);
        assert!(classification.last_job_time.is_none());
        assert_eq!(classification.idle_duration, Duration::ZERO);
    }

    #[test]
    fn picks_most_recent_completion_regardless_of_order() {
        // The gateway hands jobs back in whatever order it likes.
        let queue = FakeQueue::with_jobs(vec![
            job(7, "Office", Some(3600)),
            job(9, "Office", Some(60)),
            job(8, "Office", Some(7200)),
        ]);
        let classification = detector(&queue).classify_at("Office", now()).unwrap();

        assert!(!classification.is_idle);
        assert_eq!(classification.last_job_time, Some(now() - chrono::Duration::seconds(60)));
    }

    #[test]
    fn ignores_other_printers_and_unfinished_jobs() {
        let queue = FakeQueue::with_jobs(vec![
            job(1, "Lab", Some(60)),
            job(2, "Office", None),
        ]);
        let classification = detector(&queue).classify_at("Office", now()).unwrap();

        assert!(classification.is_idle);
        assert!(classification.last_job_time.is_none());
    }

    #[test]
    fn resolve_keeps_configured_name_when_known() {
        let queue = FakeQueue::with_jobs(vec![]);
        assert_eq!(detector(&queue).resolve_printer("Office").unwrap(), "Office");
    }

    #[test]
    fn resolve_rejects_unknown_printer() {
        let queue = FakeQueue::with_jobs(vec![]);
        let err = detector(&queue).resolve_printer("Basement").unwrap_err();
        assert!(matches!(err, CupsError::PrinterNotFound { .. }));
    }

    #[test]
    fn resolve_auto_selects_sole_printer() {
        let queue = FakeQueue::with_jobs(vec![]);
        assert_eq!(detector(&queue).resolve_printer("").unwrap(), "Office");
    }

    #[test]
    fn resolve_fails_without_any_printer() {
        let queue = FakeQueue { printers: vec![], jobs: vec![] };
        assert!(detector(&queue).resolve_printer("").is_err());
    }

    #[test]
    fn resolve_fails_with_multiple_candidates() {
        let queue = FakeQueue {
            printers: vec!["Office".to_owned(), "Lab".to_owned()],
            jobs: vec![],
        };
        assert!(detector(&queue).resolve_printer("").is_err());
    }
}
