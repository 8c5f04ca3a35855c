use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub id: i32,
    pub printer_uri: String,
    /// Absent while the job has not finished yet.
    pub completed_at: Option<DateTime<Utc>>,
}
