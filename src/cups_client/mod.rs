pub mod client;
pub mod models;

use crate::config::models::Cups;

use client::CupsError;
use models::CompletedJob;

/// Read-only view of the CUPS printer inventory and job history.
pub trait PrintQueue {
    fn printer_names(&self) -> Result<Vec<String>, CupsError>;
    fn completed_jobs(&self) -> Result<Vec<CompletedJob>, CupsError>;
}

pub struct CupsPrintQueue<'a> {
    settings: &'a Cups,
}

impl<'a> CupsPrintQueue<'a> {
    pub fn new(settings: &'a Cups) -> Self {
        Self { settings }
    }
}

impl PrintQueue for CupsPrintQueue<'_> {
    fn printer_names(&self) -> Result<Vec<String>, CupsError> {
        let url = client::build_cups_url(self.settings)?;
        client::get_printer_names(url, self.settings.ignore_tls_errors)
    }

    fn completed_jobs(&self) -> Result<Vec<CompletedJob>, CupsError> {
        let url = client::build_cups_url(self.settings)?;
        client::get_completed_jobs(url, self.settings.ignore_tls_errors)
    }
}
