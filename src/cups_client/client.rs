use chrono::DateTime;
use ipp::prelude::*;
use snafu::{OptionExt, ResultExt, Snafu};
use url::Url;

use crate::config::models::Cups;

use super::models::CompletedJob;

pub fn build_cups_url(cups_settings: &Cups) -> Result<String, CupsError> {
    let mut cups_url = Url::parse(&cups_settings.uri)
        .with_whatever_context(|_| format!("invalid CUPS URI: {}", cups_settings.uri))?;
    if !cups_settings.username.is_empty() && !cups_settings.password.is_empty() {
        cups_url.set_username(&cups_settings.username).unwrap();
        cups_url.set_password(Some(&cups_settings.password)).unwrap();
    }

    Ok(cups_url.to_string())
}

/// Send an IPP request to do `op` to the given `uri` and get the response.
fn send_ipp_request(uri: String, ignore_tls_errors: bool, op: Operation) -> Result<IppRequestResponse, CupsError> {
    let uri_p: Uri = uri.parse()
        .with_whatever_context(|_| format!("could not parse {uri} as an IPP URI"))?;
    let req = IppRequestResponse::new(
        IppVersion::v1_1(),
        op,
        Some(uri_p.clone())
    );
    let client = IppClient::builder(uri_p).ignore_tls_errors(ignore_tls_errors).build();
    client.send(req).context(QueueUnavailableSnafu)
}

/// Send an IPP request to do `op` to job `job_id` to the given `uri` and get the response.
fn send_ipp_job_request(uri: String, ignore_tls_errors: bool, op: Operation, job_id: i32) -> Result<IppRequestResponse, CupsError> {
    let uri_p: Uri = uri.parse()
        .with_whatever_context(|_| format!("could not parse {uri} as an IPP URI"))?;
    let mut req = IppRequestResponse::new(
        IppVersion::v1_1(),
        op,
        Some(uri_p.clone())
    );
    req.attributes_mut().add(
        DelimiterTag::OperationAttributes,
        IppAttribute::new(IppAttribute::JOB_ID, IppValue::Integer(job_id)),
    );

    let client = IppClient::builder(uri_p).ignore_tls_errors(ignore_tls_errors).build();
    client.send(req).context(QueueUnavailableSnafu)
}

pub fn get_printer_names(uri: String, ignore_tls_errors: bool) -> Result<Vec<String>, CupsError> {
    let resp = send_ipp_request(uri, ignore_tls_errors, Operation::CupsGetPrinters)?;
    let mut vec: Vec<String> = Vec::new();

    for printer in resp.attributes().groups_of(DelimiterTag::PrinterAttributes) {
        vec.push(printer.attributes()["printer-name"].value().to_string());
    }

    Ok(vec)
}

pub fn get_completed_jobs(uri: String, ignore_tls_errors: bool) -> Result<Vec<CompletedJob>, CupsError> {
    let uri_p: Uri = uri.parse()
        .with_whatever_context(|_| format!("could not parse {uri} as an IPP URI"))?;
    let mut req = IppRequestResponse::new(
        IppVersion::v1_1(),
        Operation::GetJobs,
        Some(uri_p.clone())
    );
    // CUPS defaults to not-completed jobs; only finished ones matter here.
    req.attributes_mut().add(
        DelimiterTag::OperationAttributes,
        IppAttribute::new("which-jobs", IppValue::Keyword("completed".to_owned())),
    );

    let client = IppClient::builder(uri_p).ignore_tls_errors(ignore_tls_errors).build();
    let resp = client.send(req).context(QueueUnavailableSnafu)?;

    let mut vec: Vec<CompletedJob> = Vec::new();
    for job in resp.attributes().groups_of(DelimiterTag::JobAttributes) {
        let job_id = *job.attributes()["job-id"].value().as_integer()
            .whatever_context("could not convert job-id to i32")?;
        vec.push(get_completed_job(uri.clone(), ignore_tls_errors, job_id)?);
    }

    Ok(vec)
}

/// Get-Jobs only hands back job ids; the interesting attributes need a
/// Get-Job-Attributes round trip per job.
fn get_completed_job(uri: String, ignore_tls_errors: bool, job_id: i32) -> Result<CompletedJob, CupsError> {
    let resp = send_ipp_job_request(uri, ignore_tls_errors, Operation::GetJobAttributes, job_id)?;

    let group = resp.attributes().groups_of(DelimiterTag::JobAttributes).next()
        .whatever_context("invalid group returned")?;
    let attributes = group.attributes();

    let printer_uri = match attributes.get("job-printer-uri") {
        Some(attr) => attr.value().to_string(),
        None => String::new(),
    };
    let completed_at = attributes.get("time-at-completed")
        .and_then(|attr| attr.value().as_integer())
        .and_then(|secs| DateTime::from_timestamp(*secs as i64, 0));

    Ok(CompletedJob { id: job_id, printer_uri, completed_at })
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CupsError {
    #[snafu(display("printer {name} not found"))]
    PrinterNotFound { name: String },

    #[snafu(display("could not reach the print queue: {source}"))]
    QueueUnavailable { source: IppError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}
