use std::fs;

use snafu::{ResultExt, Snafu};

/// Files containing this literal are treated the same as empty ones:
/// the secret was provisioned but never filled in.
const UNSET_SENTINEL: &str = "undef";

/// Resolve a setting that may come from the environment or from a secrets file.
///
/// A non-empty direct value always wins. Otherwise the file at `file_path`
/// (if one is configured) supplies the value; a file that is empty or holds
/// the literal `undef` means the deployment forgot to fill the secret in,
/// which is fatal rather than "use a default".
pub fn resolve(value: &str, file_path: &str, what: &'static str) -> Result<Option<String>, SecretError> {
    if !value.is_empty() {
        return Ok(Some(value.to_owned()));
    }
    if file_path.is_empty() {
        return Ok(None);
    }

    let contents = fs::read_to_string(file_path).context(UnreadableSnafu { what, path: file_path })?;
    let contents = contents.trim();
    if contents.is_empty() || contents == UNSET_SENTINEL {
        return NotConfiguredSnafu { what, path: file_path }.fail();
    }
    Ok(Some(contents.to_owned()))
}

/// Like [`resolve`], but the setting is mandatory.
pub fn resolve_required(value: &str, file_path: &str, what: &'static str) -> Result<String, SecretError> {
    match resolve(value, file_path, what)? {
        Some(resolved) => Ok(resolved),
        None => MissingSnafu { what }.fail(),
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum SecretError {
    #[snafu(display("{what} is not configured"))]
    Missing { what: &'static str },

    #[snafu(display("could not read {what} from {path}: {source}"))]
    Unreadable { what: &'static str, path: String, source: std::io::Error },

    #[snafu(display("{what} file {path} is empty or contains \"undef\""))]
    NotConfigured { what: &'static str, path: String },
}
