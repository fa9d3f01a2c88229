//! Error types.

use axum::extract::rejection::JsonRejection;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::process::ExitStatus;
use std::time::Duration;

/// Field name to validation messages, in the shape returned to HTTP clients.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Error enumerates the possible Windows DNS API error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a client outside every [`Config::acl`][`crate::config::Config::acl`]
    /// network calls a mutating endpoint.
    #[error("IP {0} is not authorized to modify DNS records")]
    AuthForbidden(IpAddr),

    /// Returned when clients send a body that isn't valid JSON.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Returned when a record in a request body fails validation. Carries the failing fields.
    #[error("one or more validation errors occurred")]
    Validation(FieldErrors),

    /// Returned when the records of a zone couldn't be listed.
    #[error("could not list records for zone \"{0}\"")]
    ListFailed(String),

    /// Returned when a host name lookup produced no records, or failed.
    #[error("no records found for \"{0}\"")]
    NotFound(String),

    /// Returned when the record could not be created.
    #[error("could not create {0} record \"{1}\"")]
    CreateFailed(String, String),

    /// Returned when no record was created by a bulk request.
    #[error("no records were created")]
    BulkCreateFailed,

    /// Returned when the record could not be deleted.
    #[error("could not delete {0} record \"{1}\"")]
    DeleteFailed(String, String),

    /// Returned by the health check when the DNS management tooling isn't usable.
    #[error("unhealthy: {0}")]
    Unhealthy(String),

    /// Returned when the PowerShell process can't be started or awaited.
    #[error("could not run PowerShell")]
    Spawn(#[source] std::io::Error),

    /// Returned when a command runs longer than
    /// [`PowershellOptions::command_timeout`][`crate::config::PowershellOptions::command_timeout`].
    #[error("command timed out after {0:?}")]
    CommandTimeout(Duration),

    /// Returned when PowerShell reports an error for a command. Holds the first error line.
    #[error("command failed ({0}): {1}")]
    CommandFailed(ExitStatus, String),

    /// Returned when a pipeline command writes something other than JSON to stdout.
    #[error("invalid command output")]
    InvalidOutput(#[source] serde_json::Error),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [loading a `Config`][crate::config::Config::try_from_file] fails due to
    /// invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when an environment override can't be parsed.
    #[error("invalid value for {0}: \"{1}\"")]
    InvalidEnvOverride(&'static str, String),
}
