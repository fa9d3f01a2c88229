//! DNS resource records and the service that manages them.
//!
//! # Records
//!
//! A [`DnsRecord`] names a zone, a host within it, a [`DnsRecordType`] and the type's data:
//!
//! | type    | data                    |
//! |---------|-------------------------|
//! | `A`     | an IPv4 address literal |
//! | `AAAA`  | an IPv6 address literal |
//! | `CNAME` | the aliased host name   |
//!
//! Records serialize as camelCase JSON:
//!
//! ```json
//! { "zoneName": "example.com", "hostName": "www", "recordType": "A", "data": "10.0.0.5" }
//! ```
//!
//! # Record Service
//!
//! [`RecordService`] turns list, lookup, create and delete operations into
//! [`PsCommand`][crate::executor::PsCommand]s for the `DnsServer` PowerShell module, runs them
//! with a [`CommandExecutor`][crate::executor::CommandExecutor] and maps the output objects
//! back to [`DnsRecord`]s. The DNS server stays the only store of records. Nothing is cached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub(crate) mod commands;
pub mod service;

pub use service::RecordService;

/// The record types this service manages.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum DnsRecordType {
    A,
    AAAA,
    CNAME,
}

impl DnsRecordType {
    pub const ALL: [DnsRecordType; 3] = [DnsRecordType::A, DnsRecordType::AAAA, DnsRecordType::CNAME];

    pub fn as_str(self) -> &'static str {
        match self {
            DnsRecordType::A => "A",
            DnsRecordType::AAAA => "AAAA",
            DnsRecordType::CNAME => "CNAME",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unsupported record type \"{0}\"")]
pub struct UnsupportedRecordType(pub String);

impl FromStr for DnsRecordType {
    type Err = UnsupportedRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedRecordType(s.to_string()))
    }
}

/// One DNS resource record.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    #[schema(example = "example.com")]
    pub zone_name: String,
    #[schema(example = "www")]
    pub host_name: String,
    pub record_type: DnsRecordType,
    #[schema(example = "10.0.0.5")]
    pub data: String,
}

impl DnsRecord {
    pub fn new(
        zone_name: impl Into<String>,
        host_name: impl Into<String>,
        record_type: DnsRecordType,
        data: impl Into<String>,
    ) -> Self {
        Self {
            zone_name: zone_name.into(),
            host_name: host_name.into(),
            record_type,
            data: data.into(),
        }
    }
}
