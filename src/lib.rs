//! Windows DNS API
//!
//! A small HTTP API for listing, creating, looking up and deleting A, AAAA and CNAME records on
//! a Windows DNS Server. Requests become commands for the [`DnsServer`] PowerShell module, and
//! the objects those commands return become JSON records again.
//!
//! The DNS server is the only store of records. The service keeps no state beyond its
//! [configuration][crate::config::Config].
//!
//! [`DnsServer`]: https://learn.microsoft.com/en-us/powershell/module/dnsserver/
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use dns::{DnsRecord, DnsRecordType, RecordService};
pub use executor::PowershellExecutor;
