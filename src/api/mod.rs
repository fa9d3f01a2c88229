//! HTTP API for managing Windows DNS records.
//!
//! Records use the camelCase JSON form described in [`crate::dns`]. An OpenAPI document for
//! every endpoint is served at `/openapi.json`.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when PowerShell runs and the
//!   `DnsServer` module is loaded, HTTP 503 (Service Unavailable) otherwise.
//!
//! ## `/info` (GET)
//!
//!   Returns HTTP 200 (OK) with the service version as a JSON string.
//!
//! ## `/dns?zoneName=<zone>` (GET)
//!
//!   Returns HTTP 200 (OK) with every A, AAAA and CNAME record in the zone, or HTTP 400 (Bad
//!   Request) if the records couldn't be read. `zoneName` defaults to
//!   [`DnsOptions::default_zone`][crate::config::DnsOptions::default_zone].
//!
//! ## `/dns/{hostName}?zoneName=<zone>` (GET)
//!
//!   Returns HTTP 200 (OK) with the records named `hostName`, or HTTP 404 (Not Found). A failed
//!   lookup is indistinguishable from a host without records.
//!
//! ## `/dns` (POST)
//!
//!   Expects a record as the JSON request body:
//!
//!   ```json
//!   { "zoneName": "example.com", "hostName": "www", "recordType": "A", "data": "10.0.0.5" }
//!   ```
//!
//!   Creates the record unless an identical one exists. Either way returns HTTP 201 (Created),
//!   the record, and a `Location` header of the form `/dns/www?zoneName=example.com`. An empty
//!   `zoneName` selects the default zone.
//!
//! ## `/dns/bulk` (POST)
//!
//!   Expects `{ "records": [ ... ] }`. Records are created in order. The first invalid record
//!   ends the request with its validation error. Returns HTTP 201 (Created) with the records
//!   that were created, or HTTP 400 (Bad Request) if there were none.
//!
//! ## `/dns` (DELETE)
//!
//!   Expects a record as the JSON request body and deletes the records matching it exactly.
//!   Returns HTTP 202 (Accepted), or HTTP 400 (Bad Request) if nothing was deleted.
//!
//! # Validation
//!
//! Invalid records are rejected with HTTP 400 (Bad Request) before any command runs:
//!
//! ```json
//! {
//!   "title": "one or more validation errors occurred",
//!   "status": 400,
//!   "errors": { "data": [ "'10.0.0' is not an IPv4 address." ] }
//! }
//! ```
//!
//! # Access Control
//!
//! When [`Config::acl`][crate::config::Config::acl] lists networks, `POST` and `DELETE`
//! requests from any other source address get HTTP 403 (Forbidden).

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
