use crate::dns::{DnsRecord, DnsRecordType};
use crate::error::{Error, FieldErrors};
use serde::Deserialize;
use serde_json::Value;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use trust_dns_proto::rr::Name;
use utoipa::{IntoParams, ToSchema};

/// Host name Windows DNS uses for the zone apex.
const ZONE_APEX: &str = "@";

#[derive(Deserialize, IntoParams, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub(super) struct ZoneQuery {
    /// Zone to query. The configured default zone when omitted.
    pub zone_name: Option<String>,
}

/// A record as sent by clients, checked with [`RecordRequest::validate`] before use.
#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecordRequest {
    #[schema(example = "example.com")]
    pub zone_name: Option<String>,
    #[schema(example = "www")]
    pub host_name: Option<String>,
    #[schema(value_type = Option<DnsRecordType>)]
    pub record_type: Option<Value>,
    #[schema(example = "10.0.0.5")]
    pub data: Option<String>,
}

#[derive(Deserialize, ToSchema, Debug, Clone, Default)]
pub(super) struct BulkRecordRequest {
    #[serde(default)]
    pub records: Vec<RecordRequest>,
}

#[derive(Default)]
struct Problems(FieldErrors);

impl Problems {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        if value.is_none() {
            self.add(field, format!("'{field}' must not be empty."));
        }
        value.as_deref().map(str::trim)
    }
}

impl RecordRequest {
    /// Check every field, returning the record with normalized data, or an
    /// [`Error::Validation`] listing each failing field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a field is missing or malformed.
    pub fn validate(&self) -> Result<DnsRecord, Error> {
        let mut problems = Problems::default();

        let zone_name = problems.required("zoneName", &self.zone_name);
        if let Some(zone) = zone_name.filter(|z| !z.is_empty()) {
            if let Err(err) = Name::from_str(zone) {
                problems.add("zoneName", format!("'{zone}' is not a valid zone name: {err}"));
            }
        }

        let host_name = problems.required("hostName", &self.host_name);
        match host_name {
            Some("") => problems.add("hostName", "'hostName' must not be empty."),
            Some(host) if host != ZONE_APEX => {
                if let Err(err) = Name::from_str(host) {
                    problems.add("hostName", format!("'{host}' is not a valid host name: {err}"));
                }
            }
            _ => {}
        }

        let record_type = match &self.record_type {
            None | Some(Value::Null) => {
                problems.add("recordType", "'recordType' must not be empty.");
                None
            }
            Some(Value::String(s)) => match s.parse::<DnsRecordType>() {
                Ok(record_type) => Some(record_type),
                Err(err) => {
                    problems.add("recordType", format!("{err}, expected one of A, AAAA, CNAME."));
                    None
                }
            },
            Some(other) => {
                problems.add("recordType", format!("{other} is not a valid record type."));
                None
            }
        };

        let data = match problems.required("data", &self.data) {
            Some("") => {
                problems.add("data", "'data' must not be empty.");
                None
            }
            Some(data) => record_type.and_then(|t| match normalize_data(t, data) {
                Ok(data) => Some(data),
                Err(message) => {
                    problems.add("data", message);
                    None
                }
            }),
            None => None,
        };

        match (zone_name, host_name, record_type, data) {
            (Some(zone), Some(host), Some(record_type), Some(data)) if problems.0.is_empty() => {
                Ok(DnsRecord::new(zone, host, record_type, data))
            }
            _ => Err(Error::Validation(problems.0)),
        }
    }
}

fn normalize_data(record_type: DnsRecordType, data: &str) -> Result<String, String> {
    match record_type {
        DnsRecordType::A => Ipv4Addr::from_str(data)
            .map(|ip| ip.to_string())
            .map_err(|_| format!("'{data}' is not an IPv4 address.")),
        DnsRecordType::AAAA => Ipv6Addr::from_str(data)
            .map(|ip| ip.to_string())
            .map_err(|_| format!("'{data}' is not an IPv6 address.")),
        DnsRecordType::CNAME => Name::from_str(data)
            .map(|_| data.trim_end_matches('.').to_string())
            .map_err(|err| format!("'{data}' is not a valid host name: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> RecordRequest {
        serde_json::from_value(value).unwrap()
    }

    fn field_errors(req: &RecordRequest) -> FieldErrors {
        match req.validate() {
            Err(Error::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_records() {
        let a = request(json!({
            "zoneName": "example.com", "hostName": "www", "recordType": "A", "data": "10.0.0.5"
        }));
        assert_eq!(
            a.validate().unwrap(),
            DnsRecord::new("example.com", "www", DnsRecordType::A, "10.0.0.5")
        );

        let aaaa = request(json!({
            "zoneName": "example.com", "hostName": "v6", "recordType": "AAAA",
            "data": "2001:0db8:0000:0000:0000:0000:0000:0005"
        }));
        assert_eq!(aaaa.validate().unwrap().data, "2001:db8::5");

        let cname = request(json!({
            "zoneName": "", "hostName": "@", "recordType": "cname", "data": "web.example.com."
        }));
        assert_eq!(
            cname.validate().unwrap(),
            DnsRecord::new("", "@", DnsRecordType::CNAME, "web.example.com")
        );
    }

    #[test]
    fn test_missing_fields() {
        let errors = field_errors(&request(json!({})));
        assert_eq!(
            errors.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["data", "hostName", "recordType", "zoneName"]
        );
        assert_eq!(errors["zoneName"], vec!["'zoneName' must not be empty."]);
    }

    #[test]
    fn test_unsupported_record_type() {
        let errors = field_errors(&request(json!({
            "zoneName": "example.com", "hostName": "mail", "recordType": "MX", "data": "10 mx.example.com"
        })));
        assert_eq!(errors.len(), 1);
        assert!(errors["recordType"][0].contains("MX"));

        let errors = field_errors(&request(json!({
            "zoneName": "example.com", "hostName": "www", "recordType": 1, "data": "10.0.0.5"
        })));
        assert!(errors.contains_key("recordType"));
    }

    #[test]
    fn test_data_must_match_type() {
        let errors = field_errors(&request(json!({
            "zoneName": "example.com", "hostName": "www", "recordType": "A", "data": "2001:db8::5"
        })));
        assert_eq!(errors["data"], vec!["'2001:db8::5' is not an IPv4 address."]);

        let errors = field_errors(&request(json!({
            "zoneName": "example.com", "hostName": "www", "recordType": "AAAA", "data": "10.0.0.5"
        })));
        assert_eq!(errors["data"], vec!["'10.0.0.5' is not an IPv6 address."]);
    }

    #[test]
    fn test_bad_host_name() {
        let long_label = "a".repeat(64);
        let errors = field_errors(&request(json!({
            "zoneName": "example.com", "hostName": long_label, "recordType": "A", "data": "10.0.0.5"
        })));
        assert!(errors.contains_key("hostName"));

        let errors = field_errors(&request(json!({
            "zoneName": "example.com", "hostName": "", "recordType": "A", "data": "10.0.0.5"
        })));
        assert_eq!(errors["hostName"], vec!["'hostName' must not be empty."]);
    }

    #[test]
    fn test_bulk_request_defaults() {
        let bulk: BulkRecordRequest = serde_json::from_value(json!({})).unwrap();
        assert!(bulk.records.is_empty());
    }
}
