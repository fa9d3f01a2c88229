use crate::config::DnsOptions;
use crate::dns::commands::CommandBuilder;
use crate::dns::{DnsRecord, DnsRecordType};
use crate::error::Error;
use crate::executor::{DynExecutor, ResultObject};

const DNS_SERVER_MODULE: &str = "DnsServer";

/// Record CRUD on top of a [`CommandExecutor`][crate::executor::CommandExecutor].
///
/// Failures never escape as errors. They are logged and reported as `None`, `false`, or an
/// empty list, which the [HTTP API][crate::api] turns into a status code.
#[derive(Clone)]
pub struct RecordService {
    options: DnsOptions,
    commands: CommandBuilder,
    executor: DynExecutor,
}

impl RecordService {
    pub fn new(options: DnsOptions, executor: DynExecutor) -> Self {
        let commands = CommandBuilder::new(&options);
        Self {
            options,
            commands,
            executor,
        }
    }

    /// `zone`, or the default zone when `zone` is missing or blank.
    pub fn resolve_zone<'a>(&'a self, zone: Option<&'a str>) -> &'a str {
        match zone.map(str::trim) {
            Some(zone) if !zone.is_empty() => zone,
            _ => &self.options.default_zone,
        }
    }

    fn with_resolved_zone(&self, record: &DnsRecord) -> DnsRecord {
        DnsRecord {
            zone_name: self.resolve_zone(Some(record.zone_name.as_str())).to_string(),
            ..record.clone()
        }
    }

    /// All A, AAAA and CNAME records of the zone. `None` if the query failed.
    pub async fn list_records(&self, zone_name: Option<&str>) -> Option<Vec<DnsRecord>> {
        let zone = self.resolve_zone(zone_name);
        let command = self.commands.list(zone);
        match self.executor.execute_command_and_get_pipeline(&command).await {
            Ok(objects) => {
                tracing::debug!("found {} objects", objects.len());
                Some(map_objects(zone, &objects))
            }
            Err(err) => {
                tracing::error!("error retrieving DNS records for zone \"{zone}\": {err}");
                None
            }
        }
    }

    /// The records named `host_name`. `None` both when the query failed and when it found
    /// nothing.
    pub async fn get_records_by_hostname(
        &self,
        host_name: &str,
        zone_name: Option<&str>,
    ) -> Option<Vec<DnsRecord>> {
        let zone = self.resolve_zone(zone_name);
        let command = self.commands.by_host_name(zone, host_name);
        match self.executor.execute_command_and_get_pipeline(&command).await {
            Ok(objects) if objects.is_empty() => None,
            Ok(objects) => {
                tracing::debug!("found {} objects", objects.len());
                Some(map_objects(zone, &objects))
            }
            Err(err) => {
                tracing::error!("error retrieving DNS record \"{host_name}\" in \"{zone}\": {err}");
                None
            }
        }
    }

    /// The record matching zone, host name, type and data, if it exists.
    pub async fn get_record(&self, record: &DnsRecord) -> Option<DnsRecord> {
        let record = self.with_resolved_zone(record);
        let command = self.commands.find(&record);
        match self.executor.execute_command_and_get_pipeline(&command).await {
            Ok(objects) => {
                tracing::debug!("found {} objects", objects.len());
                objects
                    .first()
                    .map(|obj| record_from_object(&record.zone_name, obj))
            }
            Err(err) => {
                tracing::debug!(
                    "no {} record \"{}\" in \"{}\": {err}",
                    record.record_type,
                    record.host_name,
                    record.zone_name
                );
                None
            }
        }
    }

    /// Create `record` unless an identical one exists, returning the record as the DNS server
    /// now holds it. `None` if creation failed.
    pub async fn create_record(&self, record: &DnsRecord) -> Option<DnsRecord> {
        let record = self.with_resolved_zone(record);
        if let Some(existing) = self.get_record(&record).await {
            tracing::debug!(
                "{} record \"{}\" in \"{}\" already exists",
                record.record_type,
                record.host_name,
                record.zone_name
            );
            return Some(existing);
        }

        let command = self.commands.create(&record);
        if !self.executor.execute_command(&command).await {
            tracing::warn!(
                "could not create {} record \"{}\" in \"{}\"",
                record.record_type,
                record.host_name,
                record.zone_name
            );
            return None;
        }
        self.get_record(&record).await
    }

    /// Delete every record matching `record` exactly. `false` if nothing matched or the command
    /// failed.
    pub async fn delete_record(&self, record: &DnsRecord) -> bool {
        let record = self.with_resolved_zone(record);
        let command = self.commands.delete(&record);
        self.executor.execute_command(&command).await
    }

    /// Check that the `DnsServer` module is loaded in a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unhealthy`] if PowerShell fails or the module isn't loaded.
    pub async fn check_health(&self) -> Result<(), Error> {
        let command = CommandBuilder::module_loaded(DNS_SERVER_MODULE);
        let objects = self
            .executor
            .execute_command_and_get_pipeline(&command)
            .await
            .map_err(|err| Error::Unhealthy(format!("PowerShell error: {err}")))?;
        match objects.first().and_then(ResultObject::as_bool) {
            Some(true) => Ok(()),
            _ => Err(Error::Unhealthy(format!(
                "{DNS_SERVER_MODULE} module not found"
            ))),
        }
    }
}

fn map_objects(zone: &str, objects: &[ResultObject]) -> Vec<DnsRecord> {
    objects
        .iter()
        .map(|obj| record_from_object(zone, obj))
        .collect()
}

/// Map one projected `Get-DnsServerResourceRecord` object to a [`DnsRecord`].
///
/// An unrecognised `RecordType` is read as `A`. Absent values map to empty strings.
pub(crate) fn record_from_object(zone: &str, obj: &ResultObject) -> DnsRecord {
    let record_type = obj
        .property("RecordType")
        .unwrap_or_default()
        .parse::<DnsRecordType>()
        .unwrap_or_else(|err| {
            tracing::warn!("{err}, treating as A");
            DnsRecordType::A
        });
    let mut data = obj
        .property(record_type.template().data_property)
        .unwrap_or_default();
    if record_type == DnsRecordType::CNAME {
        data = data.trim_end_matches('.').to_string();
    }
    DnsRecord {
        zone_name: zone.to_string(),
        host_name: obj.property("HostName").unwrap_or_default(),
        record_type,
        data,
    }
}
