use crate::config::DnsOptions;
use crate::dns::{DnsRecord, DnsRecordType};
use crate::executor::{param_ref, PsCommand};

pub(crate) const ZONE_NAME: &str = "ZoneName";
pub(crate) const COMPUTER_NAME: &str = "ComputerName";
pub(crate) const HOST_NAME: &str = "Name";
pub(crate) const DATA: &str = "Data";
pub(crate) const MODULE: &str = "Module";

/// Cmdlet prefix shared by every create command.
pub(crate) const ADD_CMDLET_PREFIX: &str = "Add-DnsServerResourceRecord";

const GET_CMDLET: &str = "Get-DnsServerResourceRecord";

const SUPPORTED_TYPES_FILTER: &str =
    "Where-Object { $_.RecordType -in 'A', 'AAAA', 'CNAME' }";

/// Flattens `RecordData` into the properties read by
/// [`record_from_object`][crate::dns::service::record_from_object].
const PROJECTION: &str = "Select-Object HostName, RecordType, \
    @{l='IPv4Address';e={$_.RecordData.IPv4Address.IPAddressToString}}, \
    @{l='IPv6Address';e={$_.RecordData.IPv6Address.IPAddressToString}}, \
    @{l='HostNameAlias';e={$_.RecordData.HostNameAlias}}";

/// The type specific pieces of every command touching one record type.
pub(crate) struct RecordTemplate {
    /// `-RRType` argument of the exact match query.
    rr_type: &'static str,
    /// Appended to [`ADD_CMDLET_PREFIX`] to name the cmdlet creating a record of this type.
    add_suffix: &'static str,
    /// Create parameter holding the data, also the projected property name.
    pub(crate) data_property: &'static str,
    /// Expression reading the data from a raw `Get-DnsServerResourceRecord` object.
    data_expr: &'static str,
}

const A_TEMPLATE: RecordTemplate = RecordTemplate {
    rr_type: "A",
    add_suffix: "A",
    data_property: "IPv4Address",
    data_expr: "$_.RecordData.IPv4Address.IPAddressToString",
};

const AAAA_TEMPLATE: RecordTemplate = RecordTemplate {
    rr_type: "AAAA",
    add_suffix: "AAAA",
    data_property: "IPv6Address",
    data_expr: "$_.RecordData.IPv6Address.IPAddressToString",
};

const CNAME_TEMPLATE: RecordTemplate = RecordTemplate {
    rr_type: "CNAME",
    add_suffix: "CName",
    data_property: "HostNameAlias",
    data_expr: "$_.RecordData.HostNameAlias",
};

impl DnsRecordType {
    pub(crate) fn template(self) -> &'static RecordTemplate {
        match self {
            DnsRecordType::A => &A_TEMPLATE,
            DnsRecordType::AAAA => &AAAA_TEMPLATE,
            DnsRecordType::CNAME => &CNAME_TEMPLATE,
        }
    }
}

/// Builds the [`PsCommand`]s for each record operation against one DNS server.
#[derive(Debug, Clone)]
pub(crate) struct CommandBuilder {
    server: Option<String>,
}

impl CommandBuilder {
    pub(crate) fn new(options: &DnsOptions) -> Self {
        Self {
            server: options.server_name().map(ToString::to_string),
        }
    }

    /// Every A, AAAA and CNAME record in `zone`.
    pub(crate) fn list(&self, zone: &str) -> PsCommand {
        let script = format!(
            "{GET_CMDLET} -ZoneName {}{} | {SUPPORTED_TYPES_FILTER} | {PROJECTION}",
            param_ref(ZONE_NAME),
            self.server_arg(),
        );
        self.bind(PsCommand::new(script).with_param(ZONE_NAME, zone))
    }

    /// The A, AAAA and CNAME records named `host` in `zone`.
    pub(crate) fn by_host_name(&self, zone: &str, host: &str) -> PsCommand {
        let script = format!(
            "{GET_CMDLET} -ZoneName {}{} -Name {} | {SUPPORTED_TYPES_FILTER} | {PROJECTION}",
            param_ref(ZONE_NAME),
            self.server_arg(),
            param_ref(HOST_NAME),
        );
        self.bind(
            PsCommand::new(script)
                .with_param(ZONE_NAME, zone)
                .with_param(HOST_NAME, host),
        )
    }

    /// The records matching `record` exactly, projected for mapping.
    pub(crate) fn find(&self, record: &DnsRecord) -> PsCommand {
        let script = format!("{} | {PROJECTION}", self.find_script(record.record_type));
        self.bind_record(PsCommand::new(script), record)
    }

    pub(crate) fn create(&self, record: &DnsRecord) -> PsCommand {
        let template = record.record_type.template();
        let script = format!(
            "{ADD_CMDLET_PREFIX}{} -Name {} -ZoneName {} -AllowUpdateAny -{} {}{}",
            template.add_suffix,
            param_ref(HOST_NAME),
            param_ref(ZONE_NAME),
            template.data_property,
            param_ref(DATA),
            self.server_arg(),
        );
        self.bind_record(PsCommand::new(script), record)
    }

    /// Removes whatever [`CommandBuilder::find`] matches, failing when it matches nothing.
    pub(crate) fn delete(&self, record: &DnsRecord) -> PsCommand {
        let script = format!(
            "$records = @({})\n\
             if ($records.Count -eq 0) {{ throw 'no matching record' }}\n\
             $records | Remove-DnsServerResourceRecord -ZoneName {}{} -Force",
            self.find_script(record.record_type),
            param_ref(ZONE_NAME),
            self.server_arg(),
        );
        self.bind_record(PsCommand::new(script), record)
    }

    /// Whether `module` is loaded in the session.
    pub(crate) fn module_loaded(module: &str) -> PsCommand {
        let script = format!(
            "[bool](Get-Module -Name {})",
            param_ref(MODULE)
        );
        PsCommand::new(script).with_param(MODULE, module)
    }

    fn find_script(&self, record_type: DnsRecordType) -> String {
        let template = record_type.template();
        format!(
            "{GET_CMDLET} -ZoneName {}{} -Name {} -RRType {} | \
             Where-Object {{ \"$({})\".TrimEnd('.') -eq \"$({})\".TrimEnd('.') }}",
            param_ref(ZONE_NAME),
            self.server_arg(),
            param_ref(HOST_NAME),
            template.rr_type,
            template.data_expr,
            param_ref(DATA),
        )
    }

    fn server_arg(&self) -> String {
        match self.server {
            Some(_) => format!(" -ComputerName {}", param_ref(COMPUTER_NAME)),
            None => String::new(),
        }
    }

    fn bind(&self, command: PsCommand) -> PsCommand {
        match &self.server {
            Some(server) => command.with_param(COMPUTER_NAME, server.as_str()),
            None => command,
        }
    }

    fn bind_record(&self, command: PsCommand, record: &DnsRecord) -> PsCommand {
        self.bind(
            command
                .with_param(ZONE_NAME, record.zone_name.as_str())
                .with_param(HOST_NAME, record.host_name.as_str())
                .with_param(DATA, record.data.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(server: Option<&str>) -> CommandBuilder {
        CommandBuilder::new(&DnsOptions {
            default_zone: "example.com".to_string(),
            dns_server_name: server.map(ToString::to_string),
        })
    }

    fn record(record_type: DnsRecordType, data: &str) -> DnsRecord {
        DnsRecord::new("example.com", "www", record_type, data)
    }

    #[test]
    fn test_list() {
        let cmd = builder(Some("dc01")).list("corp.local");
        assert_eq!(
            cmd.script(),
            "Get-DnsServerResourceRecord -ZoneName $env:DNSAPI_P_ZoneName \
             -ComputerName $env:DNSAPI_P_ComputerName | \
             Where-Object { $_.RecordType -in 'A', 'AAAA', 'CNAME' } | \
             Select-Object HostName, RecordType, \
             @{l='IPv4Address';e={$_.RecordData.IPv4Address.IPAddressToString}}, \
             @{l='IPv6Address';e={$_.RecordData.IPv6Address.IPAddressToString}}, \
             @{l='HostNameAlias';e={$_.RecordData.HostNameAlias}}"
        );
        assert_eq!(cmd.param(ZONE_NAME), Some("corp.local"));
        assert_eq!(cmd.param(COMPUTER_NAME), Some("dc01"));
    }

    #[test]
    fn test_local_server_omits_computer_name() {
        let cmd = builder(None).by_host_name("example.com", "www");
        assert!(!cmd.script().contains("-ComputerName"));
        assert_eq!(cmd.param(COMPUTER_NAME), None);
        assert_eq!(cmd.param(HOST_NAME), Some("www"));
    }

    #[test]
    fn test_find_is_type_specific() {
        let b = builder(None);
        let a = b.find(&record(DnsRecordType::A, "10.0.0.5"));
        assert!(a.script().contains("-RRType A |"));
        assert!(a.script().contains("$_.RecordData.IPv4Address.IPAddressToString"));

        let aaaa = b.find(&record(DnsRecordType::AAAA, "2001:db8::5"));
        assert!(aaaa.script().contains("-RRType AAAA |"));
        assert!(aaaa.script().contains("\"$($_.RecordData.IPv6Address.IPAddressToString)\""));

        let cname = b.find(&record(DnsRecordType::CNAME, "web.example.com"));
        assert!(cname.script().contains("-RRType CNAME |"));
        assert!(cname.script().contains("\"$($_.RecordData.HostNameAlias)\""));
        assert_eq!(cname.param(DATA), Some("web.example.com"));
    }

    #[test]
    fn test_create() {
        let b = builder(Some("dc01"));
        assert_eq!(
            b.create(&record(DnsRecordType::A, "10.0.0.5")).script(),
            "Add-DnsServerResourceRecordA -Name $env:DNSAPI_P_Name \
             -ZoneName $env:DNSAPI_P_ZoneName -AllowUpdateAny \
             -IPv4Address $env:DNSAPI_P_Data -ComputerName $env:DNSAPI_P_ComputerName"
        );
        assert!(b
            .create(&record(DnsRecordType::AAAA, "2001:db8::5"))
            .script()
            .starts_with("Add-DnsServerResourceRecordAAAA "));
        let cname = b.create(&record(DnsRecordType::CNAME, "web.example.com"));
        assert!(cname
            .script()
            .starts_with("Add-DnsServerResourceRecordCName "));
        assert!(cname.script().contains("-HostNameAlias $env:DNSAPI_P_Data"));
    }

    #[test]
    fn test_delete_pipes_find_into_remove() {
        let cmd = builder(None).delete(&record(DnsRecordType::A, "10.0.0.5"));
        let lines: Vec<&str> = cmd.script().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("$records = @(Get-DnsServerResourceRecord "));
        assert!(!lines[0].contains("Select-Object"));
        assert!(lines[1].contains("throw"));
        assert_eq!(
            lines[2],
            "$records | Remove-DnsServerResourceRecord -ZoneName $env:DNSAPI_P_ZoneName -Force"
        );
    }

    #[test]
    fn test_values_stay_out_of_script() {
        let hostile = DnsRecord::new(
            "example.com\"; Remove-Item C:\\ -Recurse; \"",
            "www$(Stop-Computer)",
            DnsRecordType::CNAME,
            "'; exit; '",
        );
        let b = builder(Some("dc01`whoami`"));
        for cmd in [b.find(&hostile), b.create(&hostile), b.delete(&hostile)] {
            assert!(!cmd.script().contains("Remove-Item"));
            assert!(!cmd.script().contains("Stop-Computer"));
            assert!(!cmd.script().contains("exit;"));
            assert!(!cmd.script().contains("whoami"));
            assert_eq!(cmd.param(HOST_NAME), Some("www$(Stop-Computer)"));
        }
    }

    #[test]
    fn test_module_loaded() {
        let cmd = CommandBuilder::module_loaded("DnsServer");
        assert_eq!(
            cmd.script(),
            "[bool](Get-Module -Name $env:DNSAPI_P_Module)"
        );
        assert_eq!(cmd.param(MODULE), Some("DnsServer"));
    }
}
