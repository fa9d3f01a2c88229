use crate::error::Error;
use ipnetwork::IpNetwork;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

const ENV_DEFAULT_ZONE: &str = "WINDNS_DEFAULT_ZONE";
const ENV_DNS_SERVER_NAME: &str = "WINDNS_DNS_SERVER_NAME";
const ENV_API_BIND_ADDR: &str = "WINDNS_API_BIND_ADDR";

/// Lookup, add and re-read of a single create.
pub const MAX_COMMANDS_PER_REQUEST: u32 = 3;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_timeout")]
    pub api_timeout: Duration,
    #[serde(default)]
    pub dns: DnsOptions,
    #[serde(default)]
    pub powershell: PowershellOptions,
    /// Networks allowed to create and delete records. Empty means unrestricted.
    #[serde(default)]
    pub acl: Vec<IpNetwork>,
}

/// Settings consumed by the [`RecordService`][crate::dns::RecordService].
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DnsOptions {
    /// Zone used when a request leaves `zoneName` empty.
    #[serde(default = "default_zone")]
    pub default_zone: String,
    /// Target server for every command. Unset or empty means the local machine.
    #[serde(default)]
    pub dns_server_name: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct PowershellOptions {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
    /// Limit for a single command. A create runs up to three commands in a row, so this should
    /// stay below a third of [`Config::api_timeout`].
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_command_timeout")]
    pub command_timeout: Duration,
}

fn default_api_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_zone() -> String {
    "example.com".to_string()
}

fn default_program() -> String {
    "powershell.exe".to_string()
}

fn default_modules() -> Vec<String> {
    vec!["DnsServer".to_string()]
}

impl Default for DnsOptions {
    fn default() -> Self {
        Self {
            default_zone: default_zone(),
            dns_server_name: None,
        }
    }
}

impl Default for PowershellOptions {
    fn default() -> Self {
        Self {
            program: default_program(),
            modules: default_modules(),
            command_timeout: default_command_timeout(),
        }
    }
}

impl DnsOptions {
    /// The configured server name, or `None` when commands should target the local machine.
    pub fn server_name(&self) -> Option<&str> {
        self.dns_server_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let mut conf: Config = serde_json::from_reader(reader)?;
        conf.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(conf)
    }

    /// Overwrite file settings with any values `lookup` finds for the `WINDNS_*` keys.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(zone) = lookup(ENV_DEFAULT_ZONE) {
            self.dns.default_zone = zone;
        }
        if let Some(server) = lookup(ENV_DNS_SERVER_NAME) {
            self.dns.dns_server_name = Some(server);
        }
        if let Some(addr) = lookup(ENV_API_BIND_ADDR) {
            self.api_bind_addr = addr
                .parse()
                .map_err(|_| Error::InvalidEnvOverride(ENV_API_BIND_ADDR, addr))?;
        }
        Ok(())
    }

    /// Whether the longest request, a create running [`MAX_COMMANDS_PER_REQUEST`] commands,
    /// finishes before the HTTP timeout answers for it.
    pub fn command_timeout_fits(&self) -> bool {
        self.powershell.command_timeout * MAX_COMMANDS_PER_REQUEST < self.api_timeout
    }

    pub fn update_permitted(&self, source_ip: IpAddr) -> bool {
        self.acl.is_empty()
            || self
                .acl
                .iter()
                .any(|allowed_network| allowed_network.contains(source_ip))
    }
}
