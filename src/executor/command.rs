use std::collections::BTreeMap;
use std::fmt;

/// Prefix of the environment variables that carry [`PsCommand`] parameters into PowerShell.
pub const PARAM_ENV_PREFIX: &str = "DNSAPI_P_";

/// The PowerShell expression that reads parameter `name` inside a [`PsCommand`] script.
pub fn param_ref(name: &str) -> String {
    format!("$env:{PARAM_ENV_PREFIX}{name}")
}

/// A PowerShell script together with the values it operates on.
///
/// Values are never spliced into the script text. The script refers to each parameter through
/// [`param_ref`] and the executor hands the values to the process as environment variables,
/// so a host name like `www"; Remove-Item C:\ -Recurse; "` is only ever data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsCommand {
    script: String,
    params: BTreeMap<&'static str, String>,
}

impl PsCommand {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            params: BTreeMap::default(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.insert(name, value.into());
        self
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The `(variable, value)` pairs to place in the environment of the executing process.
    pub fn env_vars(&self) -> impl Iterator<Item = (String, &str)> {
        self.params
            .iter()
            .map(|(name, value)| (format!("{PARAM_ENV_PREFIX}{name}"), value.as_str()))
    }
}

impl fmt::Display for PsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.script)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(name, value)| format!("{name}={value:?}"))
                .collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_ref() {
        assert_eq!(param_ref("ZoneName"), "$env:DNSAPI_P_ZoneName");
    }

    #[test]
    fn test_env_vars() {
        let cmd = PsCommand::new("Get-Thing -Name $env:DNSAPI_P_Name")
            .with_param("Name", "www")
            .with_param("ZoneName", "example.com");
        let vars: Vec<(String, &str)> = cmd.env_vars().collect();
        assert_eq!(
            vars,
            vec![
                ("DNSAPI_P_Name".to_string(), "www"),
                ("DNSAPI_P_ZoneName".to_string(), "example.com"),
            ]
        );
        assert_eq!(cmd.param("Name"), Some("www"));
        assert_eq!(cmd.param("Data"), None);
    }

    #[test]
    fn test_display() {
        let cmd = PsCommand::new("Get-Thing").with_param("Name", "w\"w");
        assert_eq!(cmd.to_string(), "Get-Thing [Name=\"w\\\"w\"]");
        assert_eq!(PsCommand::new("Get-Thing").to_string(), "Get-Thing");
    }
}
