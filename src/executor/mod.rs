//! Execution of commands against the Windows DNS Server PowerShell module.
//!
//! Every interaction with the DNS server goes through a [`CommandExecutor`]. The executor takes
//! a [`PsCommand`], a fixed script plus named parameters, and either reports whether it ran
//! cleanly ([`CommandExecutor::execute_command`]) or returns the objects the script wrote to its
//! output pipeline ([`CommandExecutor::execute_command_and_get_pipeline`]).
//!
//! [`powershell::PowershellExecutor`] is the production implementation. It starts a fresh
//! PowerShell process for each command, so no session state is shared between calls.

use crate::error::Error;
use serde_json::Value;
use std::sync::Arc;

mod command;
#[cfg(test)]
pub(crate) mod fake;
pub mod powershell;

pub use command::{param_ref, PsCommand, PARAM_ENV_PREFIX};
#[allow(clippy::module_name_repetitions)]
pub use powershell::PowershellExecutor;

/// `DynExecutor` is a type alias for a [`CommandExecutor`] shared by every request handler.
#[allow(clippy::module_name_repetitions)]
pub type DynExecutor = Arc<dyn CommandExecutor + Send + Sync>;

/// An async trait describing a runner for [`PsCommand`]s.
#[async_trait::async_trait]
#[allow(clippy::module_name_repetitions)]
pub trait CommandExecutor {
    /// Run the command, returning `true` if it completed without an error. Errors are logged,
    /// never returned.
    async fn execute_command(&self, command: &PsCommand) -> bool;

    /// Run the command and return the objects it produced, in pipeline order.
    async fn execute_command_and_get_pipeline(
        &self,
        command: &PsCommand,
    ) -> Result<Vec<ResultObject>, Error>;
}

/// One loosely typed object from a command's output pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultObject(Value);

impl ResultObject {
    /// Text of the named property, or `None` if it's absent or null.
    pub fn property(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }
}

impl From<Value> for ResultObject {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property() {
        let obj = ResultObject::from(json!({
            "HostName": "www",
            "RecordType": "A",
            "IPv4Address": null,
            "Weight": 10,
        }));
        assert_eq!(obj.property("HostName").as_deref(), Some("www"));
        assert_eq!(obj.property("IPv4Address"), None);
        assert_eq!(obj.property("Missing"), None);
        assert_eq!(obj.property("Weight").as_deref(), Some("10"));
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(ResultObject::from(json!(true)).as_bool(), Some(true));
        assert_eq!(ResultObject::from(json!({"ok": true})).as_bool(), None);
    }
}
