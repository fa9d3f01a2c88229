//! A [`CommandExecutor`][super::CommandExecutor] that runs each command in its own PowerShell
//! process.
//!
//! The script is wrapped in a session preamble (stop on the first error, import the configured
//! modules) and passed with `-EncodedCommand`. Parameters travel as environment variables. A
//! command that errors exits non-zero with the error message as the first line of stderr. A
//! command that outlives the configured timeout is killed.
use crate::config::PowershellOptions;
use crate::error::Error;
use crate::executor::{CommandExecutor, PsCommand, ResultObject};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

const POWERSHELL_ARGS: [&str; 6] = [
    "-NoLogo",
    "-NoProfile",
    "-NonInteractive",
    "-ExecutionPolicy",
    "Bypass",
    "-EncodedCommand",
];

#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct PowershellExecutor {
    program: String,
    modules: Vec<String>,
    timeout: Duration,
}

impl PowershellExecutor {
    pub fn new(opts: &PowershellOptions) -> Self {
        Self {
            program: opts.program.clone(),
            modules: opts.modules.clone(),
            timeout: opts.command_timeout,
        }
    }

    fn session_script(&self, body: &str) -> String {
        let mut script = String::from(
            "$ErrorActionPreference = 'Stop'\n\
             $ProgressPreference = 'SilentlyContinue'\n\
             $WarningPreference = 'SilentlyContinue'\n\
             [Console]::OutputEncoding = [System.Text.Encoding]::UTF8\n\
             try {\n",
        );
        for module in &self.modules {
            script.push_str(&format!("Import-Module -Name {}\n", quote(module)));
        }
        script.push_str(body);
        script.push_str(
            "\n} catch {\n\
             [Console]::Error.WriteLine($_.Exception.Message)\n\
             exit 1\n\
             }\n",
        );
        script
    }

    async fn run(&self, body: &str, command: &PsCommand) -> Result<Output, Error> {
        let encoded = encode_command(&self.session_script(body));
        let child = Command::new(&self.program)
            .args(POWERSHELL_ARGS)
            .arg(encoded)
            .envs(command.env_vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Error::Spawn)?;

        // Dropping the child on timeout kills the process.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::CommandTimeout(self.timeout))?
            .map_err(Error::Spawn)?;

        if !output.status.success() {
            return Err(Error::CommandFailed(
                output.status,
                first_error_line(&output.stderr),
            ));
        }
        Ok(output)
    }
}

#[async_trait::async_trait]
impl CommandExecutor for PowershellExecutor {
    async fn execute_command(&self, command: &PsCommand) -> bool {
        tracing::info!("executing PowerShell command: {command}");
        match self.run(command.script(), command).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!("error executing command {command}: {err}");
                false
            }
        }
    }

    async fn execute_command_and_get_pipeline(
        &self,
        command: &PsCommand,
    ) -> Result<Vec<ResultObject>, Error> {
        tracing::info!("executing PowerShell command: {command}");
        let body = format!(
            "ConvertTo-Json -Compress -Depth 4 -InputObject @(\n{}\n)",
            command.script()
        );
        let output = self.run(&body, command).await.map_err(|err| {
            tracing::error!("error executing command {command}: {err}");
            err
        })?;
        parse_pipeline(&output.stdout)
    }
}

/// Base64 of the UTF-16LE script, as `-EncodedCommand` expects.
fn encode_command(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}

/// A PowerShell single-quoted string literal.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn first_error_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("#< CLIXML"))
        .unwrap_or("unknown error")
        .to_string()
}

fn parse_pipeline(stdout: &[u8]) -> Result<Vec<ResultObject>, Error> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Ok(Vec::default());
    }
    let objects = match serde_json::from_str(text).map_err(Error::InvalidOutput)? {
        Value::Array(items) => items.into_iter().map(ResultObject::from).collect(),
        Value::Null => Vec::default(),
        other => vec![ResultObject::from(other)],
    };
    Ok(objects)
}
