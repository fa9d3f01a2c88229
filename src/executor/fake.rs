//! A scripted [`CommandExecutor`] for tests.
//!
//! Pipeline responses and execute outcomes are queued up front and handed out in order. Every
//! command received is recorded for later inspection. An exhausted pipeline queue answers with no
//! objects, an exhausted outcome queue answers `true`.
use crate::error::Error;
use crate::executor::{CommandExecutor, PsCommand, ResultObject};
use serde_json::Value;
use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct FakeExecutor {
    pipelines: Mutex<VecDeque<Option<Vec<ResultObject>>>>,
    outcomes: Mutex<VecDeque<bool>>,
    commands: Mutex<Vec<PsCommand>>,
}

impl FakeExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a successful pipeline producing `objects`.
    pub(crate) fn with_pipeline(self, objects: Vec<Value>) -> Self {
        self.pipelines
            .lock()
            .unwrap()
            .push_back(Some(objects.into_iter().map(ResultObject::from).collect()));
        self
    }

    /// Queue a pipeline that fails.
    pub(crate) fn with_pipeline_error(self) -> Self {
        self.pipelines.lock().unwrap().push_back(None);
        self
    }

    pub(crate) fn with_outcome(self, success: bool) -> Self {
        self.outcomes.lock().unwrap().push_back(success);
        self
    }

    pub(crate) fn commands(&self) -> Vec<PsCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Commands whose script starts with `prefix`.
    pub(crate) fn count_starting_with(&self, prefix: &str) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|cmd| cmd.script().starts_with(prefix))
            .count()
    }
}

#[async_trait::async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute_command(&self, command: &PsCommand) -> bool {
        self.commands.lock().unwrap().push(command.clone());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(true)
    }

    async fn execute_command_and_get_pipeline(
        &self,
        command: &PsCommand,
    ) -> Result<Vec<ResultObject>, Error> {
        self.commands.lock().unwrap().push(command.clone());
        match self.pipelines.lock().unwrap().pop_front() {
            Some(Some(objects)) => Ok(objects),
            Some(None) => Err(Error::Spawn(io::Error::new(
                io::ErrorKind::Other,
                "scripted failure",
            ))),
            None => Ok(Vec::default()),
        }
    }
}
