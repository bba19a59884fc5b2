//! Per-invocation phases and the log a command accumulates while it runs.

use crate::error::{CommandError, MappingWarning};

use diagnostics::*;
use serde::Serialize;
use std::fmt;

/// `Init -> ValidateParams -> BuildStatement -> Execute -> MapResults -> Done`,
/// with any non-terminal phase able to move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Init,
    ValidateParams,
    BuildStatement,
    Execute,
    MapResults,
    Done,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Init, ValidateParams)
                | (ValidateParams, BuildStatement)
                | (BuildStatement, Execute)
                | (Execute, MapResults)
                | (MapResults, Done)
                | (Init | ValidateParams | BuildStatement | Execute | MapResults, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::ValidateParams => "validate-params",
            Phase::BuildStatement => "build-statement",
            Phase::Execute => "execute",
            Phase::MapResults => "map-results",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub phase: Phase,
    pub message: String,
}

/// Overall outcome of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Success,
    Warning,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Status::Success => "SUCCESS",
            Status::Warning => "WARNING",
            Status::Failure => "FAILURE",
        })
    }
}

/// Tracks the phase of one invocation and every problem found along the way.
#[derive(Debug)]
pub struct CommandLog {
    command: String,
    phase: Phase,
    entries: Vec<LogEntry>,
}

impl CommandLog {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            phase: Phase::Init,
            entries: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Moves to `next`. Illegal transitions are ignored and logged; a
    /// terminal phase never changes.
    pub fn advance(&mut self, next: Phase) {
        if self.phase.can_advance_to(next) {
            debug!(
                "{command}: {from} -> {to}",
                command: self.command.as_str(),
                from: self.phase.as_str(),
                to: next.as_str()
            );
            self.phase = next;
        } else {
            warn!(
                "{command}: ignoring transition {from} -> {to}",
                command: self.command.as_str(),
                from: self.phase.as_str(),
                to: next.as_str()
            );
        }
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{command}: {message}", command: self.command.as_str(), message: message.as_str());
        self.push(Severity::Warning, message);
    }

    pub fn warnings(&mut self, warnings: impl IntoIterator<Item = MappingWarning>) {
        for warning in warnings {
            self.warning(warning.to_string());
        }
    }

    /// Records `err` and moves to `Failed`. Coercion failures are recorded
    /// one entry per parameter.
    pub fn fail(&mut self, err: &CommandError) {
        match err {
            CommandError::Coercion { errors } => {
                for e in errors {
                    self.failure(e.to_string());
                }
                self.failure(format!("{err}; not calling the routine"));
            }
            other => self.failure(error_chain(other)),
        }
        self.advance(Phase::Failed);
    }

    fn failure(&mut self, message: String) {
        error!("{command}: {message}", command: self.command.as_str(), message: message.as_str());
        self.push(Severity::Failure, message);
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.entries.push(LogEntry {
            severity,
            phase: self.phase,
            message,
        });
    }

    pub fn finish(mut self) -> CommandReport {
        if !self.phase.is_terminal() {
            self.advance(Phase::Done);
        }
        CommandReport {
            command: self.command,
            phase: self.phase,
            entries: self.entries,
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// The finished log of one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub phase: Phase,
    pub entries: Vec<LogEntry>,
}

impl CommandReport {
    pub fn status(&self) -> Status {
        if self.phase == Phase::Failed
            || self.entries.iter().any(|e| e.severity == Severity::Failure)
        {
            Status::Failure
        } else if self.entries.is_empty() {
            Status::Success
        } else {
            Status::Warning
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }
}
