//! Structured lifecycle logging for workbench commands.
//!
//! Every mutating command logs a start record and then either a success or a
//! failure record, all sharing one correlation id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "netview::events::telemetry";

pub const CMD_ADD_NETWORK: &str = "AddNetwork";
pub const CMD_SET_MAPPING: &str = "SetMapping";
pub const CMD_IMPORT_STYLE: &str = "ImportStyle";
pub const CMD_DELETE_OBJECTS: &str = "DeleteObjects";
pub const CMD_RUN_LAYOUT: &str = "RunLayout";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandLifecycle {
    Start,
    Success,
    Failure,
}

impl fmt::Display for CommandLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "command_start"),
            Self::Success => write!(f, "command_success"),
            Self::Failure => write!(f, "command_failure"),
        }
    }
}

/// An in-progress command. Finish it with [`succeed`](Self::succeed) or
/// [`fail`](Self::fail).
#[derive(Debug)]
pub struct CommandSpan {
    pub command: &'static str,
    pub correlation_id: String,
    started: Instant,
}

impl CommandSpan {
    pub fn start(command: &'static str) -> Self {
        let span = Self {
            command,
            correlation_id: Uuid::new_v4().to_string(),
            started: Instant::now(),
        };
        info!(
            target: TELEMETRY_TARGET,
            command = %span.command,
            correlation_id = %span.correlation_id,
            lifecycle = %CommandLifecycle::Start,
            "command_start"
        );
        span
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn succeed(self) -> CommandLifecycle {
        info!(
            target: TELEMETRY_TARGET,
            command = %self.command,
            correlation_id = %self.correlation_id,
            lifecycle = %CommandLifecycle::Success,
            duration_ms = self.elapsed_ms(),
            "command_success"
        );
        CommandLifecycle::Success
    }

    pub fn fail(self, reason: &dyn fmt::Display) -> CommandLifecycle {
        error!(
            target: TELEMETRY_TARGET,
            command = %self.command,
            correlation_id = %self.correlation_id,
            lifecycle = %CommandLifecycle::Failure,
            error = %reason,
            duration_ms = self.elapsed_ms(),
            "command_failure"
        );
        CommandLifecycle::Failure
    }

    /// Log the outcome of `result` and pass it through unchanged.
    pub fn finish<T, E: fmt::Display>(self, result: Result<T, E>) -> Result<T, E> {
        match &result {
            Ok(_) => {
                self.succeed();
            }
            Err(err) => {
                self.fail(err);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_uuid_like() {
        let span = CommandSpan::start(CMD_SET_MAPPING);
        assert_eq!(span.correlation_id.len(), 36);
        assert_eq!(span.succeed(), CommandLifecycle::Success);
    }

    #[test]
    fn finish_passes_result_through() {
        let ok: Result<u8, String> = CommandSpan::start(CMD_RUN_LAYOUT).finish(Ok(3));
        assert_eq!(ok, Ok(3));

        let err: Result<u8, String> =
            CommandSpan::start(CMD_DELETE_OBJECTS).finish(Err("boom".to_string()));
        assert_eq!(err, Err("boom".to_string()));
    }

    #[test]
    fn lifecycle_display_names() {
        assert_eq!(CommandLifecycle::Failure.to_string(), "command_failure");
    }
}
