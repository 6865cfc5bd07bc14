//! Data types and error definitions for process inspection and command execution.

use serde::Serialize;
use std::io;
use thiserror::Error;

/// Snapshot of one process at observation time.
///
/// The primary fields (`pid` through `cmd`) come from the platform listing
/// tool and are present as a unit. The remaining fields are filled in by
/// best-effort enrichment on POSIX hosts and stay at their zero value when a
/// lookup fails or the host is Windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    /// `"N/A"` on Windows.
    pub cpu: String,
    pub memory: String,
    pub state: String,
    /// `"N/A"` on Windows.
    pub user: String,
    pub cmd: String,
    pub threads: Vec<String>,
    pub io_stats: String,
    pub start_time: String,
    pub parent_pid: u32,
    pub network_connections: String,
}

/// Outcome of a single best-effort lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    Absent,
}

impl<T: Default> Probe<T> {
    /// The found value, or the zero value of `T` when the lookup failed.
    pub fn into_value(self) -> T {
        match self {
            Probe::Found(value) => value,
            Probe::Absent => T::default(),
        }
    }
}

impl<T> Probe<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found(_))
    }
}

impl<T, E> From<std::result::Result<T, E>> for Probe<T> {
    fn from(res: std::result::Result<T, E>) -> Self {
        match res {
            Ok(value) => Probe::Found(value),
            Err(_) => Probe::Absent,
        }
    }
}

/// Errors that can occur while running commands or inspecting processes.
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {}", exit_code_label(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        /// Decoded error stream, empty when the bytes were not decodable.
        stderr: String,
    },
    #[error("no process found with PID {0}")]
    NotFound(u32),
    #[error("unexpected {tool} output format")]
    UnexpectedFormat { tool: &'static str },
}

impl ProcError {
    /// Decoded stderr of a failed command, if this error carries one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ProcError::NonZeroExit { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ProcError>;
