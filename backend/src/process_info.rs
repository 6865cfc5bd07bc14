//! Single-process lookup: platform query, parsing and enrichment.

use crate::posix_querier::PosixQuerier;
use crate::tool_runner::{SystemRunner, ToolRunner};
use crate::types::{ProcError, ProcessInfo, Result};
use crate::windows_querier::WindowsQuerier;
use tracing::debug;

/// A platform's primary process listing.
pub trait ProcessQuerier {
    /// Runs the listing tool restricted to `pid` and returns its raw output.
    fn primary_query(&self, pid: u32) -> Result<Vec<u8>>;

    /// Turns the listing output into the primary fields of a record.
    fn parse(&self, raw: &[u8], pid: u32) -> Result<ProcessInfo>;

    /// Query followed by parse; either failing aborts the lookup.
    fn query(&self, pid: u32) -> Result<ProcessInfo> {
        let raw = self.primary_query(pid)?;
        self.parse(&raw, pid)
    }
}

/// Second line of a header + row listing.
pub(crate) fn data_row(text: &str, pid: u32) -> Result<&str> {
    text.lines().nth(1).ok_or(ProcError::NotFound(pid))
}

/// Querier for the host platform, chosen once at construction.
#[derive(Debug, Clone)]
pub enum Querier<R = SystemRunner> {
    Posix(PosixQuerier<R>),
    Windows(WindowsQuerier<R>),
}

impl Querier {
    pub fn native() -> Self {
        if cfg!(windows) {
            Querier::Windows(WindowsQuerier::new())
        } else {
            Querier::Posix(PosixQuerier::new())
        }
    }
}

impl Default for Querier {
    fn default() -> Self {
        Self::native()
    }
}

impl<R: ToolRunner> Querier<R> {
    /// Looks up `pid`, enriching the record on POSIX hosts.
    ///
    /// Errors only when the primary listing cannot be obtained or parsed.
    pub fn inspect(&self, pid: u32) -> Result<ProcessInfo> {
        match self {
            Querier::Posix(querier) => {
                let mut info = querier.query(pid)?;
                querier.enrich(&mut info);
                Ok(info)
            }
            Querier::Windows(querier) => querier.query(pid),
        }
    }
}

/// Retrieves a snapshot of process `pid` on the host platform.
pub fn get_process_info(pid: u32) -> Result<ProcessInfo> {
    debug!("Inspecting PID {}", pid);
    Querier::native().inspect(pid)
}
