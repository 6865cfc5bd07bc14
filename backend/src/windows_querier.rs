//! `tasklist`-based process lookup for Windows hosts.

use crate::encoding;
use crate::process_info::{data_row, ProcessQuerier};
use crate::tool_runner::{SystemRunner, ToolRunner};
use crate::types::{ProcError, ProcessInfo, Result};

const NOT_EXPOSED: &str = "N/A";

/// Queries processes with `tasklist /FO CSV /V`.
///
/// `tasklist` exposes neither CPU usage nor a usable command line, and no
/// enrichment is available on Windows.
#[derive(Debug, Default, Clone)]
pub struct WindowsQuerier<R = SystemRunner> {
    runner: R,
}

impl WindowsQuerier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: ToolRunner> WindowsQuerier<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: ToolRunner> ProcessQuerier for WindowsQuerier<R> {
    fn primary_query(&self, pid: u32) -> Result<Vec<u8>> {
        let filter = format!("PID eq {}", pid);
        self.runner
            .output("tasklist", &["/FI", &filter, "/FO", "CSV", "/V"])
    }

    fn parse(&self, raw: &[u8], pid: u32) -> Result<ProcessInfo> {
        let text = encoding::decode_lossy(raw);
        let row = data_row(&text, pid)?;

        // "Image Name","PID","Session Name","Session#","Mem Usage","Status",
        // "User Name","CPU Time","Window Title"
        let mut fields: Vec<&str> = row.split("\",\"").collect();
        if fields.len() < 9 {
            return Err(ProcError::UnexpectedFormat { tool: "tasklist" });
        }
        // Only the row's outer quotes survive the split.
        let last = fields.len() - 1;
        fields[0] = fields[0].strip_prefix('"').unwrap_or(fields[0]);
        fields[last] = fields[last].strip_suffix('"').unwrap_or(fields[last]);
        let unquote = |field: &str| field.replace("\"\"", "\"");

        Ok(ProcessInfo {
            pid,
            cpu: NOT_EXPOSED.to_string(),
            memory: unquote(fields[4]),
            state: unquote(fields[5]),
            user: NOT_EXPOSED.to_string(),
            cmd: unquote(fields[8]),
            ..Default::default()
        })
    }
}
