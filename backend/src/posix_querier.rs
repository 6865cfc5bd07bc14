//! `ps`-based process lookup with best-effort enrichment for POSIX hosts.

use crate::encoding;
use crate::process_info::{data_row, ProcessQuerier};
use crate::tool_runner::{SystemRunner, ToolRunner};
use crate::types::{ProcError, ProcessInfo, Probe, Result};
use std::path::PathBuf;
use tracing::trace;

const PS_COLUMNS: &str = "pid,%cpu,%mem,state,user,comm";

/// Queries processes with `ps` and enriches them from `ps`, `lsof` and `/proc`.
#[derive(Debug, Default, Clone)]
pub struct PosixQuerier<R = SystemRunner> {
    runner: R,
}

impl PosixQuerier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: ToolRunner> PosixQuerier<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Per-thread rows from `ps -T`, header dropped, blank lines skipped.
    pub fn threads(&self, pid: u32) -> Probe<Vec<String>> {
        let pid = pid.to_string();
        self.text_of("ps", &["-T", "-p", &pid])
            .map(|text| {
                text.lines()
                    .skip(1)
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .into()
    }

    /// Raw contents of `/proc/<pid>/io`. Absent outside Linux.
    pub fn io_stats(&self, pid: u32) -> Probe<String> {
        let path = PathBuf::from(format!("/proc/{}/io", pid));
        self.runner.read_to_string(&path).into()
    }

    pub fn start_time(&self, pid: u32) -> Probe<String> {
        let pid = pid.to_string();
        self.text_of("ps", &["-p", &pid, "-o", "lstart="])
            .map(|text| text.trim().to_string())
            .into()
    }

    pub fn parent_pid(&self, pid: u32) -> Probe<u32> {
        let pid = pid.to_string();
        match self.text_of("ps", &["-o", "ppid=", "-p", &pid]) {
            Ok(text) => text.trim().parse::<u32>().into(),
            Err(_) => Probe::Absent,
        }
    }

    /// Raw `lsof -p <pid> -i` listing.
    pub fn network_connections(&self, pid: u32) -> Probe<String> {
        let pid = pid.to_string();
        self.text_of("lsof", &["-p", &pid, "-i"]).into()
    }

    /// Runs every enrichment lookup and stores whatever was found.
    ///
    /// Each lookup runs even when an earlier one failed; a failed lookup
    /// leaves its field at the zero value.
    pub fn enrich(&self, info: &mut ProcessInfo) {
        let pid = info.pid;

        let threads = self.threads(pid);
        let io_stats = self.io_stats(pid);
        let start_time = self.start_time(pid);
        let parent_pid = self.parent_pid(pid);
        let network_connections = self.network_connections(pid);

        trace!(
            "Enrichment for PID {}: threads={} io={} start={} ppid={} net={}",
            pid,
            threads.is_found(),
            io_stats.is_found(),
            start_time.is_found(),
            parent_pid.is_found(),
            network_connections.is_found(),
        );

        info.threads = threads.into_value();
        info.io_stats = io_stats.into_value();
        info.start_time = start_time.into_value();
        info.parent_pid = parent_pid.into_value();
        info.network_connections = network_connections.into_value();
    }

    fn text_of(&self, program: &str, args: &[&str]) -> Result<String> {
        self.runner
            .output(program, args)
            .map(|raw| encoding::decode(&raw))
    }
}

impl<R: ToolRunner> ProcessQuerier for PosixQuerier<R> {
    fn primary_query(&self, pid: u32) -> Result<Vec<u8>> {
        let pid = pid.to_string();
        self.runner.output("ps", &["-p", &pid, "-o", PS_COLUMNS])
    }

    fn parse(&self, raw: &[u8], pid: u32) -> Result<ProcessInfo> {
        let text = encoding::decode_lossy(raw);
        let row = data_row(&text, pid)?;

        // PID %CPU %MEM S USER COMMAND; the echoed PID is not used.
        let fields: Vec<&str> = row.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(ProcError::UnexpectedFormat { tool: "ps" });
        }

        Ok(ProcessInfo {
            pid,
            cpu: fields[1].to_string(),
            memory: fields[2].to_string(),
            state: fields[3].to_string(),
            user: fields[4].to_string(),
            cmd: fields[5].to_string(),
            ..Default::default()
        })
    }
}
