//! UI-agnostic process introspection and shell command execution.
//!
//! Provides a shell command runner that decodes UTF-8 or GBK output, and a
//! single-process inspector built on the platform listing tools (`ps` and
//! friends on POSIX, `tasklist` on Windows).

mod encoding;
mod exec;
mod posix_querier;
mod process_info;
mod tool_runner;
mod types;
mod windows_querier;

pub use encoding::{decode, decode_as, decode_lossy, detect, is_gbk, Charset};
pub use exec::{exec, exec_command, shell_command, CommandOutput, ExecOptions};
pub use posix_querier::PosixQuerier;
pub use process_info::{get_process_info, ProcessQuerier, Querier};
pub use tool_runner::{SystemRunner, ToolRunner};
pub use types::{ProcError, ProcessInfo, Probe, Result};
pub use windows_querier::WindowsQuerier;
