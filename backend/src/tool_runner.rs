//! Access to the external tools and pseudo-files the inspector reads.

use crate::encoding;
use crate::types::{ProcError, Result};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::trace;

/// Runs listing tools and reads files on behalf of a querier.
pub trait ToolRunner {
    /// Runs `program` with `args` and returns its raw stdout.
    ///
    /// Fails when the program cannot be started or exits non-zero.
    fn output(&self, program: &str, args: &[&str]) -> Result<Vec<u8>>;

    /// Reads the entire contents of a file as text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

impl<R: ToolRunner + ?Sized> ToolRunner for &R {
    fn output(&self, program: &str, args: &[&str]) -> Result<Vec<u8>> {
        (**self).output(program, args)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

/// Runs real subprocesses and reads the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn output(&self, program: &str, args: &[&str]) -> Result<Vec<u8>> {
        trace!("Running {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProcError::Launch {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProcError::NonZeroExit {
                program: program.to_string(),
                code: output.status.code(),
                stderr: encoding::decode(&output.stderr),
            });
        }
        Ok(output.stdout)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
