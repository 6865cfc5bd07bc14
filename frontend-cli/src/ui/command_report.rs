//! Output of `procscope exec`.

use procscope::{CommandOutput, ProcError};
use std::fmt;

pub enum CommandReport<'a> {
    Success(&'a CommandOutput),
    Failure(&'a ProcError),
}

impl<'a> CommandReport<'a> {
    pub fn success(output: &'a CommandOutput) -> Self {
        CommandReport::Success(output)
    }

    pub fn failure(err: &'a ProcError) -> Self {
        CommandReport::Failure(err)
    }
}

impl fmt::Display for CommandReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandReport::Success(output) => write!(f, "{}", output.stdout),
            CommandReport::Failure(err) => {
                if let Some(stderr) = err.stderr().filter(|s| !s.is_empty()) {
                    write!(f, "{}", stderr)?;
                    if !stderr.ends_with('\n') {
                        writeln!(f)?;
                    }
                }
                writeln!(f, "Error: {}", err)
            }
        }
    }
}
