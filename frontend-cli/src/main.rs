//! procscope - inspect a process or run a shell command from the terminal.
//!
//! Usage:
//!   procscope inspect            # inspect this process
//!   procscope inspect 1234       # inspect PID 1234
//!   procscope inspect 1234 --json
//!   procscope exec -- ls -la
//!   procscope exec --cwd /tmp --env LANG=C -- 'echo $LANG'

mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use procscope::{exec_command, get_process_info, ExecOptions, ProcError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ui::{command_report::CommandReport, process_detail::ProcessDetail};

#[derive(Parser, Debug)]
#[command(name = "procscope", about = "Process introspection and shell command runner")]
struct Args {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Show CPU, memory, state, threads and more for one process
    Inspect {
        /// Process ID (defaults to this process)
        pid: Option<u32>,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a command through the host shell and print its decoded output
    Exec {
        /// Working directory for the command
        #[arg(long, value_name = "DIR")]
        cwd: Option<PathBuf>,

        /// Extra environment variable, repeatable
        #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
        envs: Vec<(String, String)>,

        /// Start from an empty environment
        #[arg(long)]
        env_clear: bool,

        /// The complete command line
        #[arg(last = true, required = true, num_args = 1..)]
        command: Vec<String>,
    },
}

fn parse_env_pair(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", raw)),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cmd: Cmd) -> Result<ExitCode> {
    match cmd {
        Cmd::Inspect { pid, json } => {
            let pid = pid.unwrap_or_else(std::process::id);
            let info = get_process_info(pid)
                .with_context(|| format!("failed to inspect PID {}", pid))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print!("{}", ProcessDetail::new(&info));
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Exec {
            cwd,
            envs,
            env_clear,
            command,
        } => {
            let command = command.join(" ");
            let mut opts = ExecOptions::new();
            if let Some(dir) = cwd {
                opts = opts.current_dir(dir);
            }
            if env_clear {
                opts = opts.env_clear();
            }
            for (key, value) in envs {
                opts = opts.env(key, value);
            }
            debug!("Options: {:?}", opts);

            match exec_command(&command, &opts) {
                Ok(output) => {
                    print!("{}", CommandReport::success(&output));
                    Ok(ExitCode::SUCCESS)
                }
                Err(err @ ProcError::NonZeroExit { .. }) => {
                    eprint!("{}", CommandReport::failure(&err));
                    Ok(ExitCode::FAILURE)
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}
