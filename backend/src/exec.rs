//! Shell command execution with charset-aware output capture.

use crate::encoding;
use crate::types::{ProcError, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

#[cfg(unix)]
use std::os::fd::OwnedFd;

/// First descriptor number handed to `extra_fds` in the child.
#[cfg(unix)]
pub const EXTRA_FD_BASE: i32 = 3;

/// Adjustments applied to the shell invocation before it runs.
#[derive(Debug, Default)]
pub struct ExecOptions {
    pub current_dir: Option<PathBuf>,
    pub envs: Vec<(OsString, OsString)>,
    /// Start the child from an empty environment before applying `envs`.
    pub env_clear: bool,
    /// Descriptors inherited by the child as 3, 4, ... in order.
    #[cfg(unix)]
    pub extra_fds: Vec<OwnedFd>,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }

    #[cfg(unix)]
    pub fn extra_fd(mut self, fd: OwnedFd) -> Self {
        self.extra_fds.push(fd);
        self
    }

    fn apply(&self, cmd: &mut Command) {
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        if self.env_clear {
            cmd.env_clear();
        }
        cmd.envs(self.envs.iter().map(|(k, v)| (k, v)));

        #[cfg(unix)]
        map_extra_fds(cmd, &self.extra_fds);
    }
}

/// Decoded output of a successful command.
///
/// `stderr` is always empty: the error stream is only decoded when the
/// command fails, where it travels inside [`ProcError::NonZeroExit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[cfg(unix)]
fn shell_program() -> &'static str {
    "/bin/bash"
}

#[cfg(windows)]
fn shell_program() -> &'static str {
    "powershell.exe"
}

/// Builds the host shell invocation for a complete command line.
pub fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new(shell_program());
    #[cfg(unix)]
    cmd.arg("-c");
    cmd.arg(command);
    cmd
}

/// Runs `command` through the host shell and blocks until it exits.
///
/// On success the captured stdout is decoded (UTF-8, else GBK, else empty).
/// A launch failure or non-zero exit returns an error, and only in the
/// non-zero exit case is stderr decoded and attached to it.
pub fn exec_command(command: &str, opts: &ExecOptions) -> Result<CommandOutput> {
    let program = shell_program();
    let mut cmd = shell_command(command);
    opts.apply(&mut cmd);
    cmd.stdin(Stdio::null());

    debug!("Running {}-byte command via {}", command.len(), program);
    let output = cmd.output().map_err(|source| ProcError::Launch {
        program: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        debug!("{} exited with {:?}", program, output.status.code());
        return Err(ProcError::NonZeroExit {
            program: program.to_string(),
            code: output.status.code(),
            stderr: encoding::decode(&output.stderr),
        });
    }

    Ok(CommandOutput {
        stdout: encoding::decode(&output.stdout),
        stderr: String::new(),
    })
}

/// [`exec_command`] with default options.
pub fn exec(command: &str) -> Result<CommandOutput> {
    exec_command(command, &ExecOptions::default())
}

#[cfg(unix)]
fn map_extra_fds(cmd: &mut Command, fds: &[OwnedFd]) {
    use nix::fcntl::{fcntl, FcntlArg};
    use nix::unistd::dup2;
    use std::os::fd::{AsRawFd, RawFd};
    use std::os::unix::process::CommandExt;

    if fds.is_empty() {
        return;
    }
    let mut sources: Vec<RawFd> = fds.iter().map(AsRawFd::as_raw_fd).collect();
    let floor = EXTRA_FD_BASE + sources.len() as RawFd;

    // SAFETY: the hook runs between fork and exec. It only calls fcntl and
    // dup2, which are async-signal-safe, and rewrites `sources` in place
    // without allocating.
    unsafe {
        cmd.pre_exec(move || {
            // Lift every source above the target range first so that a source
            // already sitting on a target slot is not clobbered.
            for fd in sources.iter_mut() {
                *fd = fcntl(*fd, FcntlArg::F_DUPFD_CLOEXEC(floor))?;
            }
            for (offset, fd) in sources.iter().enumerate() {
                dup2(*fd, EXTRA_FD_BASE + offset as RawFd)?;
            }
            Ok(())
        });
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_echo_hello() {
        let out = exec("echo hello").unwrap();
        assert_eq!(out.stdout.trim_end(), "hello");
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn test_exit_one_is_error() {
        let err = exec("exit 1").unwrap_err();
        match err {
            ProcError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert!(stderr.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failure_carries_decoded_stderr() {
        let err = exec("echo oops >&2; echo ignored; exit 3").unwrap_err();
        assert_eq!(err.stderr(), Some("oops\n"));
        assert!(matches!(err, ProcError::NonZeroExit { code: Some(3), .. }));
    }

    #[test]
    fn test_stderr_not_decoded_on_success() {
        // Successful commands never report their error stream.
        let out = exec("echo warning >&2").unwrap();
        assert_eq!(out, CommandOutput::default());
    }

    #[test]
    fn test_gbk_stdout_is_transcoded() {
        // "中文" encoded as GBK
        let out = exec(r"printf '\xd6\xd0\xce\xc4'").unwrap();
        assert_eq!(out.stdout, "中文");
    }

    #[test]
    fn test_undecodable_stdout_is_empty() {
        let out = exec(r"printf 'a\xff'").unwrap();
        assert_eq!(out.stdout, "");
    }

    #[test]
    fn test_current_dir_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ExecOptions::new()
            .current_dir(dir.path())
            .env("PROCSCOPE_TEST_VAR", "set-by-test");
        let out = exec_command("pwd; echo \"$PROCSCOPE_TEST_VAR\"", &opts).unwrap();
        let mut lines = out.stdout.lines();
        let pwd = std::fs::canonicalize(lines.next().unwrap()).unwrap();
        assert_eq!(pwd, std::fs::canonicalize(dir.path()).unwrap());
        assert_eq!(lines.next(), Some("set-by-test"));
    }

    #[test]
    fn test_env_clear() {
        std::env::set_var("PROCSCOPE_INHERITED", "1");
        let opts = ExecOptions::new().env_clear().env("ONLY", "this");
        let out = exec_command("echo \"${PROCSCOPE_INHERITED:-unset} $ONLY\"", &opts).unwrap();
        assert_eq!(out.stdout.trim_end(), "unset this");
    }

    #[test]
    fn test_debug_log_omits_command_text() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let capture = Capture::default();
        let sink = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            exec("echo hunter2-token").unwrap();
            exec("echo hunter2-token; exit 4").unwrap_err();
        });

        let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("command via /bin/bash"));
        assert!(!logged.contains("hunter2-token"));
    }

    #[test]
    fn test_missing_working_dir_is_launch_error() {
        let opts = ExecOptions::new().current_dir("/definitely/not/a/real/dir");
        let err = exec_command("true", &opts).unwrap_err();
        assert!(matches!(err, ProcError::Launch { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_extra_fd_is_inherited_as_fd_3() {
        use nix::fcntl::OFlag;
        use std::io::Read;

        let (read_end, write_end) = nix::unistd::pipe2(OFlag::O_CLOEXEC).unwrap();
        let opts = ExecOptions::new().extra_fd(write_end);
        exec_command("echo through-fd >&3", &opts).unwrap();
        drop(opts);

        let mut received = String::new();
        std::fs::File::from(read_end)
            .read_to_string(&mut received)
            .unwrap();
        assert_eq!(received, "through-fd\n");
    }
}
