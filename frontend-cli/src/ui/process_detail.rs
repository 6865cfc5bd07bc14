//! Key/value listing of a single process record.

use procscope::ProcessInfo;
use std::fmt;

const LABEL_WIDTH: usize = 12;

pub struct ProcessDetail<'a> {
    info: &'a ProcessInfo,
}

impl<'a> ProcessDetail<'a> {
    pub fn new(info: &'a ProcessInfo) -> Self {
        Self { info }
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

impl fmt::Display for ProcessDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info;
        let rows = [
            ("PID", info.pid.to_string()),
            ("Command", or_dash(&info.cmd).to_string()),
            ("User", or_dash(&info.user).to_string()),
            ("State", or_dash(&info.state).to_string()),
            ("CPU", or_dash(&info.cpu).to_string()),
            ("Memory", or_dash(&info.memory).to_string()),
            ("Started", or_dash(&info.start_time).to_string()),
            (
                "Parent PID",
                match info.parent_pid {
                    0 => "-".to_string(),
                    ppid => ppid.to_string(),
                },
            ),
        ];
        for (label, value) in rows {
            writeln!(f, "{:<width$}{}", label, value, width = LABEL_WIDTH)?;
        }

        writeln!(f, "{:<width$}{}", "Threads", info.threads.len(), width = LABEL_WIDTH)?;
        for thread in &info.threads {
            writeln!(f, "  {}", thread)?;
        }

        for (label, blob) in [("I/O", &info.io_stats), ("Network", &info.network_connections)] {
            if blob.trim().is_empty() {
                writeln!(f, "{:<width$}-", label, width = LABEL_WIDTH)?;
                continue;
            }
            writeln!(f, "{}", label)?;
            for line in blob.lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_primary_fields_and_dashes() {
        let info = ProcessInfo {
            pid: 42,
            cpu: "1.5".into(),
            memory: "0.2".into(),
            state: "S".into(),
            user: "alice".into(),
            cmd: "sleep".into(),
            ..Default::default()
        };
        let text = ProcessDetail::new(&info).to_string();

        assert!(text.starts_with("PID         42\n"));
        assert!(text.contains("Command     sleep\n"));
        assert!(text.contains("Parent PID  -\n"));
        assert!(text.contains("Threads     0\n"));
        assert!(text.contains("I/O         -\n"));
    }

    #[test]
    fn test_renders_blobs_indented() {
        let info = ProcessInfo {
            pid: 1,
            threads: vec!["    1     1 ?  00:00:01 init".into()],
            io_stats: "rchar: 10\nwchar: 20\n".into(),
            ..Default::default()
        };
        let text = ProcessDetail::new(&info).to_string();

        assert!(text.contains("Threads     1\n      1     1 ?  00:00:01 init\n"));
        assert!(text.contains("I/O\n  rchar: 10\n  wchar: 20\n"));
    }
}
