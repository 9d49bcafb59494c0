//! Adapters for external analyzers.
//!
//! An adapter owns one process-boundary integration: it invokes a tool,
//! accumulates its output in full, and translates the tool's vocabulary
//! into this crate's `Finding` shape. Adapter failures never propagate:
//! a failing tool contributes zero findings and a diagnostic, so one
//! producer can never block the others.

pub mod slither;

use std::process::{Command, Stdio};

/// Captured result of one blocking subprocess round-trip. Both streams are
/// accumulated in full before any parsing happens.
#[derive(Debug, Clone)]
pub(crate) struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub(crate) fn run_command(cmd: &str, args: &[String]) -> std::io::Result<CommandOutput> {
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .output()?;

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn run_command_captures_streams_and_exit_code() {
        let args = vec!["-c".to_string(), "echo out; echo err 1>&2; exit 3".to_string()];
        let output = run_command("sh", &args).unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn run_command_launch_failure_is_io_error() {
        assert!(run_command("definitely-not-a-real-binary-xyz", &[]).is_err());
    }
}
