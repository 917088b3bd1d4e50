// Synchronous external process execution

use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{Error, Result};

/// Render a command for logs and error messages (program and arguments)
fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run with inherited stdout/stderr, failing on a non-zero exit
pub(crate) fn run(cmd: &mut Command) -> Result<()> {
    let command = describe(cmd);
    debug!("Executing command: {}", command);

    let status = cmd.status().map_err(|source| Error::Spawn {
        command: command.clone(),
        source,
    })?;

    if !status.success() {
        return Err(Error::ExternalCommand {
            command,
            status,
            stderr: String::new(),
        });
    }

    Ok(())
}

/// Run with `input` written to stdin and inherited stdout/stderr.
///
/// The child is always waited for. A non-zero exit takes precedence over a
/// failed write, since a program that exits early also closes its stdin.
pub(crate) fn run_with_stdin(cmd: &mut Command, input: &str) -> Result<()> {
    let command = describe(cmd);
    debug!("Executing command: {}", command);

    let mut child = cmd
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            command: command.clone(),
            source,
        })?;

    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    };

    let status = child.wait().map_err(|source| Error::Spawn {
        command: command.clone(),
        source,
    })?;

    if !status.success() {
        return Err(Error::ExternalCommand {
            command,
            status,
            stderr: String::new(),
        });
    }

    written.map_err(|source| Error::Stdin { command, source })
}

/// Run and capture stdout, failing on a non-zero exit with captured stderr
pub(crate) fn output(cmd: &mut Command) -> Result<String> {
    let command = describe(cmd);
    debug!("Executing command: {}", command);

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|source| Error::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::ExternalCommand {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
