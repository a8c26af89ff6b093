//! External command helpers used by vendor detection.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, SysfetchError};

/// Run `program` and return its trimmed stdout.
///
/// Fails if the program cannot be launched, exits non-zero, or prints
/// nothing. No timeout is applied.
pub fn capture_stdout(program: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| SysfetchError::Process(format!("failed to run {}: {e}", program.display())))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SysfetchError::Process(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        return Err(SysfetchError::Process(format!(
            "{} printed nothing",
            program.display()
        )));
    }

    Ok(stdout)
}
