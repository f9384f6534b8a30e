use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
};
use tracing::debug;

use crate::{
    application::ports::email_verifier::{EmailVerifier, Verdict, VerifierError},
    domain::email_address::EmailAddress,
};

/// Only the tail of each stream is kept; the report is the last stdout line.
const MAX_STDOUT_BYTES: usize = 64 * 1024;
const MAX_STDERR_BYTES: usize = 8 * 1024;

/// Verifier that spawns a local checker script per address.
///
/// The script receives the email as its last argument and prints a JSON
/// report (`{"is_valid": bool, "reason": "..."}`) as the last line of stdout.
/// Diagnostics on stderr are logged at debug level.
pub struct ProcessEmailVerifier {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

#[derive(Deserialize, Debug)]
struct ScriptReport {
    is_valid: bool,
    reason: Option<String>,
}

impl ProcessEmailVerifier {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Splits a whitespace-separated command line such as
    /// `python3 email-check.py`. Returns `None` for an empty command.
    pub fn from_command_line(command: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }
}

#[async_trait]
impl EmailVerifier for ProcessEmailVerifier {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn verify(&self, email: &EmailAddress) -> Result<Verdict, VerifierError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(email.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VerifierError::Process(format!("spawn {}: {e}", self.program)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async {
            let (stdout, stderr) = tokio::try_join!(
                read_tail(stdout, MAX_STDOUT_BYTES),
                read_tail(stderr, MAX_STDERR_BYTES)
            )?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        };

        // On timeout the child is dropped at return, which kills it.
        let (status, stdout, stderr) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| VerifierError::Timeout(self.timeout))?
            .map_err(|e| VerifierError::Process(e.to_string()))?;

        if !stderr.is_empty() {
            debug!(
                stderr = %String::from_utf8_lossy(&stderr).trim(),
                "Verifier script diagnostics"
            );
        }

        if !status.success() {
            return Err(VerifierError::Process(format!("exited with {status}")));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        let last_line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| VerifierError::Malformed("empty output".into()))?;
        let report: ScriptReport = serde_json::from_str(last_line.trim())
            .map_err(|e| VerifierError::Malformed(e.to_string()))?;

        Ok(match (report.is_valid, report.reason) {
            (true, _) => Verdict::valid(),
            (false, Some(reason)) => Verdict::invalid(reason),
            (false, None) => Verdict::invalid("Email does not exist"),
        })
    }
}

/// Drains `reader` to EOF, keeping at most the last `limit` bytes.
async fn read_tail<R: AsyncRead + Unpin>(
    reader: Option<R>,
    limit: usize,
) -> std::io::Result<Vec<u8>> {
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };
    let mut tail = Vec::new();
    let mut chunk = [0u8; 8 * 1024];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(tail);
        }
        tail.extend_from_slice(&chunk[..n]);
        if tail.len() > limit {
            let excess = tail.len() - limit;
            tail.drain(..excess);
        }
    }
}
