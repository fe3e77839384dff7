// fuego-wallet/src/wallet/process.rs
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use fuego_core::signatures::Signature;
use fuego_core::{WalletError, WalletResult};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// What a finished child process produced.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Turns a non-zero exit into an `ExternalProcess` error carrying the
    /// child's stderr verbatim.
    pub fn check(self, context: &str) -> WalletResult<Self> {
        if self.success {
            return Ok(self);
        }
        let detail = if self.stderr.trim().is_empty() {
            match self.code {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            }
        } else {
            self.stderr.trim_end().to_string()
        };
        Err(WalletError::external(context, detail))
    }
}

fn command<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd
}

fn spawn_error(program: &str, e: std::io::Error) -> WalletError {
    WalletError::external(format!("Failed to start '{}'", program), e.to_string())
}

/// Runs a child with both streams captured.
pub async fn run_captured<I, S>(
    program: &str,
    args: I,
    cwd: Option<&Path>,
) -> WalletResult<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    debug!("Running '{}' (captured) in {:?}", program, cwd);
    let output = command(program, args, cwd)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| spawn_error(program, e))?;

    Ok(ProcessOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs a child, echoing its stdout line by line while also capturing it.
/// Stderr is captured only. Both streams are decoded lossily.
pub async fn run_streaming<I, S>(
    program: &str,
    args: I,
    cwd: Option<&Path>,
) -> WalletResult<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    debug!("Running '{}' (streaming) in {:?}", program, cwd);
    let mut child = command(program, args, cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let stderr_task = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buf).await {
                warn!("Stopped reading child stderr: {}", e);
            }
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let mut stdout = String::new();
    if let Some(out) = child.stdout.take() {
        let mut reader = BufReader::new(out);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&line);
                    print!("{}", text);
                    stdout.push_str(&text);
                }
                Err(e) => {
                    // Keep waiting on the child; it may be mid-transaction.
                    warn!("Stopped reading output of '{}': {}", program, e);
                    break;
                }
            }
        }
        if !stdout.is_empty() && !stdout.ends_with('\n') {
            println!();
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| WalletError::external(format!("Waiting for '{}'", program), e.to_string()))?;
    let stderr = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    Ok(ProcessOutput {
        success: status.success(),
        code: status.code(),
        stdout,
        stderr,
    })
}

/// Runs a child attached to this terminal and returns its exit code.
pub async fn run_inherited<I, S>(program: &str, args: I, cwd: Option<&Path>) -> WalletResult<i32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    info!("Running '{}' attached in {:?}", program, cwd);
    let status = command(program, args, cwd)
        .status()
        .await
        .map_err(|e| spawn_error(program, e))?;
    Ok(status.code().unwrap_or(1))
}

/// Finds `Label: value` on any line and returns `value`.
pub fn find_labeled<'a>(output: &'a str, label: &str) -> Option<&'a str> {
    output.lines().find_map(|line| {
        let rest = line.trim().strip_prefix(label)?.strip_prefix(':')?;
        let value = rest.split_whitespace().next()?;
        Some(value)
    })
}

/// Extracts `Signature: <base58>` from script output.
pub fn parse_signature(output: &str) -> Option<Signature> {
    find_labeled(output, "Signature")
        .filter(|s| s.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|s| Signature(s.to_string()))
}
