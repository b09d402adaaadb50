//! External command invocation
//!
//! The TTS engine, tempo tool and player are all black-box programs
//! configured as argument vectors with `{placeholder}` substitution.
//! Arguments are passed directly to the program, never through a shell,
//! so text containing quotes or `$` reaches the engine untouched.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// A command line with `{name}` placeholders, e.g.
/// `["ffmpeg", "-i", "{input}", "-filter:a", "{filter}", "{output}"]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CommandTemplate(Vec<String>);

impl CommandTemplate {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(argv.into_iter().map(Into::into).collect())
    }

    /// Program name (first element), if any
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn argv(&self) -> &[String] {
        &self.0
    }

    /// Substitute placeholders in every argument.
    ///
    /// Each argument is scanned once, so a substituted value that itself
    /// contains `{...}` is never expanded again.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<Invocation, ToolError> {
        let (program, args) = self.0.split_first().ok_or(ToolError::EmptyCommand)?;
        Ok(Invocation {
            program: program.clone(),
            args: args.iter().map(|arg| substitute(arg, vars)).collect(),
        })
    }

    /// Render and run, treating a non-zero exit as an error
    pub async fn run_checked(
        &self,
        vars: &[(&str, &str)],
        limit: Option<Duration>,
    ) -> Result<ToolOutput, ToolError> {
        self.render(vars)?.run_checked(limit).await
    }
}

fn substitute(arg: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replaced = after.find('}').and_then(|end| {
            let name = &after[..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// A fully rendered command ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Exit status and captured diagnostic of a finished external command
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Convert a non-zero exit into a typed error
    pub fn into_result(self, program: &str) -> Result<ToolOutput, ToolError> {
        if self.status.success() {
            Ok(self)
        } else {
            Err(ToolError::NonZeroExit {
                program: program.to_string(),
                code: self.status.code(),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

impl Invocation {
    /// Run to completion, capturing stderr.
    ///
    /// The child is killed if this future is dropped (task aborted) or the
    /// timeout elapses. `None` waits indefinitely.
    pub async fn run(&self, limit: Option<Duration>) -> Result<ToolOutput, ToolError> {
        tracing::debug!("Running {} {:?}", self.program, self.args);

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotFound {
                        program: self.program.clone(),
                    }
                } else {
                    ToolError::SpawnFailed {
                        program: self.program.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let waited = match limit {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ToolError::Timeout {
                    program: self.program.clone(),
                    secs: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| ToolError::SpawnFailed {
            program: self.program.clone(),
            message: e.to_string(),
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.trim().is_empty() {
            tracing::debug!("{} stderr: {}", self.program, stderr.trim());
        }

        Ok(ToolOutput {
            status: output.status,
            stderr,
        })
    }

    /// Run and treat a non-zero exit as an error
    pub async fn run_checked(&self, limit: Option<Duration>) -> Result<ToolOutput, ToolError> {
        self.run(limit).await?.into_result(&self.program)
    }
}

/// Convert a `timeout_secs` config value into an optional limit (0 = none)
pub fn limit_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
