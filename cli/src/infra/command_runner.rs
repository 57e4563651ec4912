//! Infrastructure implementation of the `CommandRunner` port.

use anyhow::{Context, Result};

use crate::application::ports::CommandRunner;

/// Production `CommandRunner` backed by `tokio::process`.
///
/// The child inherits stdin, stdout and stderr so interactive programs such
/// as `ssh` own the terminal until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        child
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))
    }
}
