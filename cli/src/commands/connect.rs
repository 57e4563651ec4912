//! `tins connect` — open an SSH session to a managed instance.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::connect::connect;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::keys::FsKeyStore;
use crate::infra::selector::TerminalSelector;
use crate::output::TerminalReporter;

/// Arguments for the connect command.
#[derive(Args)]
pub struct ConnectArgs {
    /// Instance short name, full name or ID (interactive picker when omitted)
    pub name: Option<String>,

    /// Extra arguments passed to ssh after `--`
    #[arg(last = true, value_name = "SSH_ARGS")]
    pub ssh_args: Vec<String>,
}

/// Run `tins connect [name] [-- ssh-args...]`.
///
/// # Errors
///
/// Returns an error if the instance cannot be resolved, has no address or
/// local key, or `ssh` exits unsuccessfully.
pub async fn run(app: &AppContext, args: ConnectArgs) -> Result<()> {
    let (_, provider) = app.provider().await?;
    let keys = FsKeyStore::new()?;
    let reporter = TerminalReporter::new(&app.output);

    connect(
        &provider,
        &keys,
        &TerminalSelector,
        &TokioCommandRunner::new(),
        &reporter,
        args.name.as_deref(),
        &args.ssh_args,
    )
    .await?;
    Ok(())
}
