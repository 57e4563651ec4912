//! `tins terminate` — delete instances and their keys.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::list::list_managed;
use crate::application::services::terminate::{terminate_instance, terminate_listed};
use crate::infra::keys::FsKeyStore;
use crate::output::{HumanRenderer, JsonRenderer, TerminalReporter};

/// Arguments for the terminate command.
#[derive(Args)]
pub struct TerminateArgs {
    /// Instance short name, full name or ID
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub name: Option<String>,

    /// Terminate every temporary instance
    #[arg(long)]
    pub all: bool,
}

/// Run `tins terminate <name> | --all`.
///
/// # Errors
///
/// Returns an error if the instance cannot be resolved or deleted, or, with
/// `--all`, if the instance list cannot be fetched.
pub async fn run(app: &AppContext, args: TerminateArgs) -> Result<()> {
    let (_, provider) = app.provider().await?;
    let keys = FsKeyStore::new()?;
    let human = HumanRenderer::new(&app.output);

    if args.all {
        let found = list_managed(&provider).await?;
        if !app.is_json() {
            human.render_terminate_plan(&found);
        }
        let reporter = TerminalReporter::new(&app.output);
        let outcome = terminate_listed(&provider, &keys, &reporter, found).await;
        drop(reporter);
        return if app.is_json() {
            JsonRenderer::render_terminate_all(&outcome)
        } else {
            if !outcome.found.is_empty() {
                human.render_terminate_summary(&outcome);
            }
            Ok(())
        };
    }

    let Some(name) = args.name.as_deref() else {
        anyhow::bail!("Either an instance name/ID or --all is required");
    };
    let reporter = TerminalReporter::new(&app.output);
    let done = terminate_instance(&provider, &keys, &reporter, name).await?;
    drop(reporter);
    if app.is_json() {
        JsonRenderer::render_terminated(&done)?;
    }
    Ok(())
}
