//! `tins create` — launch a temporary instance with a fresh key pair.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::application::services::create::{
    CreateOptions, DEFAULT_WAIT_TIMEOUT, LaunchTarget, WaitPolicy, create_instance,
};
use crate::infra::keys::FsKeyStore;
use crate::output::{HumanRenderer, JsonRenderer, TerminalReporter};

/// Upper bound for `--wait-timeout`.
pub const MAX_WAIT_TIMEOUT_SECS: u64 = 86_400;

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Short instance name (random when omitted)
    pub name: Option<String>,

    /// Seconds to wait for the instance to become ACTIVE (at most one day)
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_WAIT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..=MAX_WAIT_TIMEOUT_SECS)
    )]
    pub wait_timeout: u64,

    /// Return as soon as the create request is accepted
    #[arg(long)]
    pub no_wait: bool,
}

/// Run `tins create [name]`.
///
/// # Errors
///
/// Returns an error if configuration, authentication, key generation,
/// keypair registration or instance creation fails.
pub async fn run(app: &AppContext, args: CreateArgs) -> Result<()> {
    let (config, provider) = app.provider().await?;
    let keys = FsKeyStore::new()?;
    let reporter = TerminalReporter::new(&app.output);
    tracing::debug!(
        mode = %config.network_attachment_mode,
        "network attachment mode"
    );

    let wait = (!args.no_wait).then(|| {
        WaitPolicy::new(
            Duration::from_secs(args.wait_timeout),
            CancellationToken::new(),
        )
    });
    let ctrl_c = watch_ctrl_c(wait.as_ref());

    let result = create_instance(
        &provider,
        &keys,
        CreateOptions {
            reporter: &reporter,
            name: args.name.as_deref(),
            target: LaunchTarget {
                image_name: &config.image_name,
                flavor_name: &config.flavor_name,
                network_name: &config.network_name,
                availability_zone: &config.availability_zone,
            },
            wait,
        },
    )
    .await;
    if let Some(watcher) = ctrl_c {
        watcher.abort();
    }
    drop(reporter);
    let outcome = result?;

    if app.is_json() {
        JsonRenderer::render_created(&outcome)
    } else {
        HumanRenderer::new(&app.output).render_created(&outcome);
        Ok(())
    }
}

/// Route Ctrl-C to the readiness poll's token. Without a poll nothing observes
/// the token, so Ctrl-C keeps its default behaviour.
fn watch_ctrl_c(wait: Option<&WaitPolicy>) -> Option<tokio::task::JoinHandle<()>> {
    wait.map(|policy| spawn_ctrl_c_watcher(policy.cancel.clone()))
}

/// Cancel `token` on the first Ctrl-C. Aborted once the workflow returns.
fn spawn_ctrl_c_watcher(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling wait");
            token.cancel();
        }
    })
}
