//! `tins list` — show managed instances.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::list::list_managed;
use crate::output::{HumanRenderer, JsonRenderer};

/// Run `tins list`.
///
/// # Errors
///
/// Returns an error if configuration, authentication or listing fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let (_, provider) = app.provider().await?;
    let instances = list_managed(&provider).await?;

    if app.is_json() {
        JsonRenderer::render_instances(&instances)
    } else {
        HumanRenderer::new(&app.output).render_instances(&instances);
        Ok(())
    }
}
