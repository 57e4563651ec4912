//! Terminal implementation of the `InstanceSelector` port using `dialoguer`.

use anyhow::{Context, Result};
use dialoguer::Select;

use crate::application::ports::InstanceSelector;

/// Arrow-key list picker. Esc and `q` cancel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSelector;

impl InstanceSelector for TerminalSelector {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .context("reading selection")
    }
}
