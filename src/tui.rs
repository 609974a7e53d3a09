use anyhow::{Context, Result};

use crate::config::Config;

/// Runs the terminal console until the operator quits.
pub fn run(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(crate::tui_shell::run(config))
}
