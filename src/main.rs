use anyhow::Result;
use clap::Parser;

use mc_console::config::{Args, Config};
use mc_console::logging;

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;
    logging::init_logging(&config)?;
    tracing::info!(url = %config.base_url, tick_ms = config.tick.as_millis() as u64, "starting");
    mc_console::tui::run(config)
}
