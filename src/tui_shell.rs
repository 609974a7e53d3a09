use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::remote::ApiClient;
use crate::runtime::Runtime;
use crate::session::{Session, SessionConfig};

mod app;
use app::App;

mod input;
mod render;
mod time_fmt;
mod views;

pub(crate) async fn run(config: Config) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("mc-console requires an interactive terminal (TTY)");
    }

    let client = ApiClient::new(config.base_url.clone())?;
    let (tx, rx) = mpsc::unbounded_channel();
    let session = Session::new(SessionConfig {
        reconnect_delay: config.reconnect_delay(),
    });
    let mut app = App::new(session, Runtime::new(client, tx), config.base_url.to_string());
    info!(url = %config.base_url, "console started");

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = app::run_loop(&mut terminal, &mut app, rx, config.tick).await;

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    info!("console stopped");
    res
}
