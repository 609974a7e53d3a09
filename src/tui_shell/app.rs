use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;

use super::input::Input;
use crate::nav::Screen;
use crate::runtime::Runtime;
use crate::session::{AppEvent, Session};

mod keys;

pub(super) struct App {
    pub(super) session: Session,
    runtime: Runtime,
    pub(super) base_url: String,
    /// `Some` while the saves filter is being edited.
    pub(super) filter_input: Option<Input>,
    pub(super) command: Input,
    /// Console lines scrolled up from the bottom.
    pub(super) console_scroll: usize,
    pub(super) quit: bool,
}

impl App {
    pub(super) fn new(session: Session, runtime: Runtime, base_url: String) -> Self {
        Self {
            session,
            runtime,
            base_url,
            filter_input: None,
            command: Input::default(),
            console_scroll: 0,
            quit: false,
        }
    }

    fn flush_effects(&mut self) {
        for effect in self.session.drain_effects() {
            self.runtime.execute(effect);
        }
    }

    fn on_event(&mut self, event: AppEvent) {
        if let AppEvent::Console { .. } = &event
            && self.console_scroll > 0
        {
            // Keep the viewport pinned while new lines arrive below it.
            let before = self.console_lines();
            self.session.handle_event(event);
            let grown = self.console_lines().saturating_sub(before);
            self.console_scroll += grown;
            return;
        }
        self.session.handle_event(event);
    }

    fn console_lines(&self) -> usize {
        self.session
            .console()
            .map(|c| c.transcript().lines().len())
            .unwrap_or(0)
    }

    pub(super) fn screen(&self) -> Screen {
        self.session.screen()
    }

    /// Goes back one screen; with no history left the console exits.
    pub(super) fn back(&mut self) {
        if !self.session.navigate_back() {
            self.quit = true;
        }
        self.after_navigation();
    }

    pub(super) fn open(&mut self, screen: Screen) {
        if self.session.request_screen(screen, false) {
            self.after_navigation();
        }
    }

    fn after_navigation(&mut self) {
        if self.session.screen() != Screen::Console {
            self.command.clear();
            self.console_scroll = 0;
        }
    }
}

pub(super) async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut rx: UnboundedReceiver<AppEvent>,
    tick: Duration,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let res = loop {
        app.flush_effects();
        if let Err(err) = terminal.draw(|f| super::render::draw(f, app)) {
            break Err(err).context("draw");
        }
        if app.quit {
            break Ok(());
        }

        tokio::select! {
            _ = ticker.tick() => app.on_event(AppEvent::Tick),
            Some(event) = rx.recv() => app.on_event(event),
            maybe = events.next() => match maybe {
                Some(Ok(Event::Key(k))) if k.kind == KeyEventKind::Press => handle_key(app, k),
                Some(Ok(_)) => {}
                Some(Err(err)) => break Err(err).context("read terminal event"),
                None => break Ok(()),
            },
        }
    };

    app.runtime.shutdown();
    res
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }
    match app.screen() {
        Screen::Saves => keys::saves(app, key),
        Screen::Create => keys::create(app, key),
        Screen::Modify => keys::modify(app, key),
        Screen::Delete => keys::delete(app, key),
        Screen::Console => keys::console(app, key),
        Screen::Version => keys::version(app, key),
    }
}
