//! The operator session: one owned value holding the registry, selection,
//! poller, console and navigation state.
//!
//! The session performs no I/O. Front-end intents arrive as method calls and
//! asynchronous completions as [`AppEvent`]s; everything that must touch the
//! network is queued as an [`Effect`] and drained by the runtime.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::console::{ConnectRequest, ConsoleSession, StreamEvent};
use crate::model::schema::Schema;
use crate::model::{SaveRecord, StatusMap};
use crate::nav::{History, Screen};
use crate::poller::StatusPoller;
use crate::registry::SaveRegistry;
use crate::remote::{ApiError, Values};
use crate::selection::{ActionSet, Selection};

mod actions;
mod events;
pub mod forms;
mod navigation;

use forms::{CreateForm, ModifyForm};

/// One-shot continuation registered by whoever opened the version picker.
/// Receives the picked version, or `None` when the picker was cancelled.
pub type VersionCallback = Box<dyn FnOnce(&mut Session, Option<String>)>;

/// A mutation requested from the instance manager.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Create {
        name: String,
        version: String,
        values: Values,
    },
    Modify {
        name: String,
        values: Values,
    },
    Delete {
        name: String,
    },
    Start {
        name: String,
    },
    Stop {
        name: String,
    },
    Command {
        name: String,
        command: String,
    },
}

impl Action {
    pub fn target(&self) -> &str {
        match self {
            Action::Create { name, .. }
            | Action::Modify { name, .. }
            | Action::Delete { name }
            | Action::Start { name }
            | Action::Stop { name }
            | Action::Command { name, .. } => name,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Action::Create { .. } => "create",
            Action::Modify { .. } => "modify",
            Action::Delete { .. } => "delete",
            Action::Start { .. } => "start",
            Action::Stop { .. } => "stop",
            Action::Command { .. } => "send command to",
        }
    }
}

/// Work the runtime performs on the session's behalf.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// `issued_at` is the session's status write count when the fetch
    /// was issued.
    FetchStatus { issued_at: u64 },
    ListSaves,
    LoadSchema,
    LoadVersions,
    Perform { origin: Screen, action: Action },
    OpenConsole(ConnectRequest),
    CloseConsole { session: u64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    /// One base tick of the poll clock.
    Tick,
    Status {
        issued_at: u64,
        result: Result<StatusMap, ApiError>,
    },
    Saves(Result<Vec<SaveRecord>, ApiError>),
    Schema(Result<Schema, ApiError>),
    Versions(Result<Vec<String>, ApiError>),
    /// A successful create carries the server's record for the new save.
    ActionFinished {
        origin: Screen,
        action: Action,
        result: Result<Option<SaveRecord>, ApiError>,
    },
    Console {
        session: u64,
        attempt: u32,
        event: StreamEvent,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Last message for the status line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Wait before re-dialing a dropped console stream.
    pub reconnect_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

pub struct Session {
    config: SessionConfig,
    registry: SaveRegistry,
    selection: Selection,
    filter: String,
    poller: StatusPoller,
    console: Option<ConsoleSession>,
    next_console_id: u64,
    screen: Screen,
    history: History,
    version_callback: Option<VersionCallback>,
    schema: Option<Schema>,
    versions: Vec<String>,
    version_cursor: usize,
    create_form: CreateForm,
    modify_form: ModifyForm,
    delete_prompt: String,
    /// Screens with an action awaiting its response.
    busy: HashSet<Screen>,
    /// Local status writes so far; fleet snapshots are tagged with it.
    status_writes: u64,
    /// Save name to the write count of its last local status change.
    status_pins: HashMap<String, u64>,
    notice: Option<Notice>,
    effects: Vec<Effect>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("screen", &self.screen)
            .field("selected", &self.selection.current())
            .field("saves", &self.registry.len())
            .field("console", &self.console.as_ref().map(|c| c.id()))
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_poller(config, StatusPoller::default())
    }

    /// Starts on the saves screen with the poller active and the initial
    /// listing and schema requests queued.
    pub fn with_poller(config: SessionConfig, poller: StatusPoller) -> Self {
        let mut session = Self {
            config,
            registry: SaveRegistry::default(),
            selection: Selection::default(),
            filter: String::new(),
            poller,
            console: None,
            next_console_id: 1,
            screen: Screen::Saves,
            history: History::default(),
            version_callback: None,
            schema: None,
            versions: Vec::new(),
            version_cursor: 0,
            create_form: CreateForm::default(),
            modify_form: ModifyForm::default(),
            delete_prompt: String::new(),
            busy: HashSet::new(),
            status_writes: 0,
            status_pins: HashMap::new(),
            notice: None,
            effects: Vec::new(),
        };
        session.poller.start();
        session.effects.push(Effect::ListSaves);
        session.effects.push(Effect::LoadSchema);
        session
    }

    /// Takes every effect queued since the last drain, in order.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn registry(&self) -> &SaveRegistry {
        &self.registry
    }

    pub fn selected(&self) -> Option<&SaveRecord> {
        self.selection.current().and_then(|n| self.registry.get(n))
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selection.current()
    }

    pub fn actions(&self) -> ActionSet {
        self.selection.actions()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    pub fn console(&self) -> Option<&ConsoleSession> {
        self.console.as_ref()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn version_cursor(&self) -> usize {
        self.version_cursor
    }

    pub fn create_form(&self) -> &CreateForm {
        &self.create_form
    }

    pub fn create_form_mut(&mut self) -> &mut CreateForm {
        &mut self.create_form
    }

    pub fn modify_form(&self) -> &ModifyForm {
        &self.modify_form
    }

    pub fn modify_form_mut(&mut self) -> &mut ModifyForm {
        &mut self.modify_form
    }

    pub fn delete_prompt(&self) -> &str {
        &self.delete_prompt
    }

    /// True while an action submitted from the current screen awaits its
    /// response; that screen's inputs are disabled meanwhile.
    pub fn is_busy(&self) -> bool {
        self.busy.contains(&self.screen)
    }

    /// True while any action awaits its response.
    pub fn has_pending_action(&self) -> bool {
        !self.busy.is_empty()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        });
    }

    pub fn select(&mut self, name: &str) {
        self.selection.select(name, &self.registry, &self.filter);
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
    }

    pub fn select_step(&mut self, forward: bool) {
        self.selection.step(&self.registry, &self.filter, forward);
    }

    /// Changes the search filter; a selection it hides is dropped.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.selection.refresh(&self.registry, &self.filter);
    }

    /// Asks for a fresh save listing.
    pub fn reload(&mut self) {
        self.effects.push(Effect::ListSaves);
    }

    /// Re-validates the selection after a registry mutation.
    fn registry_changed(&mut self) {
        self.selection.refresh(&self.registry, &self.filter);
    }
}

#[cfg(test)]
mod tests;
