//! Which save is selected, and what the operator may do with it.

use crate::model::SaveStatus;
use crate::registry::SaveRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayAction {
    Start,
    Stop,
}

impl PlayAction {
    pub fn label(self) -> &'static str {
        match self {
            PlayAction::Start => "start",
            PlayAction::Stop => "stop",
        }
    }
}

/// Actions enabled for the current selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionSet {
    pub play: Option<PlayAction>,
    pub modify: bool,
    pub delete: bool,
    pub console: bool,
}

impl ActionSet {
    pub fn for_status(status: SaveStatus) -> Self {
        match status {
            SaveStatus::Offline => ActionSet {
                play: Some(PlayAction::Start),
                modify: true,
                delete: true,
                console: false,
            },
            SaveStatus::Online => ActionSet {
                play: Some(PlayAction::Stop),
                modify: false,
                delete: false,
                console: true,
            },
            // Mid-transition: no config changes and no re-triggering.
            SaveStatus::Loading | SaveStatus::Shutdown => ActionSet {
                play: None,
                modify: false,
                delete: false,
                console: true,
            },
        }
    }
}

/// Case-insensitive substring match; an empty filter matches everything.
pub fn matches_filter(name: &str, filter: &str) -> bool {
    let filter = filter.trim();
    filter.is_empty() || name.to_lowercase().contains(&filter.to_lowercase())
}

/// Names visible under `filter`, in registry (name) order.
pub fn visible_names<'a>(registry: &'a SaveRegistry, filter: &str) -> Vec<&'a str> {
    registry
        .iter()
        .filter(|r| matches_filter(&r.name, filter))
        .map(|r| r.name.as_str())
        .collect()
}

#[derive(Debug, Default)]
pub struct Selection {
    current: Option<String>,
    actions: ActionSet,
}

impl Selection {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn actions(&self) -> ActionSet {
        self.actions
    }

    /// Selects `name` and recomputes the enabled actions, even when it is
    /// already selected. A name that is unknown or hidden by the filter
    /// deselects instead.
    pub fn select(&mut self, name: &str, registry: &SaveRegistry, filter: &str) {
        let status = match registry.status(name) {
            Some(status) if matches_filter(name, filter) => status,
            _ => {
                self.deselect();
                return;
            }
        };
        if self.current.as_deref() != Some(name) {
            self.current = Some(name.to_string());
        }
        self.actions = ActionSet::for_status(status);
    }

    pub fn deselect(&mut self) {
        self.current = None;
        self.actions = ActionSet::default();
    }

    /// Re-validates the selection against the live registry and filter.
    pub fn refresh(&mut self, registry: &SaveRegistry, filter: &str) {
        if let Some(name) = self.current.clone() {
            self.select(&name, registry, filter);
        }
    }

    /// Moves to the next (or previous) visible save, wrapping around.
    pub fn step(&mut self, registry: &SaveRegistry, filter: &str, forward: bool) {
        let names = visible_names(registry, filter);
        if names.is_empty() {
            self.deselect();
            return;
        }
        let next = match self
            .current
            .as_deref()
            .and_then(|cur| names.iter().position(|n| *n == cur))
        {
            Some(i) if forward => (i + 1) % names.len(),
            Some(i) => (i + names.len() - 1) % names.len(),
            None if forward => 0,
            None => names.len() - 1,
        };
        let name = names[next].to_string();
        self.select(&name, registry, filter);
    }
}
