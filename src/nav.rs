//! Screens and the browser-like navigation history.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Saves,
    Create,
    Modify,
    Delete,
    Console,
    Version,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Saves => "Saves",
            Screen::Create => "Create save",
            Screen::Modify => "Modify save",
            Screen::Delete => "Delete save",
            Screen::Console => "Console",
            Screen::Version => "Choose version",
        }
    }

    /// Screens that act on the selected save.
    pub fn needs_selection(self) -> bool {
        matches!(self, Screen::Modify | Screen::Delete | Screen::Console)
    }
}

/// Ordered list of visited screens with a cursor, like a browser's session
/// history. The first entry carries no screen (the page as first loaded);
/// it resolves to [`Screen::Saves`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    entries: Vec<Option<Screen>>,
    index: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            entries: vec![None],
            index: 0,
        }
    }
}

impl History {
    /// Records `screen` after the current entry, dropping any forward
    /// entries. Re-recording the current screen is a no-op.
    pub fn push(&mut self, screen: Screen) {
        if self.current().unwrap_or_default() == screen {
            return;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(Some(screen));
        self.index = self.entries.len() - 1;
    }

    /// Steps back one entry and returns what it recorded. `None` means the
    /// cursor is already on the first entry.
    pub fn back(&mut self) -> Option<Option<Screen>> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index])
    }

    pub fn current(&self) -> Option<Screen> {
        self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
