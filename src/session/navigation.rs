use super::*;

impl Session {
    fn precondition(&self, screen: Screen) -> bool {
        let selected = self.selected();
        if screen.needs_selection() && selected.is_none() {
            return false;
        }
        match screen {
            Screen::Console => selected.is_some_and(|s| s.status != crate::model::SaveStatus::Offline),
            Screen::Version => self.version_callback.is_some(),
            Screen::Saves | Screen::Create | Screen::Modify | Screen::Delete => true,
        }
    }

    /// Moves to `screen` if it is not already current and its precondition
    /// holds. Returns whether the transition happened.
    ///
    /// `is_history_replay` marks transitions caused by going back; those do
    /// not record a history entry when leaving the saves screen.
    pub fn request_screen(&mut self, screen: Screen, is_history_replay: bool) -> bool {
        if screen == self.screen {
            return false;
        }
        if !self.precondition(screen) {
            debug!(from = ?self.screen, to = ?screen, "screen change refused");
            return false;
        }

        let outgoing = self.screen;
        self.close_console();
        if screen != Screen::Version {
            self.version_callback = None;
        }
        if !(is_history_replay && outgoing == Screen::Saves) {
            self.history.push(screen);
        }
        self.screen = screen;
        debug!(from = ?outgoing, to = ?screen, "screen changed");
        self.enter(screen);
        true
    }

    fn enter(&mut self, screen: Screen) {
        if screen == Screen::Saves {
            self.poller.start();
        } else {
            self.poller.stop();
        }
        match screen {
            Screen::Saves => {}
            Screen::Create => {
                self.selection.deselect();
                self.create_form.set_focus(CreateForm::NAME_ROW);
                if self.schema.is_none() {
                    self.effects.push(Effect::LoadSchema);
                }
                if self.versions.is_empty() {
                    self.effects.push(Effect::LoadVersions);
                }
            }
            Screen::Modify => self.rebuild_modify_form(),
            Screen::Delete => {
                let name = self.selection.current().unwrap_or_default();
                self.delete_prompt =
                    format!("Delete save \"{name}\"? Its world files will be removed for good.");
            }
            Screen::Console => self.open_console(),
            Screen::Version => {
                self.effects.push(Effect::LoadVersions);
                self.version_cursor = self
                    .versions
                    .iter()
                    .position(|v| *v == self.create_form.version)
                    .unwrap_or(0);
            }
        }
    }

    /// Populates the modify form from the selected save, or asks for the
    /// schema first when it has not arrived yet.
    pub(super) fn rebuild_modify_form(&mut self) {
        let form = match (&self.schema, self.selected()) {
            (Some(schema), Some(save)) => ModifyForm::for_save(schema, save),
            _ => ModifyForm::default(),
        };
        self.modify_form = form;
        if self.schema.is_none() {
            self.effects.push(Effect::LoadSchema);
        }
    }

    fn open_console(&mut self) {
        let Some(name) = self.selection.current().map(str::to_string) else {
            return;
        };
        let id = self.next_console_id;
        self.next_console_id += 1;
        let (console, request) = ConsoleSession::open(id, name);
        self.console = Some(console);
        self.effects.push(Effect::OpenConsole(request));
    }

    fn close_console(&mut self) {
        if let Some(mut console) = self.console.take()
            && console.close()
        {
            self.effects.push(Effect::CloseConsole {
                session: console.id(),
            });
        }
    }

    /// Goes back one history entry. The recorded screen is replayed when
    /// its precondition still holds, otherwise the saves screen is shown.
    /// Returns false when there is nothing left to go back to.
    pub fn navigate_back(&mut self) -> bool {
        let Some(recorded) = self.history.back() else {
            return false;
        };
        let target = recorded
            .filter(|s| self.precondition(*s))
            .unwrap_or(Screen::Saves);
        self.request_screen(target, true);
        true
    }

    /// Shows the version picker; `on_pick` runs exactly once, with the
    /// chosen version or `None` on cancel, unless another screen is
    /// requested first.
    pub fn open_version_picker(&mut self, on_pick: VersionCallback) -> bool {
        let previous = self.version_callback.replace(on_pick);
        if self.request_screen(Screen::Version, false) {
            return true;
        }
        self.version_callback = previous;
        false
    }

    /// Opens the picker for the create form's version field.
    pub fn pick_create_version(&mut self) -> bool {
        if self.screen != Screen::Create {
            return false;
        }
        self.open_version_picker(Box::new(|session: &mut Session, picked: Option<String>| {
            if let Some(version) = picked {
                session.create_form.version = version;
            }
            if !session.navigate_back() {
                session.request_screen(Screen::Create, false);
            }
            session
                .create_form
                .set_focus(CreateForm::VERSION_ROW);
        }))
    }

    /// Resolves the version picker: `Some` for a pick, `None` for cancel.
    pub fn finish_version_pick(&mut self, picked: Option<String>) {
        if self.screen != Screen::Version {
            return;
        }
        match self.version_callback.take() {
            Some(callback) => callback(self, picked),
            None => {
                self.navigate_back();
            }
        }
    }

    /// Picks the version under the cursor.
    pub fn choose_version(&mut self) {
        let picked = self.versions.get(self.version_cursor).cloned();
        if picked.is_some() {
            self.finish_version_pick(picked);
        }
    }

    pub fn move_version_cursor(&mut self, forward: bool) {
        let len = self.versions.len();
        if len == 0 {
            return;
        }
        self.version_cursor = if forward {
            (self.version_cursor + 1) % len
        } else {
            (self.version_cursor + len - 1) % len
        };
    }
}
