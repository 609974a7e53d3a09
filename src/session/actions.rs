use super::*;
use crate::model::SaveStatus;
use crate::selection::PlayAction;

impl Session {
    fn perform(&mut self, action: Action) {
        info!(action = action.verb(), save = action.target(), "request sent");
        self.busy.insert(self.screen);
        self.effects.push(Effect::Perform {
            origin: self.screen,
            action,
        });
    }

    /// Submits the create form. An invalid field is reported and focused
    /// without contacting the server.
    pub fn submit_create(&mut self) -> bool {
        if self.screen != Screen::Create || self.is_busy() {
            return false;
        }
        match self.create_form.build() {
            Ok((name, version, values)) => {
                self.clear_notice();
                self.perform(Action::Create {
                    name,
                    version,
                    values,
                });
                true
            }
            Err(err) => {
                self.create_form.set_focus(err.row());
                self.error(err.to_string());
                false
            }
        }
    }

    pub fn submit_modify(&mut self) -> bool {
        if self.screen != Screen::Modify || self.is_busy() {
            return false;
        }
        let name = self.modify_form.target().to_string();
        if name.is_empty() {
            return false;
        }
        match self.modify_form.build() {
            Ok(values) => {
                self.clear_notice();
                self.perform(Action::Modify { name, values });
                true
            }
            Err(err) => {
                self.modify_form.set_focus(err.row());
                self.error(err.to_string());
                false
            }
        }
    }

    pub fn confirm_delete(&mut self) -> bool {
        if self.screen != Screen::Delete || self.is_busy() {
            return false;
        }
        let Some(name) = self.selection.current().map(str::to_string) else {
            return false;
        };
        self.perform(Action::Delete { name });
        true
    }

    /// Starts an offline save or stops an online one, whichever the
    /// selection currently allows.
    pub fn toggle_play(&mut self) -> bool {
        if self.screen != Screen::Saves || self.is_busy() {
            return false;
        }
        let (Some(name), Some(play)) = (self.selection.current(), self.selection.actions().play)
        else {
            return false;
        };
        let name = name.to_string();
        self.perform(match play {
            PlayAction::Start => Action::Start { name },
            PlayAction::Stop => Action::Stop { name },
        });
        true
    }

    /// Sends one line to the open console.
    pub fn send_command(&mut self, line: &str) -> bool {
        let command = line.trim();
        if self.screen != Screen::Console || command.is_empty() {
            return false;
        }
        let Some(console) = &self.console else {
            return false;
        };
        let name = console.target().to_string();
        self.effects.push(Effect::Perform {
            origin: Screen::Console,
            action: Action::Command {
                name,
                command: command.to_string(),
            },
        });
        true
    }

    /// Applies the outcome of a request issued by [`Self::perform`].
    ///
    /// Registry updates always land; moving to another screen only happens
    /// while the operator is still on the screen that issued the request.
    pub(super) fn action_finished(
        &mut self,
        origin: Screen,
        action: Action,
        result: Result<Option<SaveRecord>, ApiError>,
    ) {
        if !matches!(action, Action::Command { .. }) {
            self.busy.remove(&origin);
        }
        let still_there = self.screen == origin;

        let created = match result {
            Ok(created) => created,
            Err(err) => {
                warn!(
                    action = action.verb(),
                    save = action.target(),
                    "request failed: {err}"
                );
                self.error(format!(
                    "could not {} {}: {}",
                    action.verb(),
                    action.target(),
                    err.describe()
                ));
                return;
            }
        };

        match action {
            Action::Create { name, .. } => {
                let record = created.unwrap_or_else(|| SaveRecord::new(name, SaveStatus::Offline));
                let name = record.name.clone();
                self.registry.upsert(record);
                self.registry_changed();
                if still_there {
                    if let Some(schema) = &self.schema {
                        self.create_form = CreateForm::from_schema(schema);
                    }
                    self.request_screen(Screen::Saves, false);
                    self.select(&name);
                }
                self.info(format!("created {name}"));
            }
            Action::Modify { name, values } => {
                self.registry.merge_metadata(
                    &name,
                    values.iter().map(|(k, v)| (k.clone(), v.to_json())),
                );
                self.registry_changed();
                if still_there {
                    self.request_screen(Screen::Saves, false);
                }
                self.info(format!("saved settings of {name}"));
            }
            Action::Delete { name } => {
                self.registry.remove(&name);
                self.registry_changed();
                if still_there {
                    self.request_screen(Screen::Saves, false);
                }
                self.info(format!("deleted {name}"));
            }
            Action::Start { name } => self.write_status(name, SaveStatus::Loading),
            Action::Stop { name } => self.write_status(name, SaveStatus::Shutdown),
            Action::Command { .. } => {}
        }
    }

    /// Applies a status confirmed by a successful request. Fleet snapshots
    /// issued before this write no longer override the save.
    fn write_status(&mut self, name: String, status: SaveStatus) {
        self.status_writes += 1;
        self.registry.set_status(&name, status);
        self.status_pins.insert(name, self.status_writes);
        self.registry_changed();
    }
}
