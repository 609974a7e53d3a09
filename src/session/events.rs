use super::*;

impl Session {
    /// Applies one asynchronous completion or clock tick.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.on_tick(),
            AppEvent::Status { issued_at, result } => self.on_status(issued_at, result),
            AppEvent::Saves(result) => match result {
                Ok(saves) => {
                    info!(count = saves.len(), "save list loaded");
                    self.registry.replace_all(saves);
                    self.registry_changed();
                }
                Err(err) => {
                    warn!("list_saves_error: {err}");
                    self.error(format!("could not list saves: {}", err.describe()));
                }
            },
            AppEvent::Schema(result) => match result {
                Ok(schema) => self.on_schema(schema),
                Err(err) => {
                    warn!("schema_error: {err}");
                    self.error(format!("could not load properties: {}", err.describe()));
                }
            },
            AppEvent::Versions(result) => match result {
                Ok(versions) => self.on_versions(versions),
                Err(err) => {
                    warn!("versions_error: {err}");
                    self.error(format!("could not list versions: {}", err.describe()));
                }
            },
            AppEvent::ActionFinished {
                origin,
                action,
                result,
            } => self.action_finished(origin, action, result),
            AppEvent::Console {
                session,
                attempt,
                event,
            } => self.on_console(session, attempt, event),
        }
    }

    fn on_tick(&mut self) {
        if self.poller.tick(self.registry.has_transition()) {
            self.effects.push(Effect::FetchStatus {
                issued_at: self.status_writes,
            });
        }
    }

    fn on_status(&mut self, issued_at: u64, result: Result<StatusMap, ApiError>) {
        match result {
            Ok(mut statuses) => {
                // Saves written locally after this fetch was issued keep
                // their live status.
                for (name, &written) in &self.status_pins {
                    if written > issued_at
                        && let Some(live) = self.registry.status(name)
                    {
                        debug!(save = %name, "stale status snapshot ignored");
                        statuses.insert(name.clone(), live);
                    }
                }
                self.status_pins.retain(|_, written| *written > issued_at);
                let changes = self.registry.reconcile(&statuses);
                for change in &changes {
                    info!(
                        save = %change.name,
                        from = change.from.as_str(),
                        to = change.to.as_str(),
                        "status changed"
                    );
                }
                if !changes.is_empty() {
                    self.registry_changed();
                }
                self.poller.complete(true, self.registry.has_transition());
            }
            Err(err) => {
                warn!("status_poll_error: {err}");
                self.poller.complete(false, self.registry.has_transition());
            }
        }
    }

    fn on_schema(&mut self, schema: Schema) {
        info!(properties = schema.props.len(), "property schema loaded");
        let mut form = CreateForm::from_schema(&schema);
        form.name = std::mem::take(&mut self.create_form.name);
        form.version = std::mem::take(&mut self.create_form.version);
        form.set_focus(self.create_form.focus_row());
        self.create_form = form;
        self.schema = Some(schema);
        if self.screen == Screen::Modify {
            self.rebuild_modify_form();
        }
    }

    fn on_versions(&mut self, versions: Vec<String>) {
        debug!(count = versions.len(), "versions loaded");
        if self.create_form.version.trim().is_empty()
            && let Some(latest) = versions.first()
        {
            self.create_form.version = latest.clone();
        }
        if self.screen == Screen::Version {
            self.version_cursor = versions
                .iter()
                .position(|v| *v == self.create_form.version)
                .unwrap_or(0);
        } else {
            self.version_cursor = self.version_cursor.min(versions.len().saturating_sub(1));
        }
        self.versions = versions;
    }

    fn on_console(&mut self, session: u64, attempt: u32, event: StreamEvent) {
        let Some(console) = self.console.as_mut().filter(|c| c.id() == session) else {
            debug!(session, attempt, "event for a closed console dropped");
            return;
        };
        if let Some(request) = console.handle(attempt, event, self.config.reconnect_delay) {
            self.effects.push(Effect::OpenConsole(request));
        }
    }
}
