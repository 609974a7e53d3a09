//! Executes session effects on the tokio runtime and reports completions
//! back over the event channel.

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::console::{ConnectRequest, StreamEvent};
use crate::remote::ApiClient;
use crate::remote::stream::{console_url, run_console_stream};
use crate::session::{Action, AppEvent, Effect};

pub struct Runtime {
    client: ApiClient,
    tx: UnboundedSender<AppEvent>,
    /// Console session id and the token that cancels its stream task.
    console: Option<(u64, CancellationToken)>,
}

impl Runtime {
    pub fn new(client: ApiClient, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            client,
            tx,
            console: None,
        }
    }

    pub fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::FetchStatus { issued_at } => self.spawn(move |client| async move {
                AppEvent::Status {
                    issued_at,
                    result: client.fleet_status().await,
                }
            }),
            Effect::ListSaves => {
                self.spawn(|client| async move { AppEvent::Saves(client.list_saves().await) })
            }
            Effect::LoadSchema => {
                self.spawn(|client| async move { AppEvent::Schema(client.schema().await) })
            }
            Effect::LoadVersions => {
                self.spawn(|client| async move { AppEvent::Versions(client.versions().await) })
            }
            Effect::Perform { origin, action } => self.spawn(move |client| async move {
                let result = perform(&client, &action).await;
                AppEvent::ActionFinished {
                    origin,
                    action,
                    result,
                }
            }),
            Effect::OpenConsole(request) => self.open_console(request),
            Effect::CloseConsole { session } => {
                if let Some((id, token)) = self.console.take() {
                    if id == session {
                        token.cancel();
                    } else {
                        self.console = Some((id, token));
                    }
                }
            }
        }
    }

    fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: std::future::Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let fut = job(self.client.clone());
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    fn open_console(&mut self, request: ConnectRequest) {
        let token = match &self.console {
            Some((id, token)) if *id == request.session => token.clone(),
            _ => {
                if let Some((_, stale)) = self.console.take() {
                    stale.cancel();
                }
                let token = CancellationToken::new();
                self.console = Some((request.session, token.clone()));
                token
            }
        };

        let ConnectRequest {
            session,
            attempt,
            target,
            cursor,
            delay,
        } = request;
        let tx = self.tx.clone();
        let emit = move |event| {
            let _ = tx.send(AppEvent::Console {
                session,
                attempt,
                event,
            });
        };

        let url = match console_url(self.client.base(), cursor, &target) {
            Ok(url) => url,
            Err(err) => {
                warn!("console_url_error: {err}");
                emit(StreamEvent::Disconnected(err.to_string()));
                return;
            }
        };
        debug!(session, attempt, %url, "console dial");
        tokio::spawn(run_console_stream(url, delay, token, emit));
    }

    /// Cancels the console stream, if any.
    pub fn shutdown(&mut self) {
        if let Some((_, token)) = self.console.take() {
            token.cancel();
        }
    }
}

async fn perform(
    client: &ApiClient,
    action: &Action,
) -> Result<Option<crate::model::SaveRecord>, crate::remote::ApiError> {
    match action {
        Action::Create {
            name,
            version,
            values,
        } => client.create_save(name, version, values).await.map(Some),
        Action::Modify { name, values } => client.modify_save(name, values).await.map(|_| None),
        Action::Delete { name } => client.delete_save(name).await.map(|_| None),
        Action::Start { name } => client.start_save(name).await.map(|_| None),
        Action::Stop { name } => client.stop_save(name).await.map(|_| None),
        Action::Command { name, command } => {
            client.send_command(name, command).await.map(|_| None)
        }
    }
}
