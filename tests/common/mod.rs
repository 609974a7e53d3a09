#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// In-process stand-in for the instance manager.
#[derive(Default)]
pub struct Fake {
    saves: Mutex<BTreeMap<String, Value>>,
    logs: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Cursor of every console connection, in arrival order.
    pub console_cursors: Mutex<Vec<u64>>,
    /// Next console connection closes after sending what it has.
    drop_next: Mutex<bool>,
    /// `/api/status` answers 500 while set.
    status_broken: Mutex<bool>,
    pub commands: Mutex<Vec<(String, String)>>,
}

impl Fake {
    pub fn add_save(&self, name: &str, status: &str, version: &str) {
        let record = json!({
            "name": name,
            "status": status,
            "mc-manager-server-version": version,
            "mc-manager-create-time": "2024-03-09 17:42:05",
            "mc-manager-access-time": "2024-03-10 08:00:00",
            "motd": "hello",
        });
        self.saves.lock().unwrap().insert(name.to_string(), record);
    }

    pub fn status_of(&self, name: &str) -> Option<String> {
        let saves = self.saves.lock().unwrap();
        saves
            .get(name)
            .and_then(|s| s["status"].as_str())
            .map(str::to_string)
    }

    pub fn record(&self, name: &str) -> Option<Value> {
        self.saves.lock().unwrap().get(name).cloned()
    }

    pub fn set_status(&self, name: &str, status: &str) {
        if let Some(save) = self.saves.lock().unwrap().get_mut(name) {
            save["status"] = json!(status);
        }
    }

    pub fn append_log(&self, name: &str, text: &str) {
        let mut logs = self.logs.lock().unwrap();
        logs.entry(name.to_string())
            .or_default()
            .extend_from_slice(text.as_bytes());
    }

    pub fn drop_next_console(&self) {
        *self.drop_next.lock().unwrap() = true;
    }

    pub fn break_status(&self, broken: bool) {
        *self.status_broken.lock().unwrap() = broken;
    }

    fn log_from(&self, name: &str, cursor: usize) -> Vec<u8> {
        let logs = self.logs.lock().unwrap();
        logs.get(name)
            .map(|log| log.get(cursor..).unwrap_or_default().to_vec())
            .unwrap_or_default()
    }
}

pub struct ServerGuard {
    pub base_url: Url,
    pub fake: Arc<Fake>,
    task: JoinHandle<()>,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn spawn_server() -> Result<ServerGuard> {
    let fake = Arc::new(Fake::default());
    let app = Router::new()
        .route("/api/status", get(status))
        .route("/api/saves", get(saves))
        .route("/api/schema", get(schema))
        .route("/api/versions", get(versions))
        .route("/api/create_save", post(create_save))
        .route("/api/modify_save", post(modify_save))
        .route("/api/delete_save", post(delete_save))
        .route("/api/start_save", post(start_save))
        .route("/api/stop_save", post(stop_save))
        .route("/api/command", post(command))
        .route("/api/console/:cursor/:name", get(console))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind fake manager")?;
    let addr = listener.local_addr().context("local addr")?;
    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let base_url = Url::parse(&format!("http://{addr}/")).context("parse base url")?;

    Ok(ServerGuard {
        base_url,
        fake,
        task,
    })
}

type Shared = State<Arc<Fake>>;

fn failure(err: &str, desc: &str) -> Response {
    (StatusCode::BAD_REQUEST, axum::Json(json!({"err": err, "desc": desc}))).into_response()
}

fn name_of(body: &Value) -> String {
    body["name"].as_str().unwrap_or_default().to_string()
}

async fn status(State(fake): Shared) -> Response {
    if *fake.status_broken.lock().unwrap() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({"err": "Internal", "desc": "status backend down"})),
        )
            .into_response();
    }
    let saves = fake.saves.lock().unwrap();
    let map: serde_json::Map<String, Value> = saves
        .iter()
        .map(|(name, save)| (name.clone(), save["status"].clone()))
        .collect();
    axum::Json(Value::Object(map)).into_response()
}

async fn saves(State(fake): Shared) -> Response {
    let saves = fake.saves.lock().unwrap();
    let list: Vec<Value> = saves.values().cloned().collect();
    axum::Json(json!({ "saves": list })).into_response()
}

async fn schema() -> Response {
    axum::Json(json!({
        "schema": {
            "motd": {"access": "write", "type": {"name": "string", "default": "A server"}, "label": "MOTD", "desc": "message of the day"},
            "pvp": {"access": "write", "type": {"name": "boolean", "default": true}, "label": "PvP", "desc": ""},
            "max-players": {"access": "write", "type": {"name": "integer", "default": 20, "min": 1, "max": 100}, "label": "Players", "desc": ""},
            "mc-manager-server-version": {"access": "read", "type": {"name": "string", "default": ""}, "label": "Version", "desc": ""}
        },
        "create_properties": ["motd", "pvp"]
    }))
    .into_response()
}

async fn versions() -> Response {
    axum::Json(json!(["1.20.4", "1.19.2"])).into_response()
}

async fn create_save(State(fake): Shared, axum::Json(body): axum::Json<Value>) -> Response {
    let name = name_of(&body);
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return failure("InvalidName", "names may only use letters, digits, '-' and '_'");
    }
    let mut saves = fake.saves.lock().unwrap();
    if saves.contains_key(&name) {
        return failure("SaveExists", "a save with that name already exists");
    }
    let mut record = json!({
        "name": name,
        "status": "offline",
        "mc-manager-server-version": body["version"],
        "mc-manager-create-time": "2024-05-01 12:00:00",
    });
    if let (Some(values), Some(out)) = (body["values"].as_object(), record.as_object_mut()) {
        for (k, v) in values {
            out.insert(k.clone(), v.clone());
        }
    }
    saves.insert(name, record.clone());
    axum::Json(record).into_response()
}

async fn modify_save(State(fake): Shared, axum::Json(body): axum::Json<Value>) -> Response {
    let name = name_of(&body);
    let mut saves = fake.saves.lock().unwrap();
    let Some(save) = saves.get_mut(&name).and_then(Value::as_object_mut) else {
        return failure("NoSuchSave", "no save with that name");
    };
    if let Some(values) = body["values"].as_object() {
        for (k, v) in values {
            save.insert(k.clone(), v.clone());
        }
    }
    StatusCode::OK.into_response()
}

async fn delete_save(State(fake): Shared, axum::Json(body): axum::Json<Value>) -> Response {
    let name = name_of(&body);
    let mut saves = fake.saves.lock().unwrap();
    match saves.get(&name).and_then(|s| s["status"].as_str()) {
        None => failure("NoSuchSave", "no save with that name"),
        Some("offline") => {
            saves.remove(&name);
            StatusCode::OK.into_response()
        }
        Some(_) => failure("SaveRunning", "stop the save first"),
    }
}

async fn start_save(State(fake): Shared, axum::Json(body): axum::Json<Value>) -> Response {
    transition(&fake, &name_of(&body), "offline", "loading")
}

async fn stop_save(State(fake): Shared, axum::Json(body): axum::Json<Value>) -> Response {
    transition(&fake, &name_of(&body), "online", "shutdown")
}

fn transition(fake: &Fake, name: &str, from: &str, to: &str) -> Response {
    let mut saves = fake.saves.lock().unwrap();
    let Some(save) = saves.get_mut(name) else {
        return failure("NoSuchSave", "no save with that name");
    };
    if save["status"] != json!(from) {
        return failure("WrongState", "the save is busy");
    }
    save["status"] = json!(to);
    StatusCode::OK.into_response()
}

async fn command(State(fake): Shared, axum::Json(body): axum::Json<Value>) -> Response {
    let name = name_of(&body);
    let line = body["command"].as_str().unwrap_or_default().to_string();
    if fake.status_of(&name).as_deref() != Some("online") {
        return failure("NotRunning", "the save is not running");
    }
    fake.append_log(&name, &format!("[cmd] {line}\n"));
    fake.commands.lock().unwrap().push((name, line));
    StatusCode::OK.into_response()
}

async fn console(
    ws: WebSocketUpgrade,
    Path((cursor, name)): Path<(u64, String)>,
    State(fake): Shared,
) -> Response {
    fake.console_cursors.lock().unwrap().push(cursor);
    ws.on_upgrade(move |socket| serve_console(socket, fake, name, cursor as usize))
}

async fn serve_console(mut socket: WebSocket, fake: Arc<Fake>, name: String, mut sent: usize) {
    loop {
        let pending = fake.log_from(&name, sent);
        if !pending.is_empty() {
            sent += pending.len();
            if socket.send(Message::Binary(pending)).await.is_err() {
                return;
            }
        }
        let drop_now = std::mem::take(&mut *fake.drop_next.lock().unwrap());
        if drop_now {
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
