//! WebSocket transport for the live console.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::ApiError;
use crate::console::StreamEvent;

/// `ws(s)://<host>/<prefix>/api/console/<cursor>/<save>`
pub fn console_url(base: &Url, cursor: u64, save: &str) -> Result<Url, ApiError> {
    let mut url = base.clone();
    let scheme = match base.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| ApiError::transport(format!("cannot derive websocket url from {base}")))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ApiError::transport(format!("{base} cannot be a base url")))?;
        segments
            .pop_if_empty()
            .extend(["api", "console", &cursor.to_string(), save]);
    }
    url.set_query(None);
    Ok(url)
}

/// Runs one connection attempt: waits `delay`, dials, then forwards every
/// message as a chunk until the stream fails or ends. Cancellation is
/// checked at every suspension point and ends the attempt silently.
pub async fn run_console_stream(
    url: Url,
    delay: Option<Duration>,
    cancel: CancellationToken,
    mut emit: impl FnMut(StreamEvent),
) {
    if let Some(delay) = delay {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
        emit(StreamEvent::Connecting);
    }

    let connect = tokio::select! {
        _ = cancel.cancelled() => return,
        res = connect_async(url.as_str()) => res,
    };
    let (mut ws, _) = match connect {
        Ok(value) => value,
        Err(err) => {
            emit(StreamEvent::Disconnected(format!("connect: {err}")));
            return;
        }
    };
    emit(StreamEvent::Connected);

    loop {
        let msg = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%url, "console stream cancelled");
                let _ = ws.close(None).await;
                return;
            }
            msg = ws.next() => msg,
        };
        match msg {
            Some(Ok(Message::Text(text))) => emit(StreamEvent::Chunk(text.into_bytes())),
            Some(Ok(Message::Binary(bytes))) => emit(StreamEvent::Chunk(bytes)),
            Some(Ok(Message::Ping(payload))) => {
                let _ = ws.send(Message::Pong(payload)).await;
            }
            Some(Ok(Message::Close(_))) | None => {
                emit(StreamEvent::Disconnected("stream ended".to_string()));
                return;
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                emit(StreamEvent::Disconnected(err.to_string()));
                return;
            }
        }
    }
}
