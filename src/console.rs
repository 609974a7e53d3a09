//! Resumable console session for one save.
//!
//! The session itself does no I/O: it tracks the byte cursor, the
//! transcript and the connection state machine, and hands the runtime a
//! [`ConnectRequest`] whenever a (re)connection is needed. Every event the
//! runtime reports carries the session id and connection attempt it was
//! issued for, so events from an abandoned connection are dropped.

use std::time::Duration;

use tracing::{debug, info, warn};

mod transcript;
pub use self::transcript::Transcript;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleState {
    Connecting,
    Streaming,
    Reconnecting,
    Closed,
}

impl ConsoleState {
    pub fn label(self) -> &'static str {
        match self {
            ConsoleState::Connecting => "connecting",
            ConsoleState::Streaming => "streaming",
            ConsoleState::Reconnecting => "reconnecting",
            ConsoleState::Closed => "closed",
        }
    }
}

/// Ask the runtime to open a stream at `cursor`, optionally after `delay`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectRequest {
    pub session: u64,
    pub attempt: u32,
    pub target: String,
    pub cursor: u64,
    pub delay: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// The reconnect delay elapsed and the connection is being dialed.
    Connecting,
    Connected,
    Chunk(Vec<u8>),
    /// Transport error or end of stream.
    Disconnected(String),
}

#[derive(Debug)]
pub struct ConsoleSession {
    id: u64,
    target: String,
    cursor: u64,
    attempt: u32,
    state: ConsoleState,
    transcript: Transcript,
    resumed: bool,
}

impl ConsoleSession {
    pub fn open(id: u64, target: impl Into<String>) -> (Self, ConnectRequest) {
        let target = target.into();
        info!(session = id, save = %target, "console session opened");
        let session = Self {
            id,
            target: target.clone(),
            cursor: 0,
            attempt: 0,
            state: ConsoleState::Connecting,
            transcript: Transcript::default(),
            resumed: false,
        };
        let request = ConnectRequest {
            session: id,
            attempt: 0,
            target,
            cursor: 0,
            delay: None,
        };
        (session, request)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn state(&self) -> ConsoleState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn is_current(&self, attempt: u32) -> bool {
        self.state != ConsoleState::Closed && attempt == self.attempt
    }

    /// Applies one event from connection `attempt`. Returns a follow-up
    /// connect request when the connection failed and must be retried.
    pub fn handle(
        &mut self,
        attempt: u32,
        event: StreamEvent,
        reconnect_delay: Duration,
    ) -> Option<ConnectRequest> {
        if !self.is_current(attempt) {
            debug!(session = self.id, attempt, "stale console event dropped");
            return None;
        }
        match event {
            StreamEvent::Connecting => {
                self.state = ConsoleState::Connecting;
                None
            }
            StreamEvent::Connected => {
                self.state = ConsoleState::Streaming;
                None
            }
            StreamEvent::Chunk(bytes) => {
                self.state = ConsoleState::Streaming;
                self.cursor += bytes.len() as u64;
                let fresh_line = std::mem::take(&mut self.resumed);
                self.transcript.push_chunk(&bytes, fresh_line);
                None
            }
            StreamEvent::Disconnected(reason) => {
                warn!(
                    session = self.id,
                    save = %self.target,
                    cursor = self.cursor,
                    "console stream lost: {reason}"
                );
                self.attempt += 1;
                self.state = ConsoleState::Reconnecting;
                self.resumed = true;
                Some(ConnectRequest {
                    session: self.id,
                    attempt: self.attempt,
                    target: self.target.clone(),
                    cursor: self.cursor,
                    delay: Some(reconnect_delay),
                })
            }
        }
    }

    /// Closes the session. Safe to call repeatedly; returns true only the
    /// first time.
    pub fn close(&mut self) -> bool {
        if self.state == ConsoleState::Closed {
            return false;
        }
        info!(session = self.id, save = %self.target, cursor = self.cursor, "console session closed");
        self.state = ConsoleState::Closed;
        true
    }
}
