//! Request payloads and the error taxonomy for the instance manager API.

use std::collections::BTreeMap;

use crate::model::schema::PropValue;

/// Structured failure body (`{err, desc}`); `status` is only set for
/// responses with an unexpected HTTP status.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("{err}: {desc}")]
pub struct Failure {
    pub err: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Failure {
    pub fn bad_status(status: u16) -> Self {
        Self {
            err: "BadStatus".to_string(),
            desc: "the server returned an unexpected status".to_string(),
            status: Some(status),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Network or decoding problem; never carries a server verdict.
    #[error("transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Failure(#[from] Failure),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ApiError::Transport(err.to_string())
    }

    /// Short message suitable for the status line.
    pub fn describe(&self) -> String {
        match self {
            ApiError::Transport(msg) => format!("connection problem: {msg}"),
            ApiError::Failure(f) if f.desc.is_empty() => f.err.clone(),
            ApiError::Failure(f) => format!("{} ({})", f.desc, f.err),
        }
    }
}

pub type Values = BTreeMap<String, PropValue>;

#[derive(Debug, serde::Serialize)]
pub(super) struct CreateSaveRequest<'a> {
    pub(super) name: &'a str,
    pub(super) version: &'a str,
    pub(super) values: &'a Values,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct ModifySaveRequest<'a> {
    pub(super) name: &'a str,
    pub(super) values: &'a Values,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct NameRequest<'a> {
    pub(super) name: &'a str,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct CommandRequest<'a> {
    pub(super) name: &'a str,
    pub(super) command: &'a str,
}
