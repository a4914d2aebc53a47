//! UI-agnostic conversation state types
//!
//! These are what a front-end renders: the turns of the conversation and the
//! connectivity badge. They carry no presentation details.

use serde::{Deserialize, Serialize};

use crate::api::ResponseData;

/// A single turn in the assistant conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            data: None,
        }
    }

    pub fn assistant(text: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            data,
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Whether the assistant API answered the last time we talked to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}
