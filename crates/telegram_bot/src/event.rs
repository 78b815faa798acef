//! Inbound events, decoded at the boundary.

use crate::{
    commands::{Command, parse_command},
    pagination::Direction,
};

/// A raw event received from the transport for one chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: i64,
    pub kind: InboundKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundKind {
    Text(String),
    Button { callback_id: String, data: String },
}

impl Inbound {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            kind: InboundKind::Text(text.into()),
        }
    }

    pub fn button(chat_id: i64, callback_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            chat_id,
            kind: InboundKind::Button {
                callback_id: callback_id.into(),
                data: data.into(),
            },
        }
    }

    pub(crate) fn callback_id(&self) -> Option<&str> {
        match &self.kind {
            InboundKind::Button { callback_id, .. } => Some(callback_id),
            InboundKind::Text(_) => None,
        }
    }
}

/// Payload carried by an inline button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// Enter the budget flow directly at the amount prompt for the current
    /// month.
    SetCurrentBudget,
    /// Move the search window from `offset`.
    SearchPage { direction: Direction, offset: usize },
}

impl ButtonAction {
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(':');
        let action = match (parts.next()?, parts.next()?) {
            ("budget", "set_current") => Self::SetCurrentBudget,
            ("search", direction) => {
                let direction = match direction {
                    "next" => Direction::Next,
                    "prev" => Direction::Prev,
                    _ => return None,
                };
                let offset = parts.next()?.parse().ok()?;
                Self::SearchPage { direction, offset }
            }
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(action)
    }

    #[must_use]
    pub fn data(self) -> String {
        match self {
            Self::SetCurrentBudget => "budget:set_current".to_string(),
            Self::SearchPage { direction, offset } => {
                format!("search:{}:{offset}", direction.as_str())
            }
        }
    }
}

/// What the conversation layer sees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    /// Slash-prefixed text that is not one of our commands.
    UnknownCommand(String),
    Text(String),
    Button(ButtonAction),
    /// A button whose payload is not understood, e.g. from an older message.
    UnknownButton,
}

impl Event {
    pub fn decode(kind: &InboundKind) -> Self {
        match kind {
            InboundKind::Text(text) => match parse_command(text) {
                Some(command) => Self::Command(command),
                None if text.trim_start().starts_with('/') => {
                    Self::UnknownCommand(text.trim().to_string())
                }
                None => Self::Text(text.trim().to_string()),
            },
            InboundKind::Button { data, .. } => ButtonAction::parse(data)
                .map(Self::Button)
                .unwrap_or(Self::UnknownButton),
        }
    }
}
