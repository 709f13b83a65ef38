//! Errors returned by inbound intent handlers

use super::player::PlayerId;

/// Rejection of a client intent.
///
/// Soft failures are reported back on the request's ack; protocol
/// violations get the connection closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Invalid chat message.")]
    InvalidChat,

    #[error("Invalid name.")]
    InvalidName,

    #[error("Team is full.")]
    TeamFull,

    #[error("Rate limited.")]
    RateLimited,

    #[error("Player {0} already has an avatar.")]
    AlreadyOnTeam(PlayerId),

    #[error("Unknown team index {0}.")]
    UnknownTeam(i64),

    #[error("Unknown player {0}.")]
    UnknownPlayer(PlayerId),
}

impl ActionError {
    /// Malformed or hostile input: the session must be terminated
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::AlreadyOnTeam(_) | Self::UnknownTeam(_))
    }
}
