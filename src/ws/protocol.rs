//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::ball::BallState;
use crate::game::error::ActionError;
use crate::game::player::{Avatar, Player, PlayerId};
use crate::game::r#match::MatchState;
use crate::game::snapshot::{AvatarSnapshot, GameSnapshot};
use crate::game::AvatarInput;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Chat line for everyone
    Chat {
        text: String,
        /// Request id echoed in the `ack` reply
        #[serde(default)]
        ack: Option<u32>,
    },

    /// Change display name
    SetName {
        name: String,
        #[serde(default)]
        ack: Option<u32>,
    },

    /// Leave the lobby for a team
    JoinTeam {
        team_index: i64,
        #[serde(default)]
        ack: Option<u32>,
    },

    /// Movement, aim, jump and catch intent
    Input(AvatarInput),

    /// Release the ball (ignored unless holding it)
    ThrowBall,

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

impl ClientMsg {
    /// Request id for messages that get a reply
    pub fn ack_id(&self) -> Option<u32> {
        match self {
            Self::Chat { ack, .. } | Self::SetName { ack, .. } | Self::JoinTeam { ack, .. } => *ack,
            _ => None,
        }
    }

    /// Error ack for a request turned away before it reached the game
    pub fn rejection(&self, error: &ActionError) -> Option<ServerMsg> {
        self.ack_id().map(|ack| ServerMsg::Ack {
            ack,
            error: Some(error.to_string()),
        })
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Full state and own id, sent once on connect
    Welcome {
        state: GameSnapshot,
        player_id: PlayerId,
    },

    AddPlayer {
        player: Player,
    },

    RemovePlayer {
        player_id: PlayerId,
    },

    Chat {
        player_id: PlayerId,
        text: String,
    },

    SetName {
        player_id: PlayerId,
        name: String,
    },

    JoinTeam {
        player_id: PlayerId,
        avatar: Avatar,
    },

    CatchBall {
        player_id: PlayerId,
    },

    ThrowBall {
        ball: BallState,
    },

    /// A basket went in
    Score {
        team_index: usize,
        /// Last player to have caught the ball
        scorer_id: Option<PlayerId>,
        scores: [u32; 2],
    },

    MatchStarted {
        #[serde(rename = "match")]
        match_state: MatchState,
        ball: BallState,
    },

    MatchEnded {
        scores: [u32; 2],
    },

    /// Per-tick world state
    Snapshot {
        tick: u64,
        ball: BallState,
        avatars: Vec<AvatarSnapshot>,
        #[serde(rename = "match")]
        match_state: Option<MatchState>,
    },

    /// Reply to a request carrying an ack id (`error` is null on success)
    Ack {
        ack: u32,
        error: Option<String>,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}
