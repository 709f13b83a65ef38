//! Player lifecycle: connect, disconnect, rename, chat

use tracing::{debug, info};

use crate::ws::protocol::ServerMsg;

use super::constants::{CHAT_MAX_LEN, NAME_MAX_LEN};
use super::error::ActionError;
use super::player::PlayerId;
use super::state::GameState;

/// Length check in characters, not bytes
fn valid_len(text: &str, max: usize) -> bool {
    (1..=max).contains(&text.chars().count())
}

impl GameState {
    /// Register a new lobby player, announce it, and queue its welcome
    pub fn create_player(&mut self) -> PlayerId {
        let name = self.guest_name();
        let player_id = self.registry.insert(name);

        if let Some(player) = self.registry.get(player_id).cloned() {
            info!(player_id, name = %player.name, "Player connected");
            self.broadcast_except(player_id, ServerMsg::AddPlayer { player });
        }

        let state = self.full_snapshot();
        self.send_to(player_id, ServerMsg::Welcome { state, player_id });
        player_id
    }

    /// Tear down a player. A held ball is thrown first so it never leaves with its holder.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), ActionError> {
        if self.registry.get(player_id).is_none() {
            return Err(ActionError::UnknownPlayer(player_id));
        }

        if self.ball.is_held_by(player_id) {
            self.throw_ball(player_id)?;
        }

        self.registry.remove(player_id);
        info!(
            player_id,
            remaining = self.registry.len(),
            active = self.registry.active_count(),
            "Player disconnected"
        );
        self.broadcast(ServerMsg::RemovePlayer { player_id });

        if self.is_running() && self.registry.active_count() <= 1 {
            self.end_match();
        }
        Ok(())
    }

    pub fn rename(&mut self, player_id: PlayerId, name: String) -> Result<(), ActionError> {
        if !valid_len(&name, NAME_MAX_LEN) {
            return Err(ActionError::InvalidName);
        }
        let player = self
            .registry
            .get_mut(player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;

        debug!(player_id, old = %player.name, new = %name, "Player renamed");
        player.name = name.clone();
        self.broadcast(ServerMsg::SetName { player_id, name });
        Ok(())
    }

    /// Relay a chat line verbatim
    pub fn chat(&mut self, player_id: PlayerId, text: String) -> Result<(), ActionError> {
        if !valid_len(&text, CHAT_MAX_LEN) {
            return Err(ActionError::InvalidChat);
        }
        if self.registry.get(player_id).is_none() {
            return Err(ActionError::UnknownPlayer(player_id));
        }

        self.broadcast(ServerMsg::Chat { player_id, text });
        Ok(())
    }
}
