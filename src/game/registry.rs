//! Session/player registry and team rosters

use std::collections::BTreeMap;

use super::constants::TEAM_COUNT;
use super::player::{Avatar, Player, PlayerId, Team};

/// Owns every connected player record.
///
/// Ids are handed out in increasing order, so iterating the map yields
/// players in connection order.
#[derive(Debug)]
pub struct PlayerRegistry {
    next_id: PlayerId,
    players: BTreeMap<PlayerId, Player>,
    /// Players with an avatar, in join order
    active: Vec<PlayerId>,
    teams: [Team; TEAM_COUNT],
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            players: BTreeMap::new(),
            active: Vec::new(),
            teams: [Team::new(0), Team::new(1)],
        }
    }

    /// Register a new lobby player and return its id
    pub fn insert(&mut self, name: String) -> PlayerId {
        let id = self.next_id;
        self.next_id += 1;
        self.players.insert(id, Player::new(id, name));
        id
    }

    /// Drop a player from the registry, its team and the active list
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        if let Some(avatar) = &player.avatar {
            self.teams[avatar.team_index].remove(id);
            self.active.retain(|&active_id| active_id != id);
        }
        Some(player)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn avatar(&self, id: PlayerId) -> Option<&Avatar> {
        self.players.get(&id).and_then(|p| p.avatar.as_ref())
    }

    pub fn team(&self, team_index: usize) -> Option<&Team> {
        self.teams.get(team_index)
    }

    /// Attach a freshly spawned avatar and enrol the player on its team.
    /// Callers check capacity and prior membership first.
    pub fn assign_avatar(&mut self, id: PlayerId, team_index: usize) -> Option<&Avatar> {
        let team = self.teams.get_mut(team_index)?;
        let player = self.players.get_mut(&id)?;

        team.players.push(id);
        self.active.push(id);
        player.avatar = Some(Avatar::spawn(team.index, team.players.len() - 1));
        player.avatar.as_ref()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn active_ids(&self) -> &[PlayerId] {
        &self.active
    }

    pub fn active_avatars_mut(&mut self) -> impl Iterator<Item = &mut Avatar> {
        self.players.values_mut().filter_map(|p| p.avatar.as_mut())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active players on each team
    pub fn team_counts(&self) -> [usize; TEAM_COUNT] {
        let mut counts = [0; TEAM_COUNT];
        for avatar in self.players.values().filter_map(|p| p.avatar.as_ref()) {
            counts[avatar.team_index] += 1;
        }
        counts
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry = PlayerRegistry::new();
        let a = registry.insert("a".to_string());
        let b = registry.insert("b".to_string());
        registry.remove(a);
        let c = registry.insert("c".to_string());

        assert_eq!((a, b, c), (0, 1, 2));
        let order: Vec<PlayerId> = registry.players().map(|p| p.id).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_assign_avatar_enrols_on_team() {
        let mut registry = PlayerRegistry::new();
        let a = registry.insert("a".to_string());
        let b = registry.insert("b".to_string());

        registry.assign_avatar(a, 0);
        registry.assign_avatar(b, 0);

        assert_eq!(registry.team(0).map(|t| t.players.clone()), Some(vec![a, b]));
        assert_eq!(registry.active_ids(), &[a, b]);
        assert_eq!(registry.team_counts(), [2, 0]);
        // second slot sits at the centre line
        assert_eq!(registry.avatar(b).map(|av| av.z), Some(0.0));
    }

    #[test]
    fn test_remove_clears_team_and_active_list() {
        let mut registry = PlayerRegistry::new();
        let a = registry.insert("a".to_string());
        let b = registry.insert("b".to_string());
        registry.assign_avatar(a, 1);
        registry.assign_avatar(b, 0);

        let removed = registry.remove(a);

        assert!(removed.is_some());
        assert!(registry.get(a).is_none());
        assert_eq!(registry.active_ids(), &[b]);
        assert!(registry.team(1).map(|t| t.players.is_empty()).unwrap_or(false));
        assert!(registry.remove(a).is_none());
    }

    #[test]
    fn test_lobby_players_are_not_active() {
        let mut registry = PlayerRegistry::new();
        registry.insert("lobby".to_string());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.team_counts(), [0, 0]);
    }
}
