//! Game actor: the single writer of all game state

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::util::time::tick_duration;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::error::ActionError;
use super::player::PlayerId;
use super::snapshot::SnapshotBuilder;
use super::state::{Dispatch, GameState};

/// Outbound side of a client session
pub trait Connection: Send {
    /// Queue a message; must not block
    fn send(&self, msg: ServerMsg);
    /// Terminate the session
    fn close(&self);
}

/// Work items for the game actor
pub enum GameCommand {
    /// New session; replies with the assigned player id
    Connect {
        connection: Box<dyn Connection>,
        reply: oneshot::Sender<PlayerId>,
    },
    /// Parsed client message
    Message { player_id: PlayerId, msg: ClientMsg },
    /// Transport detected the session is gone
    Disconnect { player_id: PlayerId },
}

/// Counters readable without going through the actor
#[derive(Debug, Default)]
pub struct GameStats {
    players: AtomicUsize,
    active_players: AtomicUsize,
    match_running: AtomicBool,
    tick: AtomicU64,
}

/// Handle to the running game
#[derive(Clone)]
pub struct GameHandle {
    pub command_tx: mpsc::Sender<GameCommand>,
    pub stats: Arc<GameStats>,
}

impl GameHandle {
    /// Register a session. `None` if the game actor has stopped.
    pub async fn connect(&self, connection: Box<dyn Connection>) -> Option<PlayerId> {
        let (reply, reply_rx) = oneshot::channel();
        self.command_tx
            .send(GameCommand::Connect { connection, reply })
            .await
            .ok()?;
        reply_rx.await.ok()
    }

    /// Forward a client message. Returns false if the game actor has stopped.
    pub async fn send(&self, player_id: PlayerId, msg: ClientMsg) -> bool {
        self.command_tx
            .send(GameCommand::Message { player_id, msg })
            .await
            .is_ok()
    }

    pub async fn disconnect(&self, player_id: PlayerId) {
        let _ = self
            .command_tx
            .send(GameCommand::Disconnect { player_id })
            .await;
    }

    pub fn player_count(&self) -> usize {
        self.stats.players.load(Ordering::Relaxed)
    }

    pub fn active_players(&self) -> usize {
        self.stats.active_players.load(Ordering::Relaxed)
    }

    pub fn match_running(&self) -> bool {
        self.stats.match_running.load(Ordering::Relaxed)
    }

    pub fn tick(&self) -> u64 {
        self.stats.tick.load(Ordering::Relaxed)
    }
}

/// Owns the `GameState` and every session's outbound side.
///
/// Commands and ticks are handled one at a time on the actor task, so no
/// state is ever touched concurrently.
pub struct GameServer {
    state: GameState,
    command_rx: mpsc::Receiver<GameCommand>,
    connections: HashMap<PlayerId, Box<dyn Connection>>,
    snapshot_builder: SnapshotBuilder,
    stats: Arc<GameStats>,
    tick_rate: u32,
}

impl GameServer {
    pub fn new(seed: u64, tick_rate: u32, snapshot_rate: u32) -> (Self, GameHandle) {
        let (command_tx, command_rx) = mpsc::channel(1024);
        let stats = Arc::new(GameStats::default());

        let handle = GameHandle {
            command_tx,
            stats: stats.clone(),
        };

        let snapshot_interval = tick_rate / snapshot_rate.max(1);
        let server = Self {
            state: GameState::new(seed),
            command_rx,
            connections: HashMap::new(),
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            stats,
            tick_rate,
        };

        (server, handle)
    }

    /// Run the authoritative loop until every handle is dropped
    pub async fn run(mut self) {
        info!(tick_rate = self.tick_rate, "Game loop started");

        let mut tick_interval = interval(tick_duration(self.tick_rate));
        // Late ticks are caught up, never dropped
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = tick_interval.tick() => self.run_tick(),
            }
        }

        info!("Game loop stopped");
    }

    fn handle_command(&mut self, command: GameCommand) {
        match command {
            GameCommand::Connect { connection, reply } => {
                let player_id = self.state.create_player();
                self.connections.insert(player_id, connection);
                if reply.send(player_id).is_err() {
                    debug!(player_id, "Session gone before welcome");
                    self.drop_session(player_id);
                }
            }
            GameCommand::Message { player_id, msg } => self.handle_message(player_id, msg),
            GameCommand::Disconnect { player_id } => self.drop_session(player_id),
        }
        self.flush();
    }

    fn handle_message(&mut self, player_id: PlayerId, msg: ClientMsg) {
        let ack = msg.ack_id();
        let result = match msg {
            ClientMsg::Chat { text, .. } => self.state.chat(player_id, text),
            ClientMsg::SetName { name, .. } => self.state.rename(player_id, name),
            ClientMsg::JoinTeam { team_index, .. } => self.state.join_team(player_id, team_index),
            ClientMsg::Input(input) => self.state.apply_input(player_id, &input),
            ClientMsg::ThrowBall => self.state.throw_ball(player_id),
            ClientMsg::Ping { t } => {
                self.state.send_to(player_id, ServerMsg::Pong { t });
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                if let Some(ack) = ack {
                    self.state.send_to(player_id, ServerMsg::Ack { ack, error: None });
                }
            }
            Err(ActionError::UnknownPlayer(_)) => {
                debug!(player_id, "Message from a departed player");
            }
            Err(e) if e.is_violation() => {
                warn!(player_id, error = %e, "Protocol violation, closing session");
                self.kick(player_id);
            }
            Err(e) => {
                debug!(player_id, error = %e, "Request rejected");
                if let Some(ack) = ack {
                    self.state.send_to(
                        player_id,
                        ServerMsg::Ack {
                            ack,
                            error: Some(e.to_string()),
                        },
                    );
                }
            }
        }
    }

    fn run_tick(&mut self) {
        let step = self.state.tick();
        if step.hit_basket_team.is_some() {
            self.snapshot_builder.force_next();
        }

        if self.snapshot_builder.should_send() && !self.connections.is_empty() {
            let snapshot = self.snapshot_builder.build(&self.state);
            self.state.broadcast(snapshot);
        }

        self.flush();
    }

    /// Close a misbehaving session and remove its player
    fn kick(&mut self, player_id: PlayerId) {
        if let Some(connection) = self.connections.get(&player_id) {
            connection.close();
        }
        self.drop_session(player_id);
    }

    fn drop_session(&mut self, player_id: PlayerId) {
        self.connections.remove(&player_id);
        if let Err(e) = self.state.remove_player(player_id) {
            debug!(player_id, error = %e, "Session already removed");
        }
    }

    /// Route queued messages to their sessions
    fn flush(&mut self) {
        for dispatch in self.state.drain_outbox() {
            match dispatch {
                Dispatch::All(msg) => {
                    for connection in self.connections.values() {
                        connection.send(msg.clone());
                    }
                }
                Dispatch::AllExcept(skip, msg) => {
                    for (player_id, connection) in &self.connections {
                        if *player_id != skip {
                            connection.send(msg.clone());
                        }
                    }
                }
                Dispatch::To(player_id, msg) => {
                    if let Some(connection) = self.connections.get(&player_id) {
                        connection.send(msg);
                    }
                }
            }
        }
        self.publish_stats();
    }

    fn publish_stats(&self) {
        self.stats
            .players
            .store(self.state.registry.len(), Ordering::Relaxed);
        self.stats
            .active_players
            .store(self.state.registry.active_count(), Ordering::Relaxed);
        self.stats
            .match_running
            .store(self.state.is_running(), Ordering::Relaxed);
        self.stats.tick.store(self.state.tick, Ordering::Relaxed);
    }
}
