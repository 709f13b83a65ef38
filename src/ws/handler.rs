//! WebSocket upgrade handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::error::ActionError;
use crate::game::player::PlayerId;
use crate::game::{Connection, GameHandle};
use crate::util::rate_limit::SessionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Outbound queue depth per session before messages are dropped
const OUTBOUND_BUFFER: usize = 256;

/// Game-side view of one WebSocket session
struct WsConnection {
    outbound_tx: mpsc::Sender<ServerMsg>,
    kick: Arc<Notify>,
}

impl Connection for WsConnection {
    fn send(&self, msg: ServerMsg) {
        match self.outbound_tx.try_send(msg) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                // Don't disconnect for lag
                warn!("Client lagged, dropping message");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Outbound channel closed");
            }
        }
    }

    fn close(&self) {
        self.kick.notify_one();
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (outbound_tx, outbound_rx) = mpsc::channel::<ServerMsg>(OUTBOUND_BUFFER);
    let kick = Arc::new(Notify::new());

    let connection = WsConnection {
        outbound_tx: outbound_tx.clone(),
        kick: kick.clone(),
    };

    let Some(player_id) = state.game.connect(Box::new(connection)).await else {
        error!("Game loop unavailable, dropping connection");
        return;
    };

    info!(player_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let limiter = SessionRateLimiter::new(state.config.input_rate_limit);

    let session = Session {
        player_id,
        game: &state.game,
        reply_tx: outbound_tx,
        kick,
        limiter,
    };
    session.run(ws_sink, ws_stream, outbound_rx).await;

    // Cleanup on disconnect
    state.game.disconnect(player_id).await;

    info!(player_id, "WebSocket connection closed");
}

/// Reader side of one session
struct Session<'a> {
    player_id: PlayerId,
    game: &'a GameHandle,
    /// Direct replies that never reach the game loop
    reply_tx: mpsc::Sender<ServerMsg>,
    kick: Arc<Notify>,
    limiter: SessionRateLimiter,
}

impl Session<'_> {
    /// Run the WebSocket session with read/write split
    async fn run(
        self,
        mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
        mut ws_stream: futures::stream::SplitStream<WebSocket>,
        mut outbound_rx: mpsc::Receiver<ServerMsg>,
    ) {
        let player_id = self.player_id;

        // Spawn writer task: game messages -> WebSocket
        let writer_handle = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                    debug!(player_id, error = %e, "WebSocket send failed");
                    break;
                }
            }
            let _ = ws_sink.close().await;
        });

        // Reader loop: WebSocket -> game loop
        loop {
            let result = tokio::select! {
                _ = self.kick.notified() => {
                    info!(player_id, "Session closed by server");
                    break;
                }
                next = ws_stream.next() => match next {
                    Some(result) => result,
                    None => break,
                },
            };

            match result {
                Ok(Message::Text(text)) => {
                    let client_msg = match serde_json::from_str::<ClientMsg>(&text) {
                        Ok(client_msg) => client_msg,
                        Err(e) => {
                            warn!(player_id, error = %e, "Malformed client message, closing session");
                            break;
                        }
                    };

                    if !self.limiter.check_input() {
                        warn!(player_id, "Rate limited input message");
                        self.reject(&client_msg, &ActionError::RateLimited);
                        continue;
                    }

                    if !self.game.send(player_id, client_msg).await {
                        debug!(player_id, "Game loop stopped");
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    warn!(player_id, "Received binary message, closing session");
                    break;
                }
                Ok(Message::Ping(_)) => {
                    debug!(player_id, "Received ping");
                }
                Ok(Message::Pong(_)) => {
                    debug!(player_id, "Received pong");
                }
                Ok(Message::Close(_)) => {
                    info!(player_id, "Client initiated close");
                    break;
                }
                Err(e) => {
                    error!(player_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }

        // Abort writer task
        writer_handle.abort();
    }

    /// Answer an acked request locally instead of forwarding it
    fn reject(&self, msg: &ClientMsg, error: &ActionError) {
        if let Some(reply) = msg.rejection(error) {
            if self.reply_tx.try_send(reply).is_err() {
                debug!(player_id = self.player_id, "Reply dropped, outbound queue unavailable");
            }
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
