//! WebSocket connection handler
//!
//! Handles individual connections: WebSocket handshake, frame parsing,
//! and bidirectional communication with the ConnectionHub.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::hub::{HubCommand, InboundEvent};
use crate::message::{ClientMessage, ServerMessage};
use crate::types::ConnectionId;

/// Outbound queue size per connection
const CONNECTION_BUFFER_SIZE: usize = 32;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, registers with the hub, and pumps
/// frames both ways until either side ends. The hub always receives a
/// final `Disconnect` once registration succeeded.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<HubCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = ConnectionId::new();
    info!("Connection {} established from {}", connection_id, peer_addr);

    // Channel for hub -> connection messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(CONNECTION_BUFFER_SIZE);

    if cmd_tx
        .send(HubCommand::Connect {
            connection_id,
            sender: msg_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("Failed to register {} - hub closed", connection_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Read task (WebSocket -> HubCommand)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = HubCommand::Event {
                            connection_id,
                            event: InboundEvent::from(client_msg),
                        };
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Hub closed, ending read task for {}", connection_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid JSON from {}: {}", connection_id, e);
                        let _ = msg_tx.try_send(AppError::Json(e).into());
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(_) => {
                    // Binary, ping/pong - pongs are answered by tungstenite
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Write task (ServerMessage -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for {}", connection_id);

        let _ = ws_sender.close().await;
    });

    // Either direction ending closes the connection
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", connection_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", connection_id);
        }
    }

    let _ = cmd_tx
        .send(HubCommand::Event {
            connection_id,
            event: InboundEvent::Disconnect,
        })
        .await;

    info!("Connection {} disconnected", connection_id);

    Ok(())
}
