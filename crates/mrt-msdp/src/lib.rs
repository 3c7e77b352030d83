//! Inter-controller MSDP-style signaling (§4, §6): lets edge controllers
//! discover active sources/topics in other domains over a plain TCP/JSON
//! gossip protocol, one message per connection.
//!
//! Grounded on `original_source/sdn_controller/msdp.py`'s
//! `MSDP_Signaling`, with Python's `threading`/raw `socket` replaced by
//! `tokio::net::TcpListener` + one `tokio::spawn` per inbound connection,
//! matching the task-per-connection shape §5 names for "Inter-controller
//! MSDP peer acceptor".

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mrt_common::protocol::MsdpMessage;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Send timeout for outbound SA gossip (§5: "MSDP sends (short timeout,
/// best-effort)"). No retransmission, no acknowledgement.
const SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// First-write-wins table of topic -> source IP, learned from peers.
#[derive(Clone, Default)]
pub struct SourceTable(Arc<Mutex<HashMap<String, String>>>);

impl SourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `topic -> src_ip` if this is the first SA seen for `topic`
    /// (mirrors the source's `if topic not in self.active_sources`).
    /// Returns `true` if the table changed.
    async fn record(&self, topic: String, src_ip: String) -> bool {
        let mut table = self.0.lock().await;
        if table.contains_key(&topic) {
            false
        } else {
            table.insert(topic, src_ip);
            true
        }
    }

    pub async fn source_of(&self, topic: &str) -> Option<String> {
        self.0.lock().await.get(topic).cloned()
    }

    pub async fn len(&self) -> usize {
        self.0.lock().await.len()
    }
}

/// Accepts MSDP connections on `listener` forever, one `tokio::spawn` per
/// peer. Intended to be spawned itself as a background task at startup.
pub async fn run_listener(listener: TcpListener, sources: SourceTable) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let sources = sources.clone();
                tokio::spawn(async move {
                    handle_peer(stream, peer_addr.ip().to_string(), sources).await;
                });
            }
            Err(err) => {
                tracing::error!(%err, "msdp listener accept failed");
            }
        }
    }
}

async fn handle_peer(mut stream: TcpStream, peer_ip: String, sources: SourceTable) {
    let mut buf = Vec::new();
    if let Err(err) = stream.read_to_end(&mut buf).await {
        tracing::warn!(peer = %peer_ip, %err, "msdp peer read failed");
        return;
    }

    let msg: MsdpMessage = match serde_json::from_slice(&buf) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::warn!(peer = %peer_ip, %err, "msdp peer sent malformed message, ignoring");
            return;
        }
    };

    match msg {
        MsdpMessage::SourceActive { topic, src_ip, origin_conn: _ } => {
            tracing::info!(%topic, %src_ip, via = %peer_ip, "received SA");
            sources.record(topic, src_ip).await;
        }
    }
}

/// Broadcasts a Source Active message for `topic`/`src_ip` to every
/// configured peer, best-effort (§5, §6): a connect/write failure to one
/// peer is logged and does not block the others.
pub async fn send_sa_message(peers: &[String], port: u16, topic: &str, src_ip: &str, my_ip: &str) {
    let msg = MsdpMessage::SourceActive {
        topic: topic.to_string(),
        src_ip: src_ip.to_string(),
        origin_conn: my_ip.to_string(),
    };
    let payload = match serde_json::to_vec(&msg) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%err, "failed to encode SA message");
            return;
        }
    };

    for peer in peers {
        let payload = payload.clone();
        match tokio::time::timeout(SEND_TIMEOUT, send_to_peer(peer, port, &payload)).await {
            Ok(Ok(())) => tracing::info!(%peer, %topic, "sent SA"),
            Ok(Err(err)) => tracing::warn!(%peer, %topic, %err, "failed to send SA"),
            Err(_) => tracing::warn!(%peer, %topic, "SA send timed out"),
        }
    }
}

async fn send_to_peer(peer_ip: &str, port: u16, payload: &[u8]) -> std::io::Result<()> {
    let mut stream = TcpStream::connect((peer_ip, port)).await?;
    stream.write_all(payload).await?;
    stream.shutdown().await?;
    Ok(())
}
