//! Wire messages for the northbound REST surface and the MSDP peer
//! protocol (§6). All JSON-encoded.

use serde::{Deserialize, Serialize};

// ── Northbound REST: POST /mrt/register_flow ────────────────────────

/// Body of `POST /mrt/register_flow`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterFlowRequest {
    pub topic: String,
    pub rt_attributes: RtAttributesInput,
    pub src_ip: String,
    pub broker_ip: Option<String>,
}

/// The RT attribute fields accepted over the wire, before `ft_i`,
/// `route_links`, `multicast_group_id` and the other orchestrator-owned
/// fields are filled in. Numeric fields are plain numbers here (the `ms`
/// suffix stripping in §6 only applies to the MQTT user-property path,
/// see `flow_descriptor`).
#[derive(Debug, Clone, Deserialize)]
pub struct RtAttributesInput {
    pub qi: u8,
    pub ci: f64,
    pub pi: i64,
    pub ti: f64,
    pub di: f64,
    pub bwi: f64,
    #[serde(default)]
    pub dst_ips: Vec<String>,
    #[serde(default)]
    pub broker_ips: Vec<String>,
    #[serde(default)]
    pub processing_delay: f64,
    #[serde(default)]
    pub measured_jitter: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterFlowResponse {
    pub topic: String,
    pub multicast_group_id: u32,
}

// ── Northbound REST: POST /mrt/register_subscriber ──────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSubscriberRequest {
    pub topic: String,
    pub subscriber_ip: String,
}

// ── MSDP peer protocol (§6) ──────────────────────────────────────────

/// One JSON object per connection, framed by the connection close.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MsdpMessage {
    #[serde(rename = "SA")]
    SourceActive {
        topic: String,
        src_ip: String,
        origin_conn: String,
    },
}
