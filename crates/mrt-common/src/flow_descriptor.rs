//! Flow descriptor parsing from MQTT v5 user properties (§6, §9 Design Note
//! "Dynamic MQTT v5 user-property map").
//!
//! Grounded on `original_source/ort_nm/ort_nm.py::extract_rt_attributes`:
//! strict required keys (`Ci`, `Pi`, `Ti`, `Di`, `BWi`), `ms` suffix
//! stripped before numeric parse, `Qi` and the topic taken from the packet
//! itself rather than the property map.

use std::collections::HashMap;

use crate::error::{MrtError, Result};
use crate::model::RtAttributes;

const REQUIRED_KEYS: [&str; 5] = ["Ci", "Pi", "Ti", "Di", "BWi"];

/// Parse a single typed descriptor from an MQTT v5 user-property map.
///
/// `topic` and `qos` come from the PUBLISH packet itself, not the property
/// map (§6). Any other key present in `props` besides the required five is
/// ignored (forward-compatible), but all five must be present or the whole
/// packet is not treated as a real-time flow.
pub fn parse_user_properties(
    props: &HashMap<String, String>,
    topic: String,
    qos: u8,
) -> Result<RtAttributes> {
    for key in REQUIRED_KEYS {
        if !props.contains_key(key) {
            return Err(MrtError::validation(format!(
                "missing required user property: {key}"
            )));
        }
    }

    let ci = parse_ms(&props["Ci"])?;
    let ti = parse_ms(&props["Ti"])?;
    let di = parse_ms(&props["Di"])?;
    let pi: i64 = props["Pi"]
        .parse()
        .map_err(|_| MrtError::validation(format!("Pi is not an integer: {}", props["Pi"])))?;
    let bwi = parse_bandwidth_mbps(&props["BWi"])?;

    if qos > 2 {
        return Err(MrtError::validation(format!("invalid QoS class: {qos}")));
    }

    Ok(RtAttributes {
        ft_i: topic,
        qi: qos,
        ci,
        pi,
        ti,
        di,
        bwi,
        src_ip: String::new(),
        dst_ips: Vec::new(),
        broker_ips: Vec::new(),
        route_links: Vec::new(),
        multicast_group_id: 0,
        processing_delay: 0.0,
        measured_jitter: 0.0,
    })
}

/// Strip a trailing `ms` suffix (if present) and parse as `f64`.
fn parse_ms(raw: &str) -> Result<f64> {
    let trimmed = raw.trim().trim_end_matches("ms").trim();
    trimmed
        .parse()
        .map_err(|_| MrtError::validation(format!("not a numeric ms value: {raw}")))
}

/// Parse a bandwidth value accepting an optional `Mbps`/`Kbps` suffix,
/// always returning Mbps (§3 `bwi` is stored in Mbps).
pub fn parse_bandwidth_mbps(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if let Some(value) = trimmed.strip_suffix("Mbps") {
        return value
            .trim()
            .parse()
            .map_err(|_| MrtError::validation(format!("not a numeric bandwidth: {raw}")));
    }
    if let Some(value) = trimmed.strip_suffix("Kbps") {
        let kbps: f64 = value
            .trim()
            .parse()
            .map_err(|_| MrtError::validation(format!("not a numeric bandwidth: {raw}")))?;
        return Ok(kbps / 1000.0);
    }
    trimmed
        .parse()
        .map_err(|_| MrtError::validation(format!("not a numeric bandwidth: {raw}")))
}
