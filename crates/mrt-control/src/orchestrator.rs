//! Flow Orchestrator (C5, §4.5): the northbound entry point. Takes an
//! incoming flow descriptor, runs admission, computes a tree, commits to
//! the data plane, and updates OF-DB — plus the graft logic on subscriber
//! join.
//!
//! Grounded on `original_source/sdn_controller/ryu_mrt_app.py`'s
//! `register_flow`/`handle_new_subscriber` handlers, reassembled as two
//! free functions over the shared [`AppState`] rather than methods on a
//! Ryu app instance (there is no framework object to hang them off here).
//!
//! The state machine in spec.md §4.5 lists "Call Admission" before
//! "compute route_links", but TA (§4.3) needs a candidate's own route to
//! bound it — so routing runs once, speculatively, before the admission
//! check, and the same tree is reused for the commit if admitted. No
//! state is written to OF-DB unless admission accepts (§7: "no partial
//! state is written" on rejection).

use std::collections::HashSet;

use mrt_common::model::{Link, RtAttributes};
use mrt_common::protocol::{
    RegisterFlowRequest, RegisterFlowResponse, RegisterSubscriberRequest,
};
use mrt_common::{ids, MrtError, Result};
use mrt_schedulability::AdmissionDecision;
use mrt_topology::OfDb;

use crate::state::AppState;

/// **register(topic, attrs, src_ip, broker_ip)** (§4.5).
pub async fn register_flow(state: &AppState, req: RegisterFlowRequest) -> Result<RegisterFlowResponse> {
    validate_request(&req)?;

    let topic = req.topic.clone();
    let mut flow = build_flow(req);

    let mut db = state.of_db().lock().await;

    // Idempotent group-id assignment (§4.5, §9): reuse an already-assigned
    // id for this topic rather than re-allocating on re-registration.
    let group_id = match db.get_flow(&topic).map(|f| f.multicast_group_id) {
        Some(id) if id != 0 => id,
        _ => ids::allocate_group_id(&topic, &db.assigned_group_ids())?,
    };
    flow.multicast_group_id = group_id;

    let links_snapshot = db.snapshot_links();

    // qi > 0 with no configured broker: elect an RP over current
    // subscribers of this topic (§4.5).
    if flow.qi > 0 && flow.broker_ips.is_empty() {
        let subscribers = db.list_subscribers(&topic);
        if let Some(rp) = state.routing().select_rendezvous_point(&links_snapshot, &subscribers) {
            flow.add_broker(rp);
        }
    }

    flow.route_links = compute_route(state, &links_snapshot, &flow);

    let other_flows: Vec<RtAttributes> = db
        .list_flows()
        .into_iter()
        .filter(|f| f.ft_i != topic)
        .collect();

    match state.admission().check_admissibility(&flow, &other_flows) {
        AdmissionDecision::Admit => {}
        AdmissionDecision::Reject { offending_flow, wcrt_ms, deadline_ms } => {
            return Err(MrtError::infeasible(format!(
                "flow {topic} rejected: {offending_flow} would bound to {wcrt_ms:.3}ms > deadline {deadline_ms}ms"
            )));
        }
    }

    commit(state, &mut db, &flow, group_id);

    Ok(RegisterFlowResponse { topic, multicast_group_id: group_id })
}

/// **handle_new_subscriber(topic, sub_ip)** (§4.5): recomputes the full
/// Steiner tree on the widened destination set and grafts. No
/// re-admission check on graft — an open hazard per §9.
pub async fn register_subscriber(state: &AppState, req: RegisterSubscriberRequest) -> Result<()> {
    if req.topic.is_empty() || req.subscriber_ip.is_empty() {
        return Err(MrtError::validation("topic and subscriber_ip are required"));
    }

    let mut db = state.of_db().lock().await;
    db.add_subscriber(&req.topic, req.subscriber_ip.clone());

    let Some(mut flow) = db.get_flow(&req.topic).cloned() else {
        // No flow registered for this topic yet: the subscriber is on
        // record for a future RP election, but there is no tree to graft.
        return Ok(());
    };

    tracing::debug!(
        topic = %req.topic,
        "grafting subscriber without re-running admission — an already-admitted \
         flow's WCRT is not re-checked against the widened destination set (§9 open hazard)"
    );

    flow.add_destination(req.subscriber_ip.clone());

    let links_snapshot = db.snapshot_links();
    flow.route_links = compute_route(state, &links_snapshot, &flow);

    let group_id = flow.multicast_group_id;
    commit(state, &mut db, &flow, group_id);

    Ok(())
}

/// Shared commit tail for both register and graft: reconcile `bw_used`
/// deltas, re-program the data plane (idempotent replace, §4.5), and
/// store the flow in OF-DB.
fn commit(state: &AppState, db: &mut OfDb, flow: &RtAttributes, group_id: u32) {
    let (old_links, old_bwi) = db
        .get_flow(&flow.ft_i)
        .map(|f| (f.route_links.clone(), f.bwi))
        .unwrap_or_default();

    reconcile_bandwidth(db, &old_links, old_bwi, &flow.route_links, flow.bwi);

    mrt_dataplane::program_flow(state.dataplane().as_ref(), flow, group_id);

    db.add_flow(flow.clone());
}

/// Terminals for tree computation (§4.2, §4.5): `dst_ips` alone for direct
/// multicast (qi=0), or `dst_ips ∪ broker_ips` for broker-mediated flows
/// (qi>0) so the tree always transits every configured broker.
fn compute_route(state: &AppState, links: &[Link], flow: &RtAttributes) -> Vec<Link> {
    let mut terminals = flow.unique_dst_ips();
    if flow.qi > 0 {
        for broker in &flow.broker_ips {
            if !terminals.contains(broker) {
                terminals.push(broker.clone());
            }
        }
    }
    state.routing().multicast_tree(links, &flow.src_ip, &terminals)
}

/// Adds/removes `bw_used` on exactly the links whose membership in the
/// flow's tree changed, and adjusts in place on links that stayed but
/// whose `bwi` changed. Applying this with identical `(old, new)` pairs is
/// a no-op (invariant 5/6 in §8: re-registration/repeat-join idempotence).
fn reconcile_bandwidth(db: &mut OfDb, old_links: &[Link], old_bwi: f64, new_links: &[Link], new_bwi: f64) {
    let old_keys: HashSet<_> = old_links.iter().map(|l| l.key()).collect();
    let new_keys: HashSet<_> = new_links.iter().map(|l| l.key()).collect();

    for key in old_keys.difference(&new_keys) {
        db.adjust_bandwidth(key, -old_bwi);
    }
    for key in new_keys.difference(&old_keys) {
        db.adjust_bandwidth(key, new_bwi);
    }
    if (new_bwi - old_bwi).abs() > f64::EPSILON {
        for key in old_keys.intersection(&new_keys) {
            db.adjust_bandwidth(key, new_bwi - old_bwi);
        }
    }
}

fn build_flow(req: RegisterFlowRequest) -> RtAttributes {
    let attrs = req.rt_attributes;
    let mut flow = RtAttributes {
        ft_i: req.topic,
        qi: attrs.qi,
        ci: attrs.ci,
        pi: attrs.pi,
        ti: attrs.ti,
        di: attrs.di,
        bwi: attrs.bwi,
        src_ip: req.src_ip,
        dst_ips: attrs.dst_ips,
        broker_ips: attrs.broker_ips,
        route_links: Vec::new(),
        multicast_group_id: 0,
        processing_delay: attrs.processing_delay,
        measured_jitter: attrs.measured_jitter,
    };
    if let Some(broker_ip) = req.broker_ip {
        flow.add_broker(broker_ip);
    }
    flow
}

fn validate_request(req: &RegisterFlowRequest) -> Result<()> {
    if req.topic.trim().is_empty() {
        return Err(MrtError::validation("topic must not be empty"));
    }
    if req.src_ip.trim().is_empty() {
        return Err(MrtError::validation("src_ip must not be empty"));
    }
    let attrs = &req.rt_attributes;
    if attrs.qi > 2 {
        return Err(MrtError::validation(format!("qi must be 0, 1, or 2, got {}", attrs.qi)));
    }
    if attrs.ti <= 0.0 {
        return Err(MrtError::validation("ti (period) must be positive"));
    }
    if attrs.di <= 0.0 {
        return Err(MrtError::validation("di (deadline) must be positive"));
    }
    if attrs.ci < 0.0 {
        return Err(MrtError::validation("ci must not be negative"));
    }
    if attrs.bwi < 0.0 {
        return Err(MrtError::validation("bwi must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrt_common::config::Config;
    use mrt_common::model::Link;
    use mrt_common::protocol::RtAttributesInput;
    use mrt_dataplane::LoggingProgrammer;
    use mrt_topology::OfDbHandle;
    use std::sync::Arc;

    fn diamond_state() -> AppState {
        let of_db = OfDbHandle::new();
        let dataplane: Arc<dyn mrt_dataplane::DataPlaneProgrammer> = Arc::new(LoggingProgrammer::new());
        AppState::new(of_db, dataplane, Config::default())
    }

    async fn seed_diamond(state: &AppState) {
        let mut db = state.of_db().lock().await;
        for (src, dst, port) in [("1", "2", 1u16), ("1", "3", 2), ("2", "4", 1), ("3", "4", 1)] {
            let mut link = Link::new(src, dst, port);
            link.prop_delay = 5.0;
            link.bw_capacity = 100.0;
            db.add_link(link);
        }
    }

    fn req(topic: &str, ci: f64, pi: i64, ti: f64, di: f64, dst: &[&str]) -> RegisterFlowRequest {
        req_bwi(topic, ci, pi, ti, di, 1.0, dst)
    }

    fn req_bwi(topic: &str, ci: f64, pi: i64, ti: f64, di: f64, bwi: f64, dst: &[&str]) -> RegisterFlowRequest {
        RegisterFlowRequest {
            topic: topic.into(),
            rt_attributes: RtAttributesInput {
                qi: 0,
                ci,
                pi,
                ti,
                di,
                bwi,
                dst_ips: dst.iter().map(|s| s.to_string()).collect(),
                broker_ips: vec![],
                processing_delay: 0.0,
                measured_jitter: 0.0,
            },
            src_ip: "1".into(),
            broker_ip: None,
        }
    }

    #[tokio::test]
    async fn s1_flow_that_misses_its_own_deadline_is_rejected_with_503_shaped_error() {
        let state = diamond_state();
        seed_diamond(&state).await;

        let result = register_flow(&state, req("A", 0.5, 10, 20.0, 10.0, &["4"])).await;
        assert!(matches!(result, Err(MrtError::Infeasible(_))));

        let db = state.of_db().lock().await;
        assert!(db.get_flow("A").is_none(), "rejection must not write partial state");
    }

    #[tokio::test]
    async fn s2_lower_priority_flow_remains_admissible_after_higher_priority_joins() {
        let state = diamond_state();
        seed_diamond(&state).await;

        let b = req_bwi("B", 5.0, 5, 50.0, 50.0, 10.0, &["4"]);
        register_flow(&state, b).await.expect("B admits");

        let c = req("C", 0.5, 10, 20.0, 50.0, &["4"]);
        register_flow(&state, c).await.expect("C admits");

        // Re-register B with C now present; still admissible (lower priority
        // interferer contributes less than its deadline slack).
        let b_again = req_bwi("B", 5.0, 5, 50.0, 50.0, 10.0, &["4"]);
        let resp = register_flow(&state, b_again).await.expect("B remains admissible");
        assert_eq!(resp.topic, "B");
    }

    #[tokio::test]
    async fn s4_multicast_commit_accounts_bandwidth_on_every_tree_link() {
        let state = diamond_state();
        seed_diamond(&state).await;

        register_flow(&state, req("D", 1.0, 5, 100.0, 100.0, &["3", "4"])).await.expect("D admits");

        let db = state.of_db().lock().await;
        let flow = db.get_flow("D").unwrap();
        assert_eq!(flow.route_links.len(), 2);
        for link in &flow.route_links {
            let stored = db.get_link(&link.key()).unwrap();
            assert_eq!(stored.bw_used, 1.0);
        }
    }

    #[tokio::test]
    async fn repeat_registration_with_identical_attributes_is_a_data_plane_no_op() {
        let state = diamond_state();
        seed_diamond(&state).await;

        let first = register_flow(&state, req("E", 1.0, 5, 100.0, 100.0, &["4"])).await.unwrap();
        let second = register_flow(&state, req("E", 1.0, 5, 100.0, 100.0, &["4"])).await.unwrap();
        assert_eq!(first.multicast_group_id, second.multicast_group_id);

        let db = state.of_db().lock().await;
        let flow = db.get_flow("E").unwrap();
        // bw_used reflects a single application of bwi, not two.
        let link = db.get_link(&flow.route_links[0].key()).unwrap();
        assert_eq!(link.bw_used, 1.0);
    }

    #[tokio::test]
    async fn s5_graft_of_an_already_interior_destination_changes_nothing() {
        let state = diamond_state();
        seed_diamond(&state).await;
        register_flow(&state, req("D", 1.0, 5, 100.0, 100.0, &["3", "4"])).await.unwrap();

        let before = {
            let db = state.of_db().lock().await;
            db.get_flow("D").unwrap().route_links.clone()
        };

        register_subscriber(&state, RegisterSubscriberRequest { topic: "D".into(), subscriber_ip: "4".into() })
            .await
            .unwrap();

        let db = state.of_db().lock().await;
        let after = &db.get_flow("D").unwrap().route_links;
        assert_eq!(&before, after);
    }

    #[tokio::test]
    async fn subscriber_join_with_no_registered_flow_is_recorded_but_not_an_error() {
        let state = diamond_state();
        seed_diamond(&state).await;

        register_subscriber(&state, RegisterSubscriberRequest { topic: "unknown".into(), subscriber_ip: "9".into() })
            .await
            .unwrap();

        let db = state.of_db().lock().await;
        assert_eq!(db.list_subscribers("unknown"), vec!["9".to_string()]);
        assert!(db.get_flow("unknown").is_none());
    }

    #[tokio::test]
    async fn validation_rejects_missing_topic() {
        let state = diamond_state();
        let bad = RegisterFlowRequest { topic: "".into(), ..req("x", 1.0, 1, 10.0, 10.0, &["4"]) };
        assert!(matches!(register_flow(&state, bad).await, Err(MrtError::Validation(_))));
    }
}
