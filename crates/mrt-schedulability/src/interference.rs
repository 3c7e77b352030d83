//! Interfering-flow lookup shared by both WCRT methods (§4.3).

use mrt_common::model::{Link, RtAttributes};

/// Flows other than `subject` that traverse `link` (matched by `(src,
/// dst)`, ignoring port — two flows sharing a link but egressing on
/// different ports of the same switch pair still interfere) at equal or
/// higher priority. Priority is "higher value = higher priority" (§3), so
/// `pi(g) >= pi(subject)` interferes per §4.3.
pub fn interfering_flows<'a>(
    link: &Link,
    subject: &RtAttributes,
    all_flows: &'a [RtAttributes],
) -> Vec<&'a RtAttributes> {
    all_flows
        .iter()
        .filter(|flow| flow.ft_i != subject.ft_i)
        .filter(|flow| flow.route_links.iter().any(|l| l.src == link.src && l.dst == link.dst))
        .filter(|flow| flow.pi >= subject.pi)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(ft_i: &str, pi: i64, links: Vec<Link>) -> RtAttributes {
        RtAttributes {
            ft_i: ft_i.into(),
            qi: 0,
            ci: 1.0,
            pi,
            ti: 10.0,
            di: 10.0,
            bwi: 1.0,
            src_ip: "1".into(),
            dst_ips: vec![],
            broker_ips: vec![],
            route_links: links,
            multicast_group_id: 0,
            processing_delay: 0.0,
            measured_jitter: 0.0,
        }
    }

    #[test]
    fn excludes_self_and_lower_priority() {
        let link = Link::new("1", "2", 1);
        let subject = flow("a", 10, vec![link.clone()]);
        let higher = flow("b", 20, vec![link.clone()]);
        let lower = flow("c", 5, vec![link.clone()]);
        let elsewhere = flow("d", 30, vec![Link::new("9", "10", 1)]);
        let all = vec![subject.clone(), higher.clone(), lower, elsewhere];

        let interferers = interfering_flows(&link, &subject, &all);
        let ids: Vec<&str> = interferers.iter().map(|f| f.ft_i.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }
}
