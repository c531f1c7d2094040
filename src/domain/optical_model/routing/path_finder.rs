use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::routing::span_weigher::LinkWeigher;
use crate::domain::optical_model::utils::id::DeviceId;

type LinkKey = (ConnectPoint, ConnectPoint);

/// Weighted adjacency of the viable links, built once per search.
struct Graph {
    adjacency: BTreeMap<DeviceId, Vec<(Link, f64)>>,
}

impl Graph {
    fn build(inventory: &dyn NetworkInventory, weigher: &dyn LinkWeigher) -> Self {
        let mut adjacency: BTreeMap<DeviceId, Vec<(Link, f64)>> = BTreeMap::new();
        for link in inventory.links() {
            if let Some(weight) = weigher.weight(&link) {
                adjacency.entry(link.src.device_id.clone()).or_default().push((link, weight));
            }
        }
        Self { adjacency }
    }

    fn weight_of(&self, link: &Link) -> f64 {
        self.adjacency
            .get(&link.src.device_id)
            .and_then(|edges| edges.iter().find(|(l, _)| l.src == link.src && l.dst == link.dst))
            .map_or(0.0, |(_, w)| *w)
    }
}

/// Heap entry for Dijkstra. Lower cost first, then earlier discovery.
struct State {
    cost: f64,
    seq: usize,
    node: DeviceId,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Finds routes between devices over the network inventory.
pub struct TopologyPathFinder {
    inventory: Arc<dyn NetworkInventory>,
}

impl TopologyPathFinder {
    pub fn new(inventory: Arc<dyn NetworkInventory>) -> Self {
        Self { inventory }
    }

    /// Returns up to `k` loop-free paths from `src` to `dst` in ascending weight.
    ///
    /// Yen's algorithm over a Dijkstra search. Paths of equal weight keep the
    /// order in which they were discovered. Fewer than `k` paths (or none) is
    /// not an error.
    pub fn k_shortest_paths(&self, src: &DeviceId, dst: &DeviceId, weigher: &dyn LinkWeigher, k: usize) -> Vec<Path> {
        if k == 0 || src == dst {
            return Vec::new();
        }
        let graph = Graph::build(self.inventory.as_ref(), weigher);

        let Some(first) = shortest_path(&graph, src, dst, &HashSet::new(), &HashSet::new()) else {
            log::debug!("NoPathFound: {} => {}", src, dst);
            return Vec::new();
        };

        let mut found: Vec<(Vec<Link>, f64)> = vec![first];
        let mut candidates: Vec<(Vec<Link>, f64, usize)> = Vec::new();
        let mut seq = 0;

        while found.len() < k {
            let (previous, _) = &found[found.len() - 1];

            for i in 0..previous.len() {
                let spur_node = &previous[i].src.device_id;
                let root = &previous[..i];

                let removed_links: HashSet<LinkKey> = found
                    .iter()
                    .filter(|(links, _)| links.len() > i && &links[..i] == root)
                    .map(|(links, _)| (links[i].src.clone(), links[i].dst.clone()))
                    .collect();
                let removed_nodes: HashSet<DeviceId> = root.iter().map(|l| l.src.device_id.clone()).collect();

                let Some((spur, spur_cost)) = shortest_path(&graph, spur_node, dst, &removed_links, &removed_nodes) else {
                    continue;
                };

                let mut total: Vec<Link> = root.to_vec();
                total.extend(spur);
                let cost = root.iter().map(|l| graph.weight_of(l)).sum::<f64>() + spur_cost;

                let known = found.iter().any(|(links, _)| *links == total) || candidates.iter().any(|(links, _, _)| *links == total);
                if !known {
                    candidates.push((total, cost, seq));
                    seq += 1;
                }
            }

            let Some(best) = candidates
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.1.total_cmp(&b.1).then_with(|| a.2.cmp(&b.2)))
                .map(|(i, _)| i)
            else {
                break;
            };
            let (links, cost, _) = candidates.remove(best);
            found.push((links, cost));
        }

        let paths: Vec<Path> = found.into_iter().filter_map(|(links, cost)| Path::new(links, cost).ok()).collect();
        log::debug!("Paths found {} => {}: {} solutions", src, dst, paths.len());
        paths
    }

    /// The structurally mirrored path. Links are reversed in place, so their
    /// state and annotations are kept even where the inventory has no
    /// opposite link.
    pub fn reverse(&self, path: &Path) -> Path {
        path.reverse()
    }
}

fn shortest_path(
    graph: &Graph,
    src: &DeviceId,
    dst: &DeviceId,
    removed_links: &HashSet<LinkKey>,
    removed_nodes: &HashSet<DeviceId>,
) -> Option<(Vec<Link>, f64)> {
    let mut dist: HashMap<DeviceId, f64> = HashMap::new();
    let mut previous: HashMap<DeviceId, Link> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0;

    dist.insert(src.clone(), 0.0);
    heap.push(State { cost: 0.0, seq, node: src.clone() });

    while let Some(State { cost, node, .. }) = heap.pop() {
        if &node == dst {
            break;
        }
        if dist.get(&node).is_some_and(|d| cost > *d) {
            continue;
        }

        let Some(edges) = graph.adjacency.get(&node) else {
            continue;
        };
        for (link, weight) in edges {
            let next = &link.dst.device_id;
            if removed_nodes.contains(next) || next == src || removed_links.contains(&(link.src.clone(), link.dst.clone())) {
                continue;
            }

            let next_cost = cost + weight;
            if dist.get(next).is_none_or(|d| next_cost < *d) {
                dist.insert(next.clone(), next_cost);
                previous.insert(next.clone(), link.clone());
                seq += 1;
                heap.push(State { cost: next_cost, seq, node: next.clone() });
            }
        }
    }

    let cost = *dist.get(dst)?;
    let mut links = Vec::new();
    let mut current = dst.clone();
    while &current != src {
        let link = previous.get(&current)?;
        current = link.src.device_id.clone();
        links.push(link.clone());
    }
    links.reverse();
    Some((links, cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::network_dto::NetworkDto;
    use crate::domain::optical_model::network::topology::NetworkTopology;

    /// Weighs links by an annotation so the tests need no link details.
    struct AnnotationWeigher;

    impl LinkWeigher for AnnotationWeigher {
        fn weight(&self, link: &Link) -> Option<f64> {
            link.annotations.get("km").and_then(|v| v.parse().ok())
        }
    }

    fn link(src: &str, dst: &str, km: f64) -> String {
        format!(r#"{{"src": "{}", "dst": "{}", "bidirectional": true, "annotations": {{"km": "{}"}}}}"#, src, dst, km)
    }

    /// A square A-B-C-D-A with a diagonal B-D.
    fn square() -> Arc<NetworkTopology> {
        let devices: Vec<String> = ["A", "B", "C", "D"]
            .iter()
            .map(|d| format!(r#"{{"id": "{}", "type": "ROADM", "ports": [{{"number": 1, "type": "OMS"}}, {{"number": 2, "type": "OMS"}}, {{"number": 3, "type": "OMS"}}]}}"#, d))
            .collect();
        let links = [link("A/1", "B/1", 10.0), link("B/2", "C/1", 10.0), link("A/2", "D/1", 15.0), link("D/2", "C/2", 15.0), link("B/3", "D/3", 1.0)];
        let json = format!(r#"{{"devices": [{}], "links": [{}]}}"#, devices.join(","), links.join(","));
        let dto: NetworkDto = serde_json::from_str(&json).unwrap();
        Arc::new(NetworkTopology::from_dto(&dto).unwrap())
    }

    #[test]
    fn test_k_shortest_paths_ordered_by_weight() {
        let finder = TopologyPathFinder::new(square());
        let paths = finder.k_shortest_paths(&DeviceId::new("A"), &DeviceId::new("C"), &AnnotationWeigher, 10);

        let weights: Vec<f64> = paths.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![20.0, 26.0, 26.0, 30.0], "Expected all four loop-free routes by ascending weight.");
        assert!(paths.iter().all(|p| p.src().device_id.as_str() == "A" && p.dst().device_id.as_str() == "C"));
    }

    #[test]
    fn test_k_limits_result() {
        let finder = TopologyPathFinder::new(square());
        let paths = finder.k_shortest_paths(&DeviceId::new("A"), &DeviceId::new("C"), &AnnotationWeigher, 2);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].devices(), vec![DeviceId::new("A"), DeviceId::new("B"), DeviceId::new("C")]);
    }

    #[test]
    fn test_unreachable_returns_empty() {
        let topology = square();
        topology.remove_device(&DeviceId::new("B")).unwrap();
        topology.remove_device(&DeviceId::new("D")).unwrap();

        let finder = TopologyPathFinder::new(topology);
        assert!(finder.k_shortest_paths(&DeviceId::new("A"), &DeviceId::new("C"), &AnnotationWeigher, 3).is_empty());
    }

    #[test]
    fn test_reverse_of_reverse_is_identity() {
        let finder = TopologyPathFinder::new(square());
        for path in finder.k_shortest_paths(&DeviceId::new("A"), &DeviceId::new("C"), &AnnotationWeigher, 4) {
            let reverse = finder.reverse(&path);
            assert!(reverse.is_reverse_of(&path));
            assert_eq!(finder.reverse(&reverse), path);
        }
    }
}
