use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::network::link_detail::LinkDetailProvider;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::planner::change_detector::TopologyChangeDetector;
use crate::domain::optical_model::planner::wdm_path::WdmPath;
use crate::domain::optical_model::planner::wdm_path_store::{WdmPathEvent, WdmPathStore};
use crate::domain::optical_model::quality::config::QualityConfig;
use crate::domain::optical_model::quality::osnr_provider::provider_for;
use crate::domain::optical_model::routing::path_finder::TopologyPathFinder;
use crate::domain::optical_model::routing::span_weigher::FiberSpanWeigher;
use crate::domain::optical_model::utils::id::DeviceId;
use crate::error::{Error, Result};

/// A forward route and its mirror between two add/drop ports.
struct RoutePair {
    add: ConnectPoint,
    drop: ConnectPoint,
    forward: usize,
    reverse: usize,
}

/// Computes the WDM path catalog: up to K shortest routes between every pair
/// of OMS add/drop ports, in both directions, with their OSNR.
pub struct WdmPathPlanner {
    inventory: Arc<dyn NetworkInventory>,
    link_details: Arc<dyn LinkDetailProvider>,
    quality: QualityConfig,
    k: usize,
    store: Arc<WdmPathStore>,
    detector: Arc<TopologyChangeDetector>,
}

impl WdmPathPlanner {
    pub fn new(
        inventory: Arc<dyn NetworkInventory>,
        link_details: Arc<dyn LinkDetailProvider>,
        quality: QualityConfig,
        k: usize,
        store: Arc<WdmPathStore>,
        detector: Arc<TopologyChangeDetector>,
    ) -> Self {
        Self { inventory, link_details, quality, k, store, detector }
    }

    /// Recomputes the catalog and replaces the affected part of the store.
    ///
    /// `ingress`/`egress` restrict the computation to paths starting or ending
    /// at that add/drop port. Without either the whole catalog is rebuilt.
    pub fn calculate_wdm_paths(&self, ingress: Option<&ConnectPoint>, egress: Option<&ConnectPoint>) -> Result<WdmPathEvent> {
        log::info!("Start to calculate WDM paths.");

        let devices = self.inventory.devices();
        if devices.is_empty() {
            return Err(Error::PreconditionFailed("No devices.".to_string()));
        }

        let all_ports: BTreeMap<DeviceId, Vec<ConnectPoint>> = devices
            .iter()
            .map(|d| (d.id.clone(), d.oms_add_drop_ports()))
            .filter(|(_, ports)| !ports.is_empty())
            .collect();
        if all_ports.is_empty() {
            return Err(Error::PreconditionFailed("OMS Add/Drop port not found.".to_string()));
        }

        let add_ports = match ingress {
            Some(cp) => self.single_port(cp)?,
            None => all_ports.clone(),
        };
        let drop_ports = match egress {
            Some(cp) => self.single_port(cp)?,
            None => all_ports,
        };

        let paths = self.compute(&add_ports, &drop_ports)?;
        let event = self.store.replace(ingress, egress, paths);
        self.detector.reset();

        log::info!("Finished to calculate WDM paths.");
        Ok(event)
    }

    fn single_port(&self, cp: &ConnectPoint) -> Result<BTreeMap<DeviceId, Vec<ConnectPoint>>> {
        let is_add_drop = self.inventory.device(&cp.device_id).is_some_and(|d| d.is_oms_add_drop_port(cp.port));
        if !is_add_drop {
            return Err(Error::InvalidArgument(format!("Connect point must be OMS Add/Drop port. {}", cp)));
        }
        Ok(BTreeMap::from([(cp.device_id.clone(), vec![cp.clone()])]))
    }

    fn compute(
        &self,
        add_ports: &BTreeMap<DeviceId, Vec<ConnectPoint>>,
        drop_ports: &BTreeMap<DeviceId, Vec<ConnectPoint>>,
    ) -> Result<Vec<WdmPath>> {
        let finder = TopologyPathFinder::new(self.inventory.clone());
        let weigher = FiberSpanWeigher::new(self.inventory.clone(), self.link_details.clone());

        let mut routes: Vec<Path> = Vec::new();
        let mut pairs: Vec<RoutePair> = Vec::new();
        let mut done: BTreeSet<BTreeSet<DeviceId>> = BTreeSet::new();
        let mut per_port_pair: HashMap<BTreeSet<ConnectPoint>, usize> = HashMap::new();

        for (src, src_ports) in add_ports {
            for (dst, dst_ports) in drop_ports {
                if src == dst || !done.insert(BTreeSet::from([src.clone(), dst.clone()])) {
                    continue;
                }

                for forward in finder.k_shortest_paths(src, dst, &weigher, self.k) {
                    let reverse = finder.reverse(&forward);
                    let (forward_index, reverse_index) = (routes.len(), routes.len() + 1);
                    routes.push(forward);
                    routes.push(reverse);

                    for add in src_ports {
                        for drop in dst_ports {
                            let count = per_port_pair.entry(BTreeSet::from([add.clone(), drop.clone()])).or_default();
                            if *count >= self.k {
                                continue;
                            }
                            *count += 1;
                            pairs.push(RoutePair { add: add.clone(), drop: drop.clone(), forward: forward_index, reverse: reverse_index });
                        }
                    }
                }
            }
        }

        if routes.is_empty() {
            log::warn!("No WDM path found.");
            return Ok(Vec::new());
        }

        let params = self.quality.och_params();
        let provider = provider_for(&self.quality, self.inventory.clone(), self.link_details.clone());
        let osnr = provider.evaluate(&routes, &params)?;
        if osnr.len() != routes.len() {
            return Err(Error::CalculationFailed(format!("Expected OSNR for {} paths, got {}", routes.len(), osnr.len())));
        }

        let mut paths = Vec::with_capacity(pairs.len() * 2);
        for pair in pairs {
            paths.push(WdmPath::new(pair.add.clone(), pair.drop.clone(), routes[pair.forward].clone(), osnr[pair.forward].clone()));
            paths.push(WdmPath::new(pair.drop, pair.add, routes[pair.reverse].clone(), osnr[pair.reverse].clone()));
        }
        log::debug!("{} WDM paths over {} routes", paths.len(), routes.len());
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::network_dto::NetworkDto;
    use crate::domain::optical_model::network::link_detail::StaticLinkDetailProvider;
    use crate::domain::optical_model::network::topology::NetworkTopology;
    use crate::domain::optical_model::quality::config::METHOD_INTERNAL;

    const NETWORK: &str = r#"{
        "devices": [
            {"id": "A", "type": "ROADM", "ports": [
                {"number": 1, "type": "OMS"}, {"number": 2, "type": "OMS"}, {"number": 10, "type": "OMS", "role": "ADD_DROP"}]},
            {"id": "B", "type": "ROADM", "ports": [
                {"number": 1, "type": "OMS"}, {"number": 2, "type": "OMS"}, {"number": 10, "type": "OMS", "role": "ADD_DROP"}]},
            {"id": "C", "type": "ROADM", "ports": [
                {"number": 1, "type": "OMS"}, {"number": 2, "type": "OMS"}, {"number": 10, "type": "OMS", "role": "ADD_DROP"}]}
        ],
        "links": [
            {"src": "A/1", "dst": "B/1", "bidirectional": true},
            {"src": "B/2", "dst": "C/1", "bidirectional": true},
            {"src": "A/2", "dst": "C/2", "bidirectional": true}
        ],
        "linkDetails": [
            {"src": "A/1", "dst": "B/1", "bidirectional": true, "elements": [
                {"type": "amp", "ampType": "HighGainAmp", "gain": 20.0},
                {"type": "span", "fiberType": "smf", "spanLoss": 16.0, "srlgLength": 80000.0},
                {"type": "amp", "ampType": "HighGainAmp", "gain": 16.0}]},
            {"src": "B/2", "dst": "C/1", "bidirectional": true, "elements": [
                {"type": "amp", "ampType": "HighGainAmp", "gain": 20.0},
                {"type": "span", "fiberType": "smf", "spanLoss": 12.0, "srlgLength": 60000.0},
                {"type": "amp", "ampType": "HighGainAmp", "gain": 12.0}]},
            {"src": "A/2", "dst": "C/2", "bidirectional": true, "elements": [
                {"type": "amp", "ampType": "HighGainAmp", "gain": 20.0},
                {"type": "span", "fiberType": "smf", "spanLoss": 20.0, "srlgLength": 100000.0},
                {"type": "amp", "ampType": "HighGainAmp", "gain": 20.0}]}
        ]
    }"#;

    fn planner(json: &str, k: usize) -> (WdmPathPlanner, Arc<WdmPathStore>, Arc<TopologyChangeDetector>) {
        let dto: NetworkDto = serde_json::from_str(json).unwrap();
        let topology = Arc::new(NetworkTopology::from_dto(&dto).unwrap());
        let details = Arc::new(StaticLinkDetailProvider::from_dto(&dto));
        let store = Arc::new(WdmPathStore::new());
        let detector = Arc::new(TopologyChangeDetector::new(topology.clone()));
        let quality = QualityConfig { method: METHOD_INTERNAL.to_string(), ..QualityConfig::default() };
        let planner = WdmPathPlanner::new(topology, details, quality, k, store.clone(), detector.clone());
        (planner, store, detector)
    }

    fn cp(s: &str) -> ConnectPoint {
        s.parse().unwrap()
    }

    #[test]
    fn test_full_catalog_has_both_directions() {
        let (planner, store, _) = planner(NETWORK, 2);
        planner.calculate_wdm_paths(None, None).unwrap();

        // Three device pairs, two routes each, both directions.
        assert_eq!(store.len(), 12);
        for path in store.get_paths(None, None) {
            assert!(store.get_reverse_path(&path).is_some(), "Missing reverse of {}", path);
            assert_eq!(path.osnr.len(), 2, "OSNR expected for every configured pattern on {}", path);
        }

        let direct = store.get_paths(Some(&cp("A/10")), Some(&cp("C/10")));
        assert_eq!(direct.len(), 2);
        assert_eq!(direct[0].path.links().len(), 1, "The 100 km direct route is shorter than 140 km via B.");
        assert_eq!(direct[1].path.devices().len(), 3);
    }

    #[test]
    fn test_reverse_route_mirrors_forward_links() {
        let json = r#"{
            "devices": [
                {"id": "A", "type": "ROADM", "ports": [{"number": 1, "type": "OMS"}, {"number": 10, "type": "OMS", "role": "ADD_DROP"}]},
                {"id": "B", "type": "ROADM", "ports": [{"number": 1, "type": "OMS"}, {"number": 10, "type": "OMS", "role": "ADD_DROP"}]}
            ],
            "links": [{"src": "A/1", "dst": "B/1", "bidirectional": false, "annotations": {"fiber": "F-17"}}],
            "linkDetails": [
                {"src": "A/1", "dst": "B/1", "bidirectional": false, "elements": [
                    {"type": "amp", "ampType": "HighGainAmp", "gain": 20.0},
                    {"type": "span", "fiberType": "smf", "spanLoss": 16.0, "srlgLength": 80000.0},
                    {"type": "amp", "ampType": "HighGainAmp", "gain": 16.0}]}
            ]
        }"#;
        let (planner, store, _) = planner(json, 1);
        planner.calculate_wdm_paths(None, None).unwrap();

        let forward = store.get_paths(Some(&cp("A/10")), Some(&cp("B/10")));
        let reverse = store.get_paths(Some(&cp("B/10")), Some(&cp("A/10")));
        assert_eq!((forward.len(), reverse.len()), (1, 1), "A one-way link still yields both directions");
        assert!(reverse[0].is_reverse_of(&forward[0]));

        let link = &reverse[0].path.links()[0];
        assert_eq!((&link.src, &link.dst), (&cp("B/1"), &cp("A/1")));
        assert_eq!(link.annotations.get("fiber").map(String::as_str), Some("F-17"));
    }

    #[test]
    fn test_restricted_calculation_keeps_other_pairs() {
        let (planner, store, _) = planner(NETWORK, 1);
        planner.calculate_wdm_paths(None, None).unwrap();
        assert_eq!(store.len(), 6);

        let event = planner.calculate_wdm_paths(Some(&cp("A/10")), Some(&cp("B/10"))).unwrap();
        let WdmPathEvent::PathsReplaced { added, removed } = event else {
            panic!("Expected a replace event");
        };
        assert_eq!((added.len(), removed.len()), (2, 2));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_invalid_endpoints_are_rejected() {
        let (planner, _, _) = planner(NETWORK, 1);
        let result = planner.calculate_wdm_paths(Some(&cp("A/1")), None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))), "Line port accepted as ingress");

        let result = planner.calculate_wdm_paths(None, Some(&cp("X/10")));
        assert!(matches!(result, Err(Error::InvalidArgument(_))), "Unknown device accepted as egress");
    }

    #[test]
    fn test_preconditions() {
        let (planner, _, _) = planner(r#"{"devices": []}"#, 1);
        assert!(matches!(planner.calculate_wdm_paths(None, None), Err(Error::PreconditionFailed(_))));

        let (planner, _, _) = self::planner(r#"{"devices": [{"id": "A", "type": "ROADM", "ports": [{"number": 1, "type": "OMS"}]}]}"#, 1);
        assert!(matches!(planner.calculate_wdm_paths(None, None), Err(Error::PreconditionFailed(_))));
    }

    #[test]
    fn test_calculation_resets_change_flag() {
        let (planner, _, detector) = planner(NETWORK, 1);
        detector.on_topology_event(&crate::domain::optical_model::network::inventory::TopologyEvent::LinkRemoved(
            crate::domain::optical_model::network::link::Link::new(cp("A/1"), cp("B/1")),
        ));
        assert!(detector.is_changed());

        planner.calculate_wdm_paths(None, None).unwrap();
        assert!(!detector.is_changed());
    }
}
