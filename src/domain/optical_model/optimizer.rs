use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::api::network_dto::NetworkDto;
use crate::domain::optical_model::assigner::candidate::Candidate;
use crate::domain::optical_model::assigner::wavelength_assigner::WavelengthAssigner;
use crate::domain::optical_model::config::OptimizerConfig;
use crate::domain::optical_model::intent::intent_service::{IntentService, LocalIntentService};
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::device::PortType;
use crate::domain::optical_model::network::inventory::{NetworkInventory, TopologyEvent};
use crate::domain::optical_model::network::link::LinkState;
use crate::domain::optical_model::network::link_detail::{LinkDetailProvider, StaticLinkDetailProvider};
use crate::domain::optical_model::network::topology::NetworkTopology;
use crate::domain::optical_model::planner::change_detector::TopologyChangeDetector;
use crate::domain::optical_model::planner::wdm_path::WdmPath;
use crate::domain::optical_model::planner::wdm_path_planner::WdmPathPlanner;
use crate::domain::optical_model::planner::wdm_path_store::{WdmPathEvent, WdmPathStore};
use crate::domain::optical_model::reservation::event_journal::EventJournal;
use crate::domain::optical_model::reservation::reservation_manager::{ReservationManager, WithdrawnIntentCleaner};
use crate::domain::optical_model::reservation::wavelength_path::WavelengthPath;
use crate::domain::optical_model::reservation::wavelength_path_store::WavelengthPathStore;
use crate::domain::optical_model::resource::resource::ResourceService;
use crate::domain::optical_model::resource::resource_store::ResourceStore;
use crate::domain::optical_model::signal::frequency_converter::FrequencyConverter;
use crate::domain::optical_model::utils::id::DeviceId;
use crate::error::{Error, Result};

pub const STALE_CATALOG_MESSAGE: &str = "Detected the topology has changed after WDM path calculated.\n\
Before executing wavelength-path-calc, you need to run wdm-path-calc.\n\
Or execute this command with `--force` option.";

/// Selection for [`OpticalPathOptimizer::wavelength_paths`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct WavelengthPathFilter {
    pub id: Option<u64>,
    pub group_id: Option<u64>,
    pub ingress: Option<ConnectPoint>,
    pub egress: Option<ConnectPoint>,
    pub reserved_only: bool,
    pub submitted_only: bool,
}

/// Entry point of the planning engine.
///
/// Owns the catalogs and wires planner, assigner and reservation manager to
/// the inventory, resource and intent collaborators. WDM and wavelength-path
/// planning, reservation, submission and removal are serialized through the
/// candidate list lock.
pub struct OpticalPathOptimizer {
    config: OptimizerConfig,
    topology: Arc<NetworkTopology>,
    intents: Arc<dyn IntentService>,
    wdm_paths: Arc<WdmPathStore>,
    wavelength_paths: Arc<WavelengthPathStore>,
    detector: Arc<TopologyChangeDetector>,
    planner: WdmPathPlanner,
    assigner: WavelengthAssigner,
    reservations: ReservationManager,
    candidates: Mutex<Vec<Candidate>>,
}

impl OpticalPathOptimizer {
    pub fn new(
        config: OptimizerConfig,
        topology: Arc<NetworkTopology>,
        link_details: Arc<dyn LinkDetailProvider>,
        resources: Arc<dyn ResourceService>,
        intents: Arc<dyn IntentService>,
    ) -> Result<Self> {
        let config = config.validated();
        let inventory: Arc<dyn NetworkInventory> = topology.clone();
        let wdm_paths = Arc::new(WdmPathStore::new());
        let wavelength_paths = Arc::new(WavelengthPathStore::new());
        let detector = Arc::new(TopologyChangeDetector::new(inventory.clone()));

        if let Some(journal) = &config.event_journal {
            wavelength_paths.add_listener(Arc::new(EventJournal::open(journal)?));
        }
        intents.add_listener(Arc::new(WithdrawnIntentCleaner::new(wavelength_paths.clone())));

        let planner = WdmPathPlanner::new(
            inventory.clone(),
            link_details,
            config.quality.clone(),
            config.k,
            wdm_paths.clone(),
            detector.clone(),
        );
        let assigner = WavelengthAssigner::new(
            inventory.clone(),
            resources.clone(),
            wdm_paths.clone(),
            config.quality.clone(),
            FrequencyConverter::new(config.lowest_frequency_thz_for_calc_id),
        );
        let reservations = ReservationManager::new(inventory, resources, intents.clone(), wavelength_paths.clone());

        Ok(Self {
            config,
            topology,
            intents,
            wdm_paths,
            wavelength_paths,
            detector,
            planner,
            assigner,
            reservations,
            candidates: Mutex::new(Vec::new()),
        })
    }

    /// Builds the optimizer with in-memory collaborators from a network document.
    /// The spectrum of the document (or the default one) is registered on every OMS port.
    pub fn from_network(dto: &NetworkDto, config: OptimizerConfig) -> Result<Self> {
        let topology = Arc::new(NetworkTopology::from_dto(dto)?);
        let link_details = Arc::new(StaticLinkDetailProvider::from_dto(dto));

        let resources = Arc::new(ResourceStore::new());
        resources.register_spectrum(topology.as_ref(), &dto.spectrum.clone().unwrap_or_default());
        let intents = Arc::new(LocalIntentService::new(resources.clone(), true));

        Self::new(config, topology, link_details, resources, intents)
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn topology(&self) -> &Arc<NetworkTopology> {
        &self.topology
    }

    pub fn intents(&self) -> &Arc<dyn IntentService> {
        &self.intents
    }

    pub fn frequency_converter(&self) -> FrequencyConverter {
        FrequencyConverter::new(self.config.lowest_frequency_thz_for_calc_id)
    }

    pub fn calculate_wdm_paths(&self, ingress: Option<&ConnectPoint>, egress: Option<&ConnectPoint>) -> Result<WdmPathEvent> {
        let _guard = self.candidates.lock().expect("Mutex poisoned");
        self.planner.calculate_wdm_paths(ingress, egress)
    }

    pub fn is_recomputation_needed(&self) -> bool {
        self.detector.is_changed()
    }

    /// WDM paths sorted by (src, dst). The order of routes between the same
    /// ports is kept.
    pub fn wdm_paths(&self, ingress: Option<&ConnectPoint>, egress: Option<&ConnectPoint>) -> Vec<Arc<WdmPath>> {
        let mut paths = self.wdm_paths.get_paths(ingress, egress);
        paths.sort_by(|a, b| a.endpoints().cmp(&b.endpoints()));
        paths
    }

    /// Plans candidates for one or two Och port pairs and keeps them for
    /// [`OpticalPathOptimizer::reserve`].
    ///
    /// Fails on a stale WDM catalog unless `force` is set.
    pub fn calculate_wavelength_paths(&self, endpoints: &[(ConnectPoint, ConnectPoint)], force: bool) -> Result<Vec<Candidate>> {
        let mut seen: HashSet<&ConnectPoint> = HashSet::new();
        for (ingress, egress) in endpoints {
            for cp in [ingress, egress] {
                self.check_och_port(cp)?;
                if !seen.insert(cp) {
                    return Err(Error::InvalidArgument("All ports must be different ports.".to_string()));
                }
            }
        }
        let mut guard = self.candidates.lock().expect("Mutex poisoned");
        if !force && self.detector.is_changed() {
            return Err(Error::PreconditionFailed(STALE_CATALOG_MESSAGE.to_string()));
        }

        guard.clear();
        let candidates = self.assigner.plan_wavelength_paths(endpoints)?;
        *guard = candidates.clone();
        self.detector.reset();
        Ok(candidates)
    }

    /// The result of the last wavelength-path calculation.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidates.lock().expect("Mutex poisoned").clone()
    }

    /// Reserves the candidate at the 1-based `index` of the last calculation.
    pub fn reserve(&self, index: usize, frequency_ids: &[i32], names: &[String]) -> Result<Vec<WavelengthPath>> {
        let guard = self.candidates.lock().expect("Mutex poisoned");
        self.reservations.reserve(&guard, index, frequency_ids, names)
    }

    pub fn submit(&self, group_id: u64) -> Result<Vec<WavelengthPath>> {
        let _guard = self.candidates.lock().expect("Mutex poisoned");
        self.reservations.submit(group_id)
    }

    pub fn remove(&self, group_id: u64) -> Result<Vec<WavelengthPath>> {
        let _guard = self.candidates.lock().expect("Mutex poisoned");
        self.reservations.remove(group_id)
    }

    /// Stored wavelength paths sorted by (group id, id).
    pub fn wavelength_paths(&self, filter: &WavelengthPathFilter) -> Result<Vec<WavelengthPath>> {
        let mut paths = match (filter.id, filter.group_id) {
            (Some(id), _) => {
                let path = self
                    .wavelength_paths
                    .get(id)
                    .ok_or_else(|| Error::InvalidArgument(format!("Not found wavelength path. ID={}", id)))?;
                vec![path]
            }
            (None, Some(group_id)) => self.wavelength_paths.get_group(group_id),
            (None, None) => self.wavelength_paths.get_paths(filter.ingress.as_ref(), filter.egress.as_ref()),
        };

        paths.retain(|p| {
            filter.group_id.is_none_or(|g| p.group_id == g)
                && filter.ingress.as_ref().is_none_or(|cp| p.src_och() == cp || p.dst_och() == cp)
                && filter.egress.as_ref().is_none_or(|cp| p.src_och() == cp || p.dst_och() == cp)
                && (!filter.reserved_only || !p.submitted)
                && (!filter.submitted_only || p.submitted)
        });
        paths.sort_by_key(|p| (p.group_id, p.id));
        Ok(paths)
    }

    pub fn update_link_state(&self, src: &ConnectPoint, dst: &ConnectPoint, state: LinkState) -> Result<()> {
        let event = self.topology.update_link_state(src, dst, state)?;
        self.on_topology_events(&[event]);
        Ok(())
    }

    pub fn remove_link(&self, src: &ConnectPoint, dst: &ConnectPoint) -> Result<()> {
        let event = self.topology.remove_link(src, dst)?;
        self.on_topology_events(&[event]);
        Ok(())
    }

    pub fn remove_device(&self, device_id: &DeviceId) -> Result<()> {
        let events = self.topology.remove_device(device_id)?;
        self.on_topology_events(&events);
        Ok(())
    }

    /// Feeds topology changes made outside the optimizer to the change detector.
    pub fn on_topology_events(&self, events: &[TopologyEvent]) {
        for event in events {
            self.detector.on_topology_event(event);
        }
    }

    pub fn check_och_port(&self, cp: &ConnectPoint) -> Result<()> {
        let device = self
            .topology
            .device(&cp.device_id)
            .ok_or_else(|| Error::PreconditionFailed(format!("Device not found. {}", cp)))?;
        let port = device.port(cp.port).ok_or_else(|| Error::PreconditionFailed(format!("Port not found. {}", cp)))?;
        if device.device_type.is_roadm() || port.port_type != PortType::Och {
            return Err(Error::InvalidArgument(format!("Port must be an OCH port of a transponder. {}", cp)));
        }
        Ok(())
    }
}
