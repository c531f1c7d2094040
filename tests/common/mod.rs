#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use optical_path_optimizer::api::network_dto::{
    CapabilityDto, DeviceDto, LinkDetailDto, LinkDto, NetworkDto, PortDto, SectionElementDto, SpectrumDto,
};
use optical_path_optimizer::domain::optical_model::config::OptimizerConfig;
use optical_path_optimizer::domain::optical_model::intent::intent_service::LocalIntentService;
use optical_path_optimizer::domain::optical_model::network::connect_point::ConnectPoint;
use optical_path_optimizer::domain::optical_model::network::device::{DeviceType, PortRole, PortType};
use optical_path_optimizer::domain::optical_model::network::link::{LinkState, LinkType};
use optical_path_optimizer::domain::optical_model::network::link_detail::StaticLinkDetailProvider;
use optical_path_optimizer::domain::optical_model::network::topology::NetworkTopology;
use optical_path_optimizer::domain::optical_model::optimizer::OpticalPathOptimizer;
use optical_path_optimizer::domain::optical_model::quality::config::{METHOD_INTERNAL, QualityConfig};
use optical_path_optimizer::domain::optical_model::resource::resource::{Resource, ResourceService};
use optical_path_optimizer::domain::optical_model::resource::resource_store::ResourceStore;
use optical_path_optimizer::domain::optical_model::signal::och_param::{ModulationFormat, Rate};
use optical_path_optimizer::domain::optical_model::signal::och_signal::OchSignal;
use optical_path_optimizer::domain::optical_model::utils::id::IntentKey;
use optical_path_optimizer::error::{Error, Result};

pub const VENDOR: &str = "vendorX";

pub fn cp(s: &str) -> ConnectPoint {
    s.parse().unwrap()
}

fn port(number: u64, port_type: PortType, role: PortRole) -> PortDto {
    PortDto { number, name: None, port_type, role, enabled: true }
}

fn roadm(id: &str) -> DeviceDto {
    DeviceDto {
        id: id.to_string(),
        device_type: DeviceType::Roadm,
        manufacturer: "roadmVendor".to_string(),
        ports: vec![
            port(1, PortType::Oms, PortRole::Line),
            port(2, PortType::Oms, PortRole::Line),
            port(10, PortType::Oms, PortRole::AddDrop),
            port(11, PortType::Oms, PortRole::AddDrop),
        ],
        capability: None,
    }
}

fn transponder(id: &str) -> DeviceDto {
    DeviceDto {
        id: id.to_string(),
        device_type: DeviceType::TerminalDevice,
        manufacturer: VENDOR.to_string(),
        ports: vec![port(1, PortType::Och, PortRole::Client)],
        capability: Some(CapabilityDto { rates: vec![Rate::R100G], modulation_formats: vec![ModulationFormat::DpQpsk] }),
    }
}

fn link(src: &str, dst: &str) -> LinkDto {
    LinkDto {
        src: cp(src),
        dst: cp(dst),
        link_type: LinkType::Optical,
        state: LinkState::Active,
        annotations: BTreeMap::new(),
        bidirectional: true,
    }
}

fn section(src: &str, dst: &str, km: f64) -> LinkDetailDto {
    let loss = km * 0.2;
    LinkDetailDto {
        src: cp(src),
        dst: cp(dst),
        elements: vec![
            SectionElementDto::Amp { amp_type: "HighGainAmp".to_string(), gain: 20.0 },
            SectionElementDto::Span { fiber_type: "smf".to_string(), span_loss: loss, srlg_length: km * 1000.0 },
            SectionElementDto::Amp { amp_type: "HighGainAmp".to_string(), gain: loss },
        ],
        bidirectional: true,
    }
}

/// Ring of four ROADMs with two transponders at A and two at C.
///
/// ```text
///            B
///   80km  /     \  60km
/// TP-1,3 A       C TP-2,4
///   70km  \     /  90km
///            D
/// ```
///
/// TP-1 and TP-3 attach to A/10 and A/11, TP-2 and TP-4 to C/10 and C/11.
pub fn ring_network() -> NetworkDto {
    NetworkDto {
        devices: vec![
            roadm("A"),
            roadm("B"),
            roadm("C"),
            roadm("D"),
            transponder("TP-1"),
            transponder("TP-2"),
            transponder("TP-3"),
            transponder("TP-4"),
        ],
        links: vec![
            link("A/1", "B/1"),
            link("B/2", "C/1"),
            link("A/2", "D/1"),
            link("D/2", "C/2"),
            link("TP-1/1", "A/10"),
            link("TP-3/1", "A/11"),
            link("TP-2/1", "C/10"),
            link("TP-4/1", "C/11"),
        ],
        link_details: vec![
            section("A/1", "B/1", 80.0),
            section("B/2", "C/1", 60.0),
            section("A/2", "D/1", 70.0),
            section("D/2", "C/2", 90.0),
        ],
        spectrum: Some(SpectrumDto::default()),
    }
}

/// The ring with an 50 km A/3-C/3 chord, and TP-3 moved to B/10.
///
/// TP-1 -> TP-2 can go straight over the chord while TP-3 -> TP-4 goes
/// B -> A -> C over the same chord, so a disjoint pairing may share a hop.
pub fn chord_network() -> NetworkDto {
    let mut dto = ring_network();
    for device in dto.devices.iter_mut().filter(|d| d.id == "A" || d.id == "C") {
        device.ports.push(port(3, PortType::Oms, PortRole::Line));
    }
    dto.links.retain(|l| l.src != cp("TP-3/1"));
    dto.links.push(link("TP-3/1", "B/10"));
    dto.links.push(link("A/3", "C/3"));
    dto.link_details.push(section("A/3", "C/3", 50.0));
    dto
}

/// Q is a constant 8.5 against a threshold of 7.0, so every path has a margin of 1.5.
pub fn quality() -> QualityConfig {
    let param = "R100G/dp-qpsk".to_string();
    QualityConfig {
        method: METHOD_INTERNAL.to_string(),
        osnr_q_constants_map: BTreeMap::from([(VENDOR.to_string(), BTreeMap::from([(param.clone(), vec![8.5])]))]),
        q_threshold_map: BTreeMap::from([(VENDOR.to_string(), BTreeMap::from([(param, 7.0)]))]),
        ..QualityConfig::default()
    }
}

pub fn config() -> OptimizerConfig {
    OptimizerConfig { k: 2, quality: quality(), ..OptimizerConfig::default() }
}

pub fn optimizer() -> OpticalPathOptimizer {
    OpticalPathOptimizer::from_network(&ring_network(), config()).unwrap()
}

/// Optimizer with the WDM catalog already calculated.
pub fn planned_optimizer() -> OpticalPathOptimizer {
    let optimizer = optimizer();
    optimizer.calculate_wdm_paths(None, None).unwrap();
    optimizer
}

/// Resource store that can be told to refuse every allocation.
pub struct FlakyResources {
    pub inner: ResourceStore,
    pub refuse: AtomicBool,
}

impl FlakyResources {
    pub fn refuse_allocations(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

impl ResourceService for FlakyResources {
    fn is_available(&self, resource: &Resource) -> bool {
        self.inner.is_available(resource)
    }

    fn available_lambdas(&self, port: &ConnectPoint) -> std::collections::BTreeSet<OchSignal> {
        self.inner.available_lambdas(port)
    }

    fn allocate(&self, consumer: &IntentKey, resources: &[Resource]) -> Result<()> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Error::Rejected("allocation refused".to_string()));
        }
        self.inner.allocate(consumer, resources)
    }

    fn release(&self, consumer: &IntentKey) -> Vec<Resource> {
        self.inner.release(consumer)
    }

    fn allocations(&self, consumer: &IntentKey) -> Vec<Resource> {
        self.inner.allocations(consumer)
    }
}

/// Collaborators exposed so tests can drive them directly.
pub struct Harness {
    pub optimizer: OpticalPathOptimizer,
    pub resources: Arc<FlakyResources>,
    pub intents: Arc<LocalIntentService>,
}

pub fn harness(auto_install: bool) -> Harness {
    harness_on(&ring_network(), auto_install)
}

pub fn harness_on(dto: &NetworkDto, auto_install: bool) -> Harness {
    let topology = Arc::new(NetworkTopology::from_dto(dto).unwrap());
    let link_details = Arc::new(StaticLinkDetailProvider::from_dto(dto));

    let inner = ResourceStore::new();
    inner.register_spectrum(topology.as_ref(), &SpectrumDto::default());
    let resources = Arc::new(FlakyResources { inner, refuse: AtomicBool::new(false) });
    let intents = Arc::new(LocalIntentService::new(resources.clone(), auto_install));

    let optimizer = OpticalPathOptimizer::new(config(), topology, link_details, resources.clone(), intents.clone()).unwrap();
    optimizer.calculate_wdm_paths(None, None).unwrap();
    Harness { optimizer, resources, intents }
}

/// The single TP-1 -> TP-2 port pair.
pub fn main_pair() -> Vec<(ConnectPoint, ConnectPoint)> {
    vec![(cp("TP-1/1"), cp("TP-2/1"))]
}

/// TP-1 -> TP-2 as main and TP-3 -> TP-4 as tributary.
pub fn disjoint_pairs() -> Vec<(ConnectPoint, ConnectPoint)> {
    vec![(cp("TP-1/1"), cp("TP-2/1")), (cp("TP-3/1"), cp("TP-4/1"))]
}
