use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::quality::q_value::QValue;
use crate::domain::optical_model::signal::och_param::OchParam;
use crate::domain::optical_model::signal::och_signal::OchSignal;
use crate::domain::optical_model::utils::id::DeviceId;

/// One leg of a wavelength-path candidate: Och port to Och port over a WDM path.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthPathEntry {
    /// Och port of the source transponder to the OMS add port.
    pub ingress_edge: Link,

    /// OMS drop port to the Och port of the destination transponder.
    pub egress_edge: Link,

    pub path: Path,

    /// Assignable 50GHz channels by frequency id.
    pub signals: BTreeMap<i32, OchSignal>,

    pub och_param: OchParam,

    /// The lower Q of both directions.
    pub q_value: QValue,
}

impl WavelengthPathEntry {
    pub fn src_och(&self) -> &ConnectPoint {
        &self.ingress_edge.src
    }

    pub fn oms_add_port(&self) -> &ConnectPoint {
        &self.ingress_edge.dst
    }

    pub fn oms_drop_port(&self) -> &ConnectPoint {
        &self.egress_edge.src
    }

    pub fn dst_och(&self) -> &ConnectPoint {
        &self.egress_edge.dst
    }

    pub fn signal(&self, frequency_id: i32) -> Option<&OchSignal> {
        self.signals.get(&frequency_id)
    }

    /// Ingress edge, WDM path links, egress edge.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::with_capacity(self.path.links().len() + 2);
        links.push(self.ingress_edge.clone());
        links.extend_from_slice(self.path.links());
        links.push(self.egress_edge.clone());
        links
    }

    /// Devices the path passes through, excluding its own add and drop ROADMs.
    fn transit_devices(&self) -> BTreeSet<DeviceId> {
        let ends = [&self.oms_add_port().device_id, &self.oms_drop_port().device_id];
        self.path.links().iter().map(|l| &l.dst.device_id).filter(|d| !ends.contains(d)).cloned().collect()
    }

    /// No shared transit device. Two legs without any transit device are not
    /// considered disjoint.
    pub fn is_disjoint(&self, other: &WavelengthPathEntry) -> bool {
        let (mine, theirs) = (self.transit_devices(), other.transit_devices());
        if mine.is_empty() && theirs.is_empty() {
            return false;
        }
        mine.is_disjoint(&theirs)
    }
}

/// A ranked planning result: a single path, or a main and a tributary leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub entries: Vec<WavelengthPathEntry>,
}

impl Candidate {
    pub fn single(entry: WavelengthPathEntry) -> Self {
        Self { entries: vec![entry] }
    }

    pub fn pair(main: WavelengthPathEntry, tributary: WavelengthPathEntry) -> Self {
        Self { entries: vec![main, tributary] }
    }

    pub fn is_disjoint_pair(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn kind(&self) -> &'static str {
        if self.is_disjoint_pair() { "Disjoint-path" } else { "Single-path" }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        for entry in &self.entries {
            write!(f, " [{} -> {} {} {}]", entry.src_och(), entry.dst_och(), entry.och_param, entry.q_value)?;
        }
        Ok(())
    }
}
