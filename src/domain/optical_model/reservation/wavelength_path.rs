use std::fmt;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::quality::q_value::QValue;
use crate::domain::optical_model::signal::och_param::OchParam;
use crate::domain::optical_model::signal::och_signal::OchSignal;

/// A reserved wavelength path: one leg of a redundancy group.
///
/// `id` is assigned by the store. `submitted` only ever goes from false to true.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthPath {
    pub id: u64,
    pub group_id: u64,
    pub frequency_id: i32,

    /// 50GHz DWDM channel of `frequency_id`.
    pub signal: OchSignal,

    pub ingress_edge: Link,
    pub egress_edge: Link,
    pub path: Path,
    pub och_param: OchParam,
    pub q_value: QValue,
    pub name: String,
    pub submitted: bool,
}

impl WavelengthPath {
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

    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::with_capacity(self.path.links().len() + 2);
        links.push(self.ingress_edge.clone());
        links.extend_from_slice(self.path.links());
        links.push(self.egress_edge.clone());
        links
    }

    pub fn center_frequency_thz(&self) -> f64 {
        self.signal.center_frequency_thz()
    }
}

impl fmt::Display for WavelengthPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WavelengthPath[id={} group={} {} -> {} freq={} {} {} submitted={}]",
            self.id,
            self.group_id,
            self.src_och(),
            self.dst_och(),
            self.frequency_id,
            self.och_param,
            self.q_value,
            self.submitted
        )
    }
}
