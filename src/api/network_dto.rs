use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::device::{DeviceType, PortRole, PortType};
use crate::domain::optical_model::network::link::{LinkState, LinkType};
use crate::domain::optical_model::signal::och_param::{ModulationFormat, Rate};

/// Root of the network document: inventory, per-link physical details and the
/// spectrum registered on every ROADM OMS port.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDto {
    pub devices: Vec<DeviceDto>,

    #[serde(default)]
    pub links: Vec<LinkDto>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link_details: Vec<LinkDetailDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<SpectrumDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDto {
    pub id: String,

    #[serde(rename = "type")]
    pub device_type: DeviceType,

    #[serde(default)]
    pub manufacturer: String,

    #[serde(default)]
    pub ports: Vec<PortDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PortDto {
    pub number: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub port_type: PortType,

    #[serde(default)]
    pub role: PortRole,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDto {
    #[serde(default)]
    pub rates: Vec<Rate>,

    #[serde(default)]
    pub modulation_formats: Vec<ModulationFormat>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LinkDto {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,

    #[serde(rename = "type", default)]
    pub link_type: LinkType,

    #[serde(default)]
    pub state: LinkState,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Also create the `dst -> src` link.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bidirectional: bool,
}

/// Ordered physical elements between the two ends of a link.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LinkDetailDto {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
    pub elements: Vec<SectionElementDto>,

    /// Apply the same elements, in reverse order, to `dst -> src`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bidirectional: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SectionElementDto {
    #[serde(rename_all = "camelCase")]
    Amp { amp_type: String, gain: f64 },

    #[serde(rename_all = "camelCase")]
    Span { fiber_type: String, span_loss: f64, srlg_length: f64 },

    PreAmpFiber,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumDto {
    #[serde(rename = "lowestFrequencyTHz")]
    pub lowest_frequency_thz: f64,

    #[serde(rename = "highestFrequencyTHz")]
    pub highest_frequency_thz: f64,
}

impl Default for SpectrumDto {
    fn default() -> Self {
        Self { lowest_frequency_thz: 191.35, highest_frequency_thz: 196.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_network_document() {
        let json = r#"{
            "devices": [
                {"id": "ROADM-A", "type": "ROADM", "manufacturer": "vendorX",
                 "ports": [{"number": 1, "type": "OMS"}, {"number": 10, "type": "OMS", "role": "ADD_DROP"}]}
            ],
            "links": [{"src": "ROADM-A/1", "dst": "ROADM-B/1", "bidirectional": true}],
            "linkDetails": [{"src": "ROADM-A/1", "dst": "ROADM-B/1", "elements": [
                {"type": "amp", "ampType": "HighGainAmp", "gain": 20.0},
                {"type": "span", "fiberType": "smf", "spanLoss": 20.0, "srlgLength": 80000.0}
            ]}]
        }"#;

        let dto: NetworkDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.devices[0].ports[1].role, PortRole::AddDrop);
        assert!(dto.devices[0].ports[0].enabled);
        assert_eq!(dto.links[0].state, LinkState::Active);
        assert!(dto.links[0].bidirectional);
        assert_eq!(
            dto.link_details[0].elements[1],
            SectionElementDto::Span { fiber_type: "smf".into(), span_loss: 20.0, srlg_length: 80000.0 }
        );
        assert!(dto.spectrum.is_none());
    }
}
