use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::api::network_dto::{CapabilityDto, DeviceDto, PortDto};
use crate::domain::optical_model::network::connect_point::{ConnectPoint, PortNumber};
use crate::domain::optical_model::signal::och_param::{ModulationFormat, Rate};
use crate::domain::optical_model::utils::id::{DeviceId, Vendor};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Roadm,
    RoadmOtn,
    OpticalAmplifier,
    TerminalDevice,
    Other,
}

impl DeviceType {
    pub fn is_roadm(&self) -> bool {
        matches!(self, DeviceType::Roadm | DeviceType::RoadmOtn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortType {
    Oms,
    Och,
    Fiber,
    Other,
}

impl PortType {
    pub fn is_oms_or_fiber(&self) -> bool {
        matches!(self, PortType::Oms | PortType::Fiber)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortRole {
    #[default]
    Line,
    AddDrop,
    Client,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub number: PortNumber,
    pub name: Option<String>,
    pub port_type: PortType,
    pub role: PortRole,
    pub enabled: bool,
}

/// Rates and modulation formats a terminal device can transmit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransponderCapability {
    pub rates: BTreeSet<Rate>,
    pub modulation_formats: BTreeSet<ModulationFormat>,
}

impl TransponderCapability {
    pub fn supports(&self, rate: Rate, modulation_format: ModulationFormat) -> bool {
        self.rates.contains(&rate) && self.modulation_formats.contains(&modulation_format)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub device_type: DeviceType,
    pub manufacturer: Vendor,
    pub ports: Vec<Port>,

    /// Present only on devices that terminate wavelength paths.
    pub capability: Option<TransponderCapability>,
}

impl Device {
    pub fn from_dto(dto: DeviceDto) -> Result<Self> {
        if dto.id.is_empty() {
            return Err(Error::ModelConstructionError("Device without id.".to_string()));
        }

        let mut ports: Vec<Port> = Vec::with_capacity(dto.ports.len());
        for port_dto in dto.ports {
            if ports.iter().any(|p| p.number.0 == port_dto.number) {
                return Err(Error::ModelConstructionError(format!("Duplicate port {} on device {}", port_dto.number, dto.id)));
            }
            ports.push(Port {
                number: PortNumber(port_dto.number),
                name: port_dto.name,
                port_type: port_dto.port_type,
                role: port_dto.role,
                enabled: port_dto.enabled,
            });
        }

        let capability = dto.capability.map(|c| TransponderCapability {
            rates: c.rates.into_iter().collect(),
            modulation_formats: c.modulation_formats.into_iter().collect(),
        });

        Ok(Device {
            id: DeviceId::new(dto.id),
            device_type: dto.device_type,
            manufacturer: Vendor::new(dto.manufacturer),
            ports,
            capability,
        })
    }

    pub fn to_dto(&self) -> DeviceDto {
        DeviceDto {
            id: self.id.to_string(),
            device_type: self.device_type,
            manufacturer: self.manufacturer.to_string(),
            ports: self
                .ports
                .iter()
                .map(|p| PortDto {
                    number: p.number.0,
                    name: p.name.clone(),
                    port_type: p.port_type,
                    role: p.role,
                    enabled: p.enabled,
                })
                .collect(),
            capability: self.capability.as_ref().map(|c| CapabilityDto {
                rates: c.rates.iter().copied().collect(),
                modulation_formats: c.modulation_formats.iter().copied().collect(),
            }),
        }
    }

    pub fn port(&self, number: PortNumber) -> Option<&Port> {
        self.ports.iter().find(|p| p.number == number)
    }

    /// OMS add/drop ports of a ROADM, in declaration order. Empty for any other device.
    pub fn oms_add_drop_ports(&self) -> Vec<ConnectPoint> {
        if !self.device_type.is_roadm() {
            return Vec::new();
        }
        self.ports
            .iter()
            .filter(|p| p.port_type == PortType::Oms && p.role == PortRole::AddDrop)
            .map(|p| ConnectPoint { device_id: self.id.clone(), port: p.number })
            .collect()
    }

    pub fn is_oms_add_drop_port(&self, number: PortNumber) -> bool {
        self.device_type.is_roadm()
            && self.port(number).is_some_and(|p| p.port_type == PortType::Oms && p.role == PortRole::AddDrop)
    }

    /// Whether the given port carries lambda resources (OMS port on a ROADM).
    pub fn has_lambda_resource(&self, number: PortNumber) -> bool {
        self.device_type.is_roadm() && self.port(number).is_some_and(|p| p.port_type == PortType::Oms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(number: u64, port_type: PortType, role: PortRole) -> Port {
        Port { number: PortNumber(number), name: None, port_type, role, enabled: true }
    }

    #[test]
    fn test_from_dto_rejects_duplicate_ports() {
        let dto: DeviceDto = serde_json::from_str(
            r#"{"id": "TP-1", "type": "TERMINAL_DEVICE", "ports": [{"number": 1, "type": "OCH"}, {"number": 1, "type": "OCH"}]}"#,
        )
        .unwrap();
        assert!(matches!(Device::from_dto(dto), Err(Error::ModelConstructionError(_))));
    }

    #[test]
    fn test_oms_add_drop_ports_only_on_roadm() {
        let ports = vec![port(1, PortType::Oms, PortRole::Line), port(10, PortType::Oms, PortRole::AddDrop), port(11, PortType::Och, PortRole::AddDrop)];
        let roadm = Device {
            id: DeviceId::new("ROADM-A"),
            device_type: DeviceType::Roadm,
            manufacturer: Vendor::new("vendor"),
            ports: ports.clone(),
            capability: None,
        };
        assert_eq!(roadm.oms_add_drop_ports(), vec![ConnectPoint::new("ROADM-A", 10)]);
        assert!(roadm.has_lambda_resource(PortNumber(1)));
        assert!(!roadm.has_lambda_resource(PortNumber(11)));

        let amp = Device { device_type: DeviceType::OpticalAmplifier, ..roadm };
        assert!(amp.oms_add_drop_ports().is_empty());
        assert!(!amp.is_oms_add_drop_port(PortNumber(10)));
    }
}
