use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::optical_model::utils::id::DeviceId;
use crate::error::Error;

/// Port number local to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNumber(pub u64);

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (device, port) pair. Printed and parsed as `device/port`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectPoint {
    pub device_id: DeviceId,
    pub port: PortNumber,
}

impl ConnectPoint {
    pub fn new(device_id: impl Into<DeviceId>, port: u64) -> Self {
        Self { device_id: device_id.into(), port: PortNumber(port) }
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.port)
    }
}

impl fmt::Debug for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for ConnectPoint {
    type Err = Error;

    /// The port is the part after the last `/` so that device ids may contain slashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device, port) = s
            .rsplit_once('/')
            .ok_or_else(|| Error::InvalidArgument(format!("Connect point must be formatted as device/port: '{}'", s)))?;

        if device.is_empty() {
            return Err(Error::InvalidArgument(format!("Connect point has an empty device id: '{}'", s)));
        }

        let port = port
            .parse::<u64>()
            .map_err(|_| Error::InvalidArgument(format!("Connect point has an invalid port number: '{}'", s)))?;

        Ok(ConnectPoint::new(device, port))
    }
}

impl TryFrom<String> for ConnectPoint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConnectPoint> for String {
    fn from(cp: ConnectPoint) -> Self {
        cp.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connect_point() {
        let cp: ConnectPoint = "ROADM-A/10".parse().unwrap();
        assert_eq!(cp.device_id, DeviceId::new("ROADM-A"));
        assert_eq!(cp.port, PortNumber(10));
        assert_eq!(cp.to_string(), "ROADM-A/10");
    }

    #[test]
    fn test_parse_device_id_with_slash() {
        let cp: ConnectPoint = "of:0001/sub/3".parse().unwrap();
        assert_eq!(cp.device_id.as_str(), "of:0001/sub");
        assert_eq!(cp.port, PortNumber(3));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("ROADM-A".parse::<ConnectPoint>(), Err(Error::InvalidArgument(_))));
        assert!(matches!("ROADM-A/x".parse::<ConnectPoint>(), Err(Error::InvalidArgument(_))));
        assert!(matches!("/3".parse::<ConnectPoint>(), Err(Error::InvalidArgument(_))));
    }
}
