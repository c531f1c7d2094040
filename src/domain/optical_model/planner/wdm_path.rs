use std::fmt;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::quality::osnr_provider::OsnrMap;

/// A route between two OMS add/drop ports with the OSNR it achieves per
/// (rate, modulation format). Immutable once built.
#[derive(Debug, Clone)]
pub struct WdmPath {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
    pub path: Path,
    pub osnr: OsnrMap,
}

impl WdmPath {
    pub fn new(src: ConnectPoint, dst: ConnectPoint, path: Path, osnr: OsnrMap) -> Self {
        Self { src, dst, path, osnr }
    }

    pub fn endpoints(&self) -> (&ConnectPoint, &ConnectPoint) {
        (&self.src, &self.dst)
    }

    /// True if `other` connects the same ports in the opposite direction over the mirrored route.
    pub fn is_reverse_of(&self, other: &WdmPath) -> bool {
        self.src == other.dst && self.dst == other.src && self.path.is_reverse_of(&other.path)
    }
}

/// Identity is (src, dst, path); the OSNR map is derived data.
impl PartialEq for WdmPath {
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src && self.dst == other.dst && self.path == other.path
    }
}

impl fmt::Display for WdmPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WdmPath {} -> {} {}", self.src, self.dst, self.path)
    }
}
