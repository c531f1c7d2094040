use std::fmt;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::utils::id::DeviceId;
use crate::error::{Error, Result};

/// Represents a route through the network as an ordered sequence of contiguous links.
///
/// The destination device of link *i* is always the source device of link *i+1*,
/// and a path holds at least one link. Both are enforced by [`Path::new`].
#[derive(Debug, Clone)]
pub struct Path {
    links: Vec<Link>,

    /// Sum of the per-link weights used to rank this path (span length in km).
    pub weight: f64,
}

impl Path {
    pub fn new(links: Vec<Link>, weight: f64) -> Result<Self> {
        if links.is_empty() {
            return Err(Error::InvalidArgument("Path must contain at least one link.".to_string()));
        }
        for pair in links.windows(2) {
            if pair[0].dst.device_id != pair[1].src.device_id {
                return Err(Error::InvalidArgument(format!("Links are not contiguous: {} then {}", pair[0], pair[1])));
            }
        }
        Ok(Self { links, weight })
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn src(&self) -> &ConnectPoint {
        &self.links[0].src
    }

    pub fn dst(&self) -> &ConnectPoint {
        &self.links[self.links.len() - 1].dst
    }

    /// Every connect point touched by the path, in traversal order.
    pub fn hops(&self) -> Vec<ConnectPoint> {
        self.links.iter().flat_map(|l| [l.src.clone(), l.dst.clone()]).collect()
    }

    /// Devices visited by the path, in traversal order and without repeats.
    pub fn devices(&self) -> Vec<DeviceId> {
        let mut devices = vec![self.src().device_id.clone()];
        for link in &self.links {
            if devices.last() != Some(&link.dst.device_id) {
                devices.push(link.dst.device_id.clone());
            }
        }
        devices
    }

    /// The structurally mirrored path: same nodes, every link reversed,
    /// per-link annotations and the weight preserved.
    pub fn reverse(&self) -> Path {
        Path { links: self.links.iter().rev().map(Link::reversed).collect(), weight: self.weight }
    }

    /// True if `other` visits the same connect points in the opposite order.
    pub fn is_reverse_of(&self, other: &Path) -> bool {
        let mut mine = self.hops();
        mine.reverse();
        mine == other.hops()
    }
}

/// Two paths are equal when they traverse the same links; the weight is derived data.
impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.links == other.links
    }
}

impl Eq for Path {}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hops: Vec<String> = self.links.iter().map(|l| l.to_string()).collect();
        write!(f, "[{}] ({:.3})", hops.join(", "), self.weight)
    }
}
