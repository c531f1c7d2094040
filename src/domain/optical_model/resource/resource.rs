use std::collections::BTreeSet;
use std::fmt;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::signal::och_signal::OchSignal;
use crate::domain::optical_model::utils::id::IntentKey;
use crate::error::Result;

/// A discrete, exclusively allocatable network resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Port(ConnectPoint),

    /// One flex-grid slot on an OMS port.
    Lambda(ConnectPoint, OchSignal),
}

impl Resource {
    pub fn connect_point(&self) -> &ConnectPoint {
        match self {
            Resource::Port(cp) | Resource::Lambda(cp, _) => cp,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Port(cp) => write!(f, "{}", cp),
            Resource::Lambda(cp, signal) => write!(f, "{}/{}", cp, signal),
        }
    }
}

/// Allocation of ports and spectrum slots to consumers.
pub trait ResourceService: Send + Sync {
    fn is_available(&self, resource: &Resource) -> bool;

    /// Flex-grid slots of `port` that are registered and not allocated.
    fn available_lambdas(&self, port: &ConnectPoint) -> BTreeSet<OchSignal>;

    /// Allocates every resource to `consumer` or none of them.
    ///
    /// Resources already held by the same consumer count as available.
    fn allocate(&self, consumer: &IntentKey, resources: &[Resource]) -> Result<()>;

    /// Releases everything held by `consumer` and returns what was released.
    fn release(&self, consumer: &IntentKey) -> Vec<Resource>;

    fn allocations(&self, consumer: &IntentKey) -> Vec<Resource>;
}
