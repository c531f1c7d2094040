use std::sync::Arc;

use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::network::link_detail::LinkDetailProvider;

/// Assigns a traversal cost to a link.
pub trait LinkWeigher {
    /// `None` marks the link as non-viable; the path search never uses it.
    fn weight(&self, link: &Link) -> Option<f64>;
}

/// Weighs OMS/fiber links by their physical span length in km.
pub struct FiberSpanWeigher {
    inventory: Arc<dyn NetworkInventory>,
    link_details: Arc<dyn LinkDetailProvider>,
}

impl FiberSpanWeigher {
    pub fn new(inventory: Arc<dyn NetworkInventory>, link_details: Arc<dyn LinkDetailProvider>) -> Self {
        Self { inventory, link_details }
    }

    fn is_line_port(&self, link: &Link) -> bool {
        [&link.src, &link.dst].into_iter().all(|cp| self.inventory.port(cp).is_some_and(|p| p.port_type.is_oms_or_fiber()))
    }
}

impl LinkWeigher for FiberSpanWeigher {
    fn weight(&self, link: &Link) -> Option<f64> {
        if !link.is_active() || !self.is_line_port(link) {
            return None;
        }

        let span_km = self.link_details.total_span_km(link);
        if span_km <= 0.0 {
            log::trace!("Link {} has no span length, skipped", link);
            return None;
        }
        Some(span_km)
    }
}
