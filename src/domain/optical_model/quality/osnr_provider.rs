use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::network::link_detail::LinkDetailProvider;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::quality::config::{QualityConfig, QualityMethod};
use crate::domain::optical_model::quality::external_invoker::ExternalOsnrInvoker;
use crate::domain::optical_model::quality::internal_provider::InternalOsnrProvider;
use crate::domain::optical_model::signal::och_param::OchParam;
use crate::error::Result;

/// OSNR [dB] per (rate, modulation format).
pub type OsnrMap = BTreeMap<OchParam, f64>;

/// Computes the OSNR of candidate paths.
pub trait OsnrProvider {
    /// Returns one map per path, in the order of `paths`. A combination
    /// without quality data is left out of its map.
    fn evaluate(&self, paths: &[Path], params: &[OchParam]) -> Result<Vec<OsnrMap>>;
}

/// Picks the provider configured by `quality.method`.
pub fn provider_for(
    config: &QualityConfig,
    inventory: Arc<dyn NetworkInventory>,
    link_details: Arc<dyn LinkDetailProvider>,
) -> Box<dyn OsnrProvider> {
    match config.method() {
        QualityMethod::Internal => Box::new(InternalOsnrProvider::new(config.clone(), link_details)),
        QualityMethod::Gnpy => Box::new(ExternalOsnrInvoker::new(config.clone(), inventory, link_details)),
    }
}
