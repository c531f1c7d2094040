use crate::api::network_dto::NetworkDto;
use crate::domain::optical_model::config::OptimizerConfig;
use crate::domain::optical_model::optimizer::OpticalPathOptimizer;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod cli;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads the network document and optional optimizer settings and builds an
/// optimizer with in-memory resource and intent services.
pub fn load_optimizer(network_path: &str, config_path: Option<&str>) -> Result<OpticalPathOptimizer> {
    let network: NetworkDto = parse_json_file(network_path)?;
    log::info!("Network document parsed: {} devices, {} links.", network.devices.len(), network.links.len());

    let config: OptimizerConfig = match config_path {
        Some(path) => parse_json_file(path)?,
        None => OptimizerConfig::default(),
    };

    let optimizer = OpticalPathOptimizer::from_network(&network, config)?;
    log::info!("Optical path optimizer constructed successfully.");
    Ok(optimizer)
}
