use std::sync::Arc;

use crate::domain::optical_model::network::link_detail::{LinkDetailProvider, SectionElement};
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::quality::config::QualityConfig;
use crate::domain::optical_model::quality::osnr_provider::{OsnrMap, OsnrProvider};
use crate::domain::optical_model::quality::signal_quality_model::SignalQualityModel;
use crate::domain::optical_model::signal::och_param::OchParam;
use crate::error::Result;

/// Evaluates paths in-process with [`SignalQualityModel`].
pub struct InternalOsnrProvider {
    config: QualityConfig,
    link_details: Arc<dyn LinkDetailProvider>,
}

impl InternalOsnrProvider {
    pub fn new(config: QualityConfig, link_details: Arc<dyn LinkDetailProvider>) -> Self {
        Self { config, link_details }
    }

    fn path_elements(&self, path: &Path) -> Vec<SectionElement> {
        path.links().iter().flat_map(|l| self.link_details.section_elements(&l.src, &l.dst)).collect()
    }
}

impl OsnrProvider for InternalOsnrProvider {
    fn evaluate(&self, paths: &[Path], params: &[OchParam]) -> Result<Vec<OsnrMap>> {
        let model = SignalQualityModel::new(&self.config);

        let maps = paths
            .iter()
            .map(|path| {
                let elements = self.path_elements(path);
                let mut osnr_map = OsnrMap::new();
                for param in params {
                    match model.total_osnr(&elements, param) {
                        Some(osnr) => {
                            osnr_map.insert(*param, osnr);
                        }
                        None => log::debug!("No OSNR for {} on {}", param, path),
                    }
                }
                osnr_map
            })
            .collect();
        Ok(maps)
    }
}
