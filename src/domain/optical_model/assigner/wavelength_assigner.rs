use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::domain::optical_model::assigner::candidate::{Candidate, WavelengthPathEntry};
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::device::Device;
use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::network::link::Link;
use crate::domain::optical_model::network::path::Path;
use crate::domain::optical_model::planner::wdm_path::WdmPath;
use crate::domain::optical_model::planner::wdm_path_store::WdmPathStore;
use crate::domain::optical_model::quality::config::QualityConfig;
use crate::domain::optical_model::quality::osnr_provider::OsnrMap;
use crate::domain::optical_model::quality::q_value::{QValue, calc_q};
use crate::domain::optical_model::resource::resource::{Resource, ResourceService};
use crate::domain::optical_model::signal::frequency_converter::FrequencyConverter;
use crate::domain::optical_model::signal::och_param::OchParam;
use crate::domain::optical_model::signal::och_signal::{ChannelSpacing, OchSignal};
use crate::error::{Error, Result};

type QValues = BTreeMap<OchParam, QValue>;

/// Turns WDM paths into ranked wavelength-path candidates for Och port pairs.
pub struct WavelengthAssigner {
    inventory: Arc<dyn NetworkInventory>,
    resources: Arc<dyn ResourceService>,
    wdm_paths: Arc<WdmPathStore>,
    quality: QualityConfig,
    converter: FrequencyConverter,
}

impl WavelengthAssigner {
    pub fn new(
        inventory: Arc<dyn NetworkInventory>,
        resources: Arc<dyn ResourceService>,
        wdm_paths: Arc<WdmPathStore>,
        quality: QualityConfig,
        converter: FrequencyConverter,
    ) -> Self {
        Self { inventory, resources, wdm_paths, quality, converter }
    }

    /// Ranked candidates for one (single path) or two (disjoint pair) port pairs.
    ///
    /// A pair whose WDM paths are all rejected fails the call. Two pairs
    /// without any disjoint combination give an empty list.
    pub fn plan_wavelength_paths(&self, endpoints: &[(ConnectPoint, ConnectPoint)]) -> Result<Vec<Candidate>> {
        if endpoints.is_empty() || endpoints.len() > 2 {
            return Err(Error::InvalidArgument(format!("One or two port pairs are required, got {}", endpoints.len())));
        }
        log::info!("Start to calculate wavelength paths.");

        let mut legs: Vec<Vec<WavelengthPathEntry>> = Vec::with_capacity(endpoints.len());
        for (ingress, egress) in endpoints {
            legs.push(self.entries_between(ingress, egress)?);
        }

        let candidates = match legs.as_mut_slice() {
            [single] => {
                single.sort_by(|a, b| b.q_value.q.total_cmp(&a.q_value.q));
                single.drain(..).map(Candidate::single).collect()
            }
            [mains, tributaries] => {
                let mut pairs: Vec<Candidate> = Vec::new();
                for main in mains.iter() {
                    for tributary in tributaries.iter().filter(|t| main.is_disjoint(t)) {
                        pairs.push(Candidate::pair(main.clone(), tributary.clone()));
                    }
                }
                pairs.sort_by(|a, b| {
                    b.entries[0].q_value.q.total_cmp(&a.entries[0].q_value.q).then_with(|| b.entries[1].q_value.q.total_cmp(&a.entries[1].q_value.q))
                });
                if pairs.is_empty() {
                    log::warn!("No disjoint path pair found.");
                }
                pairs
            }
            _ => Vec::new(),
        };

        log::info!("Finished to calculate wavelength paths. {} candidates", candidates.len());
        Ok(candidates)
    }

    fn entries_between(&self, ingress: &ConnectPoint, egress: &ConnectPoint) -> Result<Vec<WavelengthPathEntry>> {
        let src_link = single_active(self.inventory.egress_links(ingress), ingress)?;
        let dst_link = single_active(self.inventory.ingress_links(egress), egress)?;

        for cp in [&src_link.src, &src_link.dst, &dst_link.src, &dst_link.dst] {
            if !self.resources.is_available(&Resource::Port(cp.clone())) {
                return Err(Error::PreconditionFailed(format!("Specified port is already used. {}", cp)));
            }
        }

        let end_device = self
            .inventory
            .device(&dst_link.dst.device_id)
            .ok_or_else(|| Error::PreconditionFailed(format!("Device not found. {}", dst_link.dst.device_id)))?;

        let wdm_paths = self.wdm_paths.get_paths(Some(&src_link.dst), Some(&dst_link.src));
        let mut entries = Vec::new();
        for wdm_path in &wdm_paths {
            log::debug!("WavelengthPath inner {}", wdm_path);
            if let Some(entry) = self.entry_for(wdm_path, &src_link, &dst_link, &end_device) {
                entries.push(entry);
            }
        }

        if entries.is_empty() && !wdm_paths.is_empty() {
            return Err(Error::Rejected(format!(
                "No wavelength path from {} to {} satisfies the spectrum and quality constraints.",
                ingress, egress
            )));
        }
        Ok(entries)
    }

    fn entry_for(&self, wdm_path: &WdmPath, src_link: &Link, dst_link: &Link, end_device: &Device) -> Option<WavelengthPathEntry> {
        let Some(reverse) = self.wdm_paths.get_reverse_path(wdm_path) else {
            log::warn!("Not found reverse path: {}", wdm_path);
            return None;
        };

        let lambdas = self.common_lambdas(&wdm_path.path);
        if lambdas.is_empty() {
            log::warn!("Could not find assignable lambda. {}", wdm_path);
            return None;
        }
        let slots: Vec<OchSignal> = lambdas.into_iter().collect();
        let channels = OchSignal::from_resource_grid(&slots, ChannelSpacing::Chl50Ghz);
        log::debug!("WavelengthPath available lambdas count: {}", channels.len());

        let forward = self.q_values(end_device, &wdm_path.osnr).filter(|q| !q.is_empty());
        let Some(forward) = forward else {
            log::warn!("Q candidates are empty. {}", wdm_path);
            return None;
        };
        let backward = self.q_values(end_device, &reverse.osnr).filter(|q| !q.is_empty());
        let Some(backward) = backward else {
            log::warn!("Reverse Q candidates are empty. {}", reverse);
            return None;
        };

        let merged = merge_q_values(&forward, &backward);
        let Some((och_param, q_value)) = self.highest_rate(&merged) else {
            log::warn!("No rate/modulation passes in both directions. {}", wdm_path);
            return None;
        };

        let signals: BTreeMap<i32, OchSignal> = channels
            .into_iter()
            .filter_map(|signal| match self.converter.channel_id(&signal) {
                Ok(id) if id > 0 => Some((id, signal)),
                _ => None,
            })
            .collect();

        Some(WavelengthPathEntry {
            ingress_edge: src_link.clone(),
            egress_edge: dst_link.clone(),
            path: wdm_path.path.clone(),
            signals,
            och_param,
            q_value,
        })
    }

    /// Free slots common to every lambda-carrying port of the path.
    fn common_lambdas(&self, path: &Path) -> BTreeSet<OchSignal> {
        let mut common: Option<BTreeSet<OchSignal>> = None;
        for cp in path.hops() {
            let carries_lambdas = self.inventory.device(&cp.device_id).is_some_and(|d| d.has_lambda_resource(cp.port));
            if !carries_lambdas {
                continue;
            }
            let available = self.resources.available_lambdas(&cp);
            log::trace!("Find common lambdas at {}: {} slots", cp, available.len());
            common = Some(match common {
                Some(set) => set.intersection(&available).copied().collect(),
                None => available,
            });
        }
        common.unwrap_or_default()
    }

    /// Q per supported (rate, modulation) that meets its threshold.
    /// `None` if the device reports no transponder capability.
    fn q_values(&self, device: &Device, osnr: &OsnrMap) -> Option<QValues> {
        let Some(capability) = &device.capability else {
            log::warn!("Device [{}] has no transponder capability.", device.id);
            return None;
        };
        let vendor = device.manufacturer.as_str();

        let mut values = QValues::new();
        for (param, osnr) in osnr {
            if !capability.supports(param.rate, param.modulation_format) {
                log::debug!("Device [{}] does not support {}", device.id, param);
                continue;
            }
            let Some(constants) = self.quality.osnr_q_constants(vendor, param) else {
                log::warn!("Not found OSNR -> Q constants. Device [{}] [{}/{}]", device.id, vendor, param);
                continue;
            };
            let Some(threshold) = self.quality.q_threshold(vendor, param) else {
                log::warn!("Not found Q threshold. Device [{}] [{}/{}]", device.id, vendor, param);
                continue;
            };

            let q_value = QValue::new(calc_q(constants, *osnr), threshold);
            if !q_value.meets_threshold() {
                log::warn!("Q value rejected. Device [{}] [{}] OSNR={:.3} Q={:.3} threshold={:.3}", device.id, param, osnr, q_value.q, threshold);
                continue;
            }
            values.insert(*param, q_value);
        }
        Some(values)
    }

    /// The highest rate, then the best Q among equal rates.
    fn highest_rate(&self, q_values: &QValues) -> Option<(OchParam, QValue)> {
        q_values
            .iter()
            .max_by(|(pa, qa), (pb, qb)| {
                self.quality.rate_value(pa.rate).total_cmp(&self.quality.rate_value(pb.rate)).then_with(|| qa.q.total_cmp(&qb.q))
            })
            .map(|(p, q)| (*p, *q))
    }
}

fn single_active(links: Vec<Link>, cp: &ConnectPoint) -> Result<Link> {
    let mut active: Vec<Link> = links.into_iter().filter(Link::is_active).collect();
    if active.len() != 1 {
        return Err(Error::PreconditionFailed(format!("specified port does not have a link. {}", cp)));
    }
    Ok(active.remove(0))
}

/// Keeps the (rate, modulation) pairs present in both directions with the lower Q.
fn merge_q_values(forward: &QValues, backward: &QValues) -> QValues {
    forward.iter().filter_map(|(param, q)| backward.get(param).map(|other| (*param, q.lower(*other)))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optical_model::signal::och_param::{ModulationFormat, Rate};

    #[test]
    fn test_merge_keeps_common_params_with_lower_q() {
        let qpsk = OchParam::new(Rate::R100G, ModulationFormat::DpQpsk);
        let qam = OchParam::new(Rate::R200G, ModulationFormat::DpQam16);

        let forward = QValues::from([(qpsk, QValue::new(9.0, 7.0)), (qam, QValue::new(8.0, 7.5))]);
        let backward = QValues::from([(qpsk, QValue::new(8.6, 7.0))]);

        let merged = merge_q_values(&forward, &backward);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[&qpsk], QValue::new(8.6, 7.0));
    }

    #[test]
    fn test_single_active_link_required() {
        let cp: ConnectPoint = "TP-1/1".parse().unwrap();
        let mut down = Link::new(cp.clone(), "A/10".parse().unwrap());
        down.state = crate::domain::optical_model::network::link::LinkState::Inactive;

        assert!(matches!(single_active(vec![down.clone()], &cp), Err(Error::PreconditionFailed(_))));
        assert!(single_active(vec![down, Link::new(cp.clone(), "B/10".parse().unwrap())], &cp).is_ok());
        assert!(single_active(Vec::new(), &cp).is_err());
    }
}
