use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::optical_model::assigner::candidate::{Candidate, WavelengthPathEntry};
use crate::domain::optical_model::intent::intent::{Intent, IntentEvent, IntentState, OpticalConnection};
use crate::domain::optical_model::intent::intent_service::{IntentListener, IntentService};
use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::network::inventory::NetworkInventory;
use crate::domain::optical_model::reservation::wavelength_path::WavelengthPath;
use crate::domain::optical_model::reservation::wavelength_path_store::WavelengthPathStore;
use crate::domain::optical_model::resource::resource::{Resource, ResourceService};
use crate::domain::optical_model::signal::och_signal::OchSignal;
use crate::error::{Error, Result};

/// Reserves candidates as wavelength paths and drives them through
/// reserved, submitted and removed.
pub struct ReservationManager {
    inventory: Arc<dyn NetworkInventory>,
    resources: Arc<dyn ResourceService>,
    intents: Arc<dyn IntentService>,
    store: Arc<WavelengthPathStore>,
}

impl ReservationManager {
    pub fn new(
        inventory: Arc<dyn NetworkInventory>,
        resources: Arc<dyn ResourceService>,
        intents: Arc<dyn IntentService>,
        store: Arc<WavelengthPathStore>,
    ) -> Self {
        Self { inventory, resources, intents, store }
    }

    /// Reserves the candidate at the 1-based `index` with one frequency id per leg.
    ///
    /// Ports and lambdas of all legs are allocated together under the group's
    /// intent key. Nothing is kept if any of them is unavailable.
    pub fn reserve(&self, candidates: &[Candidate], index: usize, frequency_ids: &[i32], names: &[String]) -> Result<Vec<WavelengthPath>> {
        if candidates.is_empty() {
            return Err(Error::InvalidArgument("No wavelength-path-calc results".to_string()));
        }
        let candidate = index
            .checked_sub(1)
            .and_then(|i| candidates.get(i))
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid index value. index={}", index)))?;
        if frequency_ids.is_empty() {
            return Err(Error::InvalidArgument("Invalid frequency id value".to_string()));
        }
        if names.len() > frequency_ids.len() {
            return Err(Error::InvalidArgument("Number of frequency IDs < Number of names".to_string()));
        }
        if frequency_ids.len() != candidate.entries.len() {
            return Err(Error::InvalidArgument("Please specify frequency id for each wavelength path.".to_string()));
        }

        let mut resources: Vec<Resource> = Vec::new();
        let mut signals: Vec<OchSignal> = Vec::with_capacity(frequency_ids.len());
        let mut lambdas: HashSet<Resource> = HashSet::new();
        for (entry, frequency_id) in candidate.entries.iter().zip(frequency_ids) {
            for cp in [entry.src_och(), entry.dst_och(), entry.oms_add_port(), entry.oms_drop_port()] {
                self.check_enabled(cp)?;
                resources.push(Resource::Port(cp.clone()));
            }

            let signal = *entry
                .signal(*frequency_id)
                .ok_or_else(|| Error::InvalidArgument(format!("Invalid frequency ID ({}).", frequency_id)))?;
            for lambda in self.lambda_resources(entry, &signal) {
                if !lambdas.insert(lambda.clone()) {
                    return Err(Error::InvalidArgument(format!(
                        "Frequency ID ({}) is used by more than one wavelength path on {}.",
                        frequency_id,
                        lambda.connect_point()
                    )));
                }
                resources.push(lambda);
            }
            signals.push(signal);
        }

        let group_id = self.store.issue_group_id();
        let key = Intent::key_for_group(group_id);
        let stale = self.resources.release(&key);
        if !stale.is_empty() {
            log::warn!("Released {} stale resources held by {}", stale.len(), key);
        }

        if let Err(e) = self.resources.allocate(&key, &resources) {
            log::warn!("Reservation of group {} failed: {}", group_id, e);
            self.store.release_group_id_if_possible(group_id);
            return Err(Error::Rejected("Lambda/Port resources are not available.".to_string()));
        }

        let paths: Vec<WavelengthPath> = candidate
            .entries
            .iter()
            .zip(frequency_ids)
            .zip(signals)
            .enumerate()
            .map(|(i, ((entry, frequency_id), signal))| WavelengthPath {
                id: 0,
                group_id,
                frequency_id: *frequency_id,
                signal,
                ingress_edge: entry.ingress_edge.clone(),
                egress_edge: entry.egress_edge.clone(),
                path: entry.path.clone(),
                och_param: entry.och_param,
                q_value: entry.q_value,
                name: names.get(i).cloned().unwrap_or_default(),
                submitted: false,
            })
            .collect();

        let reserved = self.store.add(paths);
        log::info!("Reserved wavelength path group {} ({} legs)", group_id, reserved.len());
        Ok(reserved)
    }

    /// Installs an intent for every leg of the group and marks them submitted.
    pub fn submit(&self, group_id: u64) -> Result<Vec<WavelengthPath>> {
        let paths = self.store.get_group(group_id);
        if paths.is_empty() {
            return Err(Error::InvalidArgument(format!("Not found wavelength path. Submit ID={}", group_id)));
        }
        if paths.iter().any(|p| p.submitted) {
            return Err(Error::IllegalState("Wavelength path is already submitted.".to_string()));
        }

        let key = Intent::key_for_group(group_id);
        let intent = Intent {
            key: key.clone(),
            group_id,
            connections: paths
                .iter()
                .map(|p| OpticalConnection { path_id: p.id, ingress: p.src_och().clone(), egress: p.dst_och().clone(), signal: p.signal })
                .collect(),
            resources: self.resources.allocations(&key),
        };
        self.intents.submit(intent)?;

        let mut submitted = Vec::with_capacity(paths.len());
        for mut path in paths {
            path.submitted = true;
            submitted.push(self.store.update(path)?);
        }
        log::info!("Submitted wavelength path group {}", group_id);
        Ok(submitted)
    }

    /// Withdraws the group's intent if there is one. Otherwise releases the
    /// resources and deletes the legs right away.
    ///
    /// Returns the legs of the group as they were before the call.
    pub fn remove(&self, group_id: u64) -> Result<Vec<WavelengthPath>> {
        let paths = self.store.get_group(group_id);
        if paths.is_empty() {
            return Err(Error::InvalidArgument(format!("Not found wavelength path. Remove ID={}", group_id)));
        }

        let key = Intent::key_for_group(group_id);
        match self.intents.get_intent_state(&key) {
            Some(IntentState::Installed) => {
                self.intents.withdraw(&key)?;
            }
            Some(state) => {
                return Err(Error::IllegalState(format!("Cannot be removed. Intent state is not INSTALLED. [{}]", state)));
            }
            None => {
                let released = self.resources.release(&key);
                log::debug!("Released {} resources of group {}", released.len(), group_id);
                self.store.remove_group(group_id);
            }
        }
        log::info!("Removed wavelength path group {}", group_id);
        Ok(paths)
    }

    fn check_enabled(&self, cp: &ConnectPoint) -> Result<()> {
        match self.inventory.port(cp) {
            Some(port) if port.enabled => Ok(()),
            _ => Err(Error::PreconditionFailed(format!("Port is disabled. port={}", cp))),
        }
    }

    /// Flex-grid slots of `signal` on every lambda-carrying hop of the leg.
    fn lambda_resources(&self, entry: &WavelengthPathEntry, signal: &OchSignal) -> Vec<Resource> {
        let slots = signal.to_flex_grid();
        entry
            .path
            .hops()
            .into_iter()
            .filter(|cp| self.inventory.device(&cp.device_id).is_some_and(|d| d.has_lambda_resource(cp.port)))
            .flat_map(|cp| slots.iter().map(move |slot| Resource::Lambda(cp.clone(), *slot)))
            .collect()
    }
}

/// Deletes the legs of a group once its intent is withdrawn. The intent
/// service has already released the resources at that point.
pub struct WithdrawnIntentCleaner {
    store: Arc<WavelengthPathStore>,
}

impl WithdrawnIntentCleaner {
    pub fn new(store: Arc<WavelengthPathStore>) -> Self {
        Self { store }
    }
}

impl IntentListener for WithdrawnIntentCleaner {
    fn on_intent_event(&self, event: &IntentEvent) {
        if event.state != IntentState::Withdrawn {
            return;
        }
        let removed = self.store.remove_group(event.intent.group_id);
        log::info!("[WLPATH INTENT] group {} withdrawn, {} paths removed", event.intent.group_id, removed.len());
    }
}
