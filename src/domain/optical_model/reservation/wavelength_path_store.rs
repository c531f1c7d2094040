use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::reservation::wavelength_path::WavelengthPath;
use crate::domain::optical_model::signal::och_signal::OchSignal;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum WavelengthPathEvent {
    /// `coupled` holds the ids of the other legs of the same group.
    PathAdded { path: WavelengthPath, coupled: Vec<u64> },
    PathUpdated { path: WavelengthPath },
    PathRemoved { path: WavelengthPath },
}

impl WavelengthPathEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WavelengthPathEvent::PathAdded { .. } => "PATH_ADDED",
            WavelengthPathEvent::PathUpdated { .. } => "PATH_UPDATED",
            WavelengthPathEvent::PathRemoved { .. } => "PATH_REMOVED",
        }
    }

    pub fn path(&self) -> &WavelengthPath {
        match self {
            WavelengthPathEvent::PathAdded { path, .. }
            | WavelengthPathEvent::PathUpdated { path }
            | WavelengthPathEvent::PathRemoved { path } => path,
        }
    }
}

pub trait WavelengthPathListener: Send + Sync {
    fn on_wavelength_path_event(&self, event: &WavelengthPathEvent);
}

fn unordered(a: &ConnectPoint, b: &ConnectPoint) -> (ConnectPoint, ConnectPoint) {
    if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
}

#[derive(Debug, Default)]
struct StoreInner {
    paths: BTreeMap<u64, WavelengthPath>,
    by_group: BTreeMap<u64, BTreeSet<u64>>,

    /// Src and dst Och ports.
    by_termination: HashMap<ConnectPoint, BTreeSet<u64>>,
    by_pair: HashMap<(ConnectPoint, ConnectPoint), BTreeSet<u64>>,

    /// Hop port and channel of every path.
    by_lambda: HashMap<(ConnectPoint, OchSignal), u64>,
}

impl StoreInner {
    fn index(&mut self, path: &WavelengthPath) {
        self.by_group.entry(path.group_id).or_default().insert(path.id);
        for cp in [path.src_och(), path.dst_och()] {
            self.by_termination.entry(cp.clone()).or_default().insert(path.id);
        }
        self.by_pair.entry(unordered(path.src_och(), path.dst_och())).or_default().insert(path.id);
        for cp in path.path.hops() {
            self.by_lambda.insert((cp, path.signal), path.id);
        }
    }

    fn unindex(&mut self, path: &WavelengthPath) {
        if let Some(ids) = self.by_group.get_mut(&path.group_id) {
            ids.remove(&path.id);
            if ids.is_empty() {
                self.by_group.remove(&path.group_id);
            }
        }
        for cp in [path.src_och(), path.dst_och()] {
            if let Some(ids) = self.by_termination.get_mut(cp) {
                ids.remove(&path.id);
            }
        }
        if let Some(ids) = self.by_pair.get_mut(&unordered(path.src_och(), path.dst_och())) {
            ids.remove(&path.id);
        }
        for cp in path.path.hops() {
            self.by_lambda.remove(&(cp, path.signal));
        }
    }

    fn resolve<'a>(&self, ids: impl IntoIterator<Item = &'a u64>) -> Vec<WavelengthPath> {
        ids.into_iter().filter_map(|id| self.paths.get(id).cloned()).collect()
    }
}

/// Reserved and submitted wavelength paths with id and group id counters.
#[derive(Default)]
pub struct WavelengthPathStore {
    inner: RwLock<StoreInner>,
    next_path_id: AtomicU64,
    group_id: AtomicU64,
    listeners: RwLock<Vec<Arc<dyn WavelengthPathListener>>>,
}

impl WavelengthPathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn WavelengthPathListener>) {
        self.listeners.write().expect("RwLock poisoned").push(listener);
    }

    pub fn issue_group_id(&self) -> u64 {
        self.group_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Hands `group_id` back if no later id was issued in the meantime.
    pub fn release_group_id_if_possible(&self, group_id: u64) -> bool {
        if group_id == 0 {
            return false;
        }
        let released = self.group_id.compare_exchange(group_id, group_id - 1, Ordering::SeqCst, Ordering::SeqCst).is_ok();
        log::debug!("Release group id {}: {}", group_id, released);
        released
    }

    /// Stores the legs of one group and returns them with their assigned ids.
    pub fn add(&self, paths: Vec<WavelengthPath>) -> Vec<WavelengthPath> {
        let added: Vec<WavelengthPath> = {
            let mut guard = self.inner.write().expect("RwLock poisoned");
            paths
                .into_iter()
                .map(|mut path| {
                    path.id = self.next_path_id.fetch_add(1, Ordering::SeqCst) + 1;
                    guard.index(&path);
                    guard.paths.insert(path.id, path.clone());
                    path
                })
                .collect()
        };

        for path in &added {
            let coupled = added.iter().filter(|p| p.id != path.id && p.group_id == path.group_id).map(|p| p.id).collect();
            self.notify(&WavelengthPathEvent::PathAdded { path: path.clone(), coupled });
        }
        added
    }

    /// Replaces the stored path with the same id.
    pub fn update(&self, path: WavelengthPath) -> Result<WavelengthPath> {
        {
            let mut guard = self.inner.write().expect("RwLock poisoned");
            let previous = guard
                .paths
                .get(&path.id)
                .cloned()
                .ok_or_else(|| Error::InvalidArgument(format!("Not found wavelength path. ID={}", path.id)))?;
            guard.unindex(&previous);
            guard.index(&path);
            guard.paths.insert(path.id, path.clone());
        }
        self.notify(&WavelengthPathEvent::PathUpdated { path: path.clone() });
        Ok(path)
    }

    /// Removes every leg of the group. Returns the removed paths.
    pub fn remove_group(&self, group_id: u64) -> Vec<WavelengthPath> {
        let removed: Vec<WavelengthPath> = {
            let mut guard = self.inner.write().expect("RwLock poisoned");
            let ids: Vec<u64> = guard.by_group.get(&group_id).map(|ids| ids.iter().copied().collect()).unwrap_or_default();
            ids.into_iter()
                .filter_map(|id| {
                    let path = guard.paths.remove(&id)?;
                    guard.unindex(&path);
                    Some(path)
                })
                .collect()
        };

        for path in &removed {
            self.notify(&WavelengthPathEvent::PathRemoved { path: path.clone() });
        }
        removed
    }

    pub fn get(&self, id: u64) -> Option<WavelengthPath> {
        self.inner.read().expect("RwLock poisoned").paths.get(&id).cloned()
    }

    pub fn get_group(&self, group_id: u64) -> Vec<WavelengthPath> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.by_group.get(&group_id).map(|ids| guard.resolve(ids)).unwrap_or_default()
    }

    /// Paths terminating at the given Och ports in either direction. `None` matches any port.
    pub fn get_paths(&self, ingress: Option<&ConnectPoint>, egress: Option<&ConnectPoint>) -> Vec<WavelengthPath> {
        let guard = self.inner.read().expect("RwLock poisoned");
        let index = match (ingress, egress) {
            (Some(i), Some(e)) => guard.by_pair.get(&unordered(i, e)),
            (Some(cp), None) | (None, Some(cp)) => guard.by_termination.get(cp),
            (None, None) => return guard.paths.values().cloned().collect(),
        };
        index.map(|ids| guard.resolve(ids)).unwrap_or_default()
    }

    /// The path using `signal` on the hop port `cp`.
    pub fn find_by_oms_port_and_lambda(&self, cp: &ConnectPoint, signal: &OchSignal) -> Option<WavelengthPath> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.by_lambda.get(&(cp.clone(), *signal)).and_then(|id| guard.paths.get(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("RwLock poisoned").paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self, event: &WavelengthPathEvent) {
        log::debug!("{} {}", event.name(), event.path());
        let listeners: Vec<Arc<dyn WavelengthPathListener>> = self.listeners.read().expect("RwLock poisoned").clone();
        for listener in listeners {
            listener.on_wavelength_path_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optical_model::network::link::Link;
    use crate::domain::optical_model::network::path::Path;
    use crate::domain::optical_model::quality::q_value::QValue;
    use crate::domain::optical_model::signal::och_param::{ModulationFormat, OchParam, Rate};
    use crate::domain::optical_model::signal::och_signal::ChannelSpacing;

    fn cp(s: &str) -> ConnectPoint {
        s.parse().unwrap()
    }

    fn leg(group_id: u64, src: &str, dst: &str, multiplier: i32) -> WavelengthPath {
        WavelengthPath {
            id: 0,
            group_id,
            frequency_id: multiplier + 36,
            signal: OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, multiplier),
            ingress_edge: Link::new(cp(src), cp("A/10")),
            egress_edge: Link::new(cp("B/10"), cp(dst)),
            path: Path::new(vec![Link::new(cp("A/1"), cp("B/1"))], 80.0).unwrap(),
            och_param: OchParam::new(Rate::R100G, ModulationFormat::DpQpsk),
            q_value: QValue::new(8.5, 7.0),
            name: String::new(),
            submitted: false,
        }
    }

    #[test]
    fn test_group_id_rollback_only_for_latest() {
        let store = WavelengthPathStore::new();
        let first = store.issue_group_id();
        let second = store.issue_group_id();
        assert_eq!((first, second), (1, 2));

        assert!(!store.release_group_id_if_possible(first), "An older id must not roll the counter back.");
        assert!(store.release_group_id_if_possible(second));
        assert_eq!(store.issue_group_id(), 2);
    }

    #[test]
    fn test_indexes_follow_add_update_remove() {
        let store = WavelengthPathStore::new();
        let added = store.add(vec![leg(1, "TP-1/1", "TP-2/1", -30), leg(1, "TP-3/1", "TP-4/1", -29)]);
        assert_eq!(added.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);

        assert_eq!(store.get_paths(Some(&cp("TP-2/1")), Some(&cp("TP-1/1"))).len(), 1);
        assert_eq!(store.get_paths(Some(&cp("TP-3/1")), None).len(), 1);
        let hit = store.find_by_oms_port_and_lambda(&cp("B/1"), &added[1].signal).unwrap();
        assert_eq!(hit.id, 2);

        let mut submitted = added[0].clone();
        submitted.submitted = true;
        store.update(submitted).unwrap();
        assert!(store.get(1).unwrap().submitted);

        assert_eq!(store.remove_group(1).len(), 2);
        assert!(store.is_empty());
        assert!(store.find_by_oms_port_and_lambda(&cp("B/1"), &added[1].signal).is_none());
        assert!(store.get_paths(Some(&cp("TP-1/1")), None).is_empty());
    }

    #[test]
    fn test_update_unknown_path_fails() {
        let store = WavelengthPathStore::new();
        let mut path = leg(1, "TP-1/1", "TP-2/1", 0);
        path.id = 42;
        assert!(matches!(store.update(path), Err(Error::InvalidArgument(_))));
    }
}
