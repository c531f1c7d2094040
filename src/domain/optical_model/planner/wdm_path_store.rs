use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::planner::wdm_path::WdmPath;

new_key_type! {
    pub struct WdmPathId;
}

#[derive(Debug, Clone)]
pub enum WdmPathEvent {
    PathsReplaced { added: Vec<Arc<WdmPath>>, removed: Vec<Arc<WdmPath>> },
    PathsCleared { removed: Vec<Arc<WdmPath>> },
}

pub trait WdmPathListener: Send + Sync {
    fn on_wdm_path_event(&self, event: &WdmPathEvent);
}

#[derive(Debug, Default)]
struct StoreInner {
    slots: SlotMap<WdmPathId, Arc<WdmPath>>,

    /// Insertion order, so listings are stable.
    order: Vec<WdmPathId>,

    by_src: HashMap<ConnectPoint, Vec<WdmPathId>>,
    by_dst: HashMap<ConnectPoint, Vec<WdmPathId>>,
    by_pair: HashMap<(ConnectPoint, ConnectPoint), Vec<WdmPathId>>,
}

impl StoreInner {
    fn insert(&mut self, path: Arc<WdmPath>) {
        let (src, dst) = (path.src.clone(), path.dst.clone());
        let key = self.slots.insert(path);
        self.order.push(key);
        self.by_src.entry(src.clone()).or_default().push(key);
        self.by_dst.entry(dst.clone()).or_default().push(key);
        self.by_pair.entry((src, dst)).or_default().push(key);
    }

    fn remove(&mut self, key: WdmPathId) -> Option<Arc<WdmPath>> {
        let path = self.slots.remove(key)?;
        self.order.retain(|k| *k != key);
        for index in [self.by_src.get_mut(&path.src), self.by_dst.get_mut(&path.dst)].into_iter().flatten() {
            index.retain(|k| *k != key);
        }
        if let Some(index) = self.by_pair.get_mut(&(path.src.clone(), path.dst.clone())) {
            index.retain(|k| *k != key);
        }
        Some(path)
    }

    fn resolve(&self, keys: &[WdmPathId]) -> Vec<Arc<WdmPath>> {
        keys.iter().filter_map(|k| self.slots.get(*k).cloned()).collect()
    }

    /// Keys within the scope of a replace call.
    fn scope(&self, ingress: Option<&ConnectPoint>, egress: Option<&ConnectPoint>) -> Vec<WdmPathId> {
        let touches = |cp: &ConnectPoint| -> Vec<WdmPathId> {
            let mut keys: Vec<WdmPathId> = self.by_src.get(cp).cloned().unwrap_or_default();
            for key in self.by_dst.get(cp).into_iter().flatten() {
                if !keys.contains(key) {
                    keys.push(*key);
                }
            }
            keys
        };

        match (ingress, egress) {
            (Some(i), Some(e)) => {
                let mut keys = self.by_pair.get(&(i.clone(), e.clone())).cloned().unwrap_or_default();
                keys.extend(self.by_pair.get(&(e.clone(), i.clone())).into_iter().flatten().copied());
                keys
            }
            (Some(cp), None) | (None, Some(cp)) => touches(cp),
            (None, None) => self.order.clone(),
        }
    }
}

/// Catalog of computed WDM paths, indexed by their add/drop endpoints.
#[derive(Default)]
pub struct WdmPathStore {
    inner: RwLock<StoreInner>,
    listeners: RwLock<Vec<Arc<dyn WdmPathListener>>>,
}

impl WdmPathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn WdmPathListener>) {
        self.listeners.write().expect("RwLock poisoned").push(listener);
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("RwLock poisoned").slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths from `ingress` to `egress`. `None` matches any port.
    pub fn get_paths(&self, ingress: Option<&ConnectPoint>, egress: Option<&ConnectPoint>) -> Vec<Arc<WdmPath>> {
        let guard = self.inner.read().expect("RwLock poisoned");
        match (ingress, egress) {
            (Some(i), Some(e)) => guard.resolve(guard.by_pair.get(&(i.clone(), e.clone())).map(Vec::as_slice).unwrap_or_default()),
            (Some(i), None) => guard.resolve(guard.by_src.get(i).map(Vec::as_slice).unwrap_or_default()),
            (None, Some(e)) => guard.resolve(guard.by_dst.get(e).map(Vec::as_slice).unwrap_or_default()),
            (None, None) => guard.resolve(&guard.order),
        }
    }

    /// The path with swapped endpoints over the mirrored route, if computed.
    pub fn get_reverse_path(&self, path: &WdmPath) -> Option<Arc<WdmPath>> {
        self.get_paths(Some(&path.dst), Some(&path.src)).into_iter().find(|p| p.is_reverse_of(path))
    }

    /// Replaces every path in the scope of `ingress`/`egress` with `paths`.
    ///
    /// Both given: both directions of that pair. One given: every path touching
    /// that port. None: the whole catalog.
    pub fn replace(&self, ingress: Option<&ConnectPoint>, egress: Option<&ConnectPoint>, paths: Vec<WdmPath>) -> WdmPathEvent {
        let event = {
            let mut guard = self.inner.write().expect("RwLock poisoned");
            let removed: Vec<Arc<WdmPath>> = guard.scope(ingress, egress).into_iter().filter_map(|k| guard.remove(k)).collect();

            let added: Vec<Arc<WdmPath>> = paths.into_iter().map(Arc::new).collect();
            for path in &added {
                guard.insert(path.clone());
            }
            WdmPathEvent::PathsReplaced { added, removed }
        };

        if let WdmPathEvent::PathsReplaced { added, removed } = &event {
            log::debug!("WDM path catalog replaced: {} added, {} removed", added.len(), removed.len());
        }
        self.notify(&event);
        event
    }

    pub fn clear(&self) -> WdmPathEvent {
        let removed = {
            let mut guard = self.inner.write().expect("RwLock poisoned");
            let removed = guard.resolve(&guard.order);
            *guard = StoreInner::default();
            removed
        };
        let event = WdmPathEvent::PathsCleared { removed };
        self.notify(&event);
        event
    }

    fn notify(&self, event: &WdmPathEvent) {
        let listeners: Vec<Arc<dyn WdmPathListener>> = self.listeners.read().expect("RwLock poisoned").clone();
        for listener in listeners {
            listener.on_wdm_path_event(event);
        }
    }
}
