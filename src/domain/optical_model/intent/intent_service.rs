use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::domain::optical_model::intent::intent::{Intent, IntentEvent, IntentState};
use crate::domain::optical_model::resource::resource::ResourceService;
use crate::domain::optical_model::utils::id::IntentKey;
use crate::error::{Error, Result};

pub trait IntentListener: Send + Sync {
    fn on_intent_event(&self, event: &IntentEvent);
}

/// Installs wavelength-path intents on the network.
pub trait IntentService: Send + Sync {
    fn submit(&self, intent: Intent) -> Result<()>;

    /// Resources of the intent are released once it is withdrawn.
    fn withdraw(&self, key: &IntentKey) -> Result<()>;

    fn get_intent(&self, key: &IntentKey) -> Option<Intent>;

    fn get_intent_state(&self, key: &IntentKey) -> Option<IntentState>;

    fn add_listener(&self, listener: Arc<dyn IntentListener>);
}

/// In-process intent service without device programming.
///
/// With `auto_install` an intent moves to INSTALLED on submit. Otherwise it
/// stays in INSTALL_REQ until [`LocalIntentService::install`] is called.
pub struct LocalIntentService {
    resources: Arc<dyn ResourceService>,
    auto_install: bool,
    intents: RwLock<BTreeMap<IntentKey, (Intent, IntentState)>>,
    listeners: RwLock<Vec<Arc<dyn IntentListener>>>,
}

impl LocalIntentService {
    pub fn new(resources: Arc<dyn ResourceService>, auto_install: bool) -> Self {
        Self { resources, auto_install, intents: RwLock::new(BTreeMap::new()), listeners: RwLock::new(Vec::new()) }
    }

    pub fn install(&self, key: &IntentKey) -> Result<()> {
        self.transition(key, &[IntentState::InstallReq], IntentState::Installed)?;
        Ok(())
    }

    fn transition(&self, key: &IntentKey, from: &[IntentState], to: IntentState) -> Result<Intent> {
        let intent = {
            let mut guard = self.intents.write().expect("RwLock poisoned");
            let (intent, state) =
                guard.get_mut(key).ok_or_else(|| Error::InvalidArgument(format!("Intent {} not found", key)))?;
            if !from.contains(state) {
                return Err(Error::IllegalState(format!("Intent {} is {} and cannot become {}", key, state, to)));
            }
            *state = to;
            intent.clone()
        };
        self.notify(to, &intent);
        Ok(intent)
    }

    fn notify(&self, state: IntentState, intent: &Intent) {
        match state {
            IntentState::Failed => log::warn!("[WLPATH INTENT] intent[{}]: {}", intent.key, state),
            _ => log::info!("[WLPATH INTENT] intent[{}]: {}", intent.key, state),
        }

        let listeners: Vec<Arc<dyn IntentListener>> = self.listeners.read().expect("RwLock poisoned").clone();
        let event = IntentEvent { state, intent: intent.clone() };
        for listener in listeners {
            listener.on_intent_event(&event);
        }
    }
}

impl IntentService for LocalIntentService {
    fn submit(&self, intent: Intent) -> Result<()> {
        {
            let mut guard = self.intents.write().expect("RwLock poisoned");
            if guard.contains_key(&intent.key) {
                return Err(Error::IllegalState(format!("Intent {} is already submitted", intent.key)));
            }
            guard.insert(intent.key.clone(), (intent.clone(), IntentState::InstallReq));
        }
        self.notify(IntentState::InstallReq, &intent);

        if self.auto_install {
            self.install(&intent.key)?;
        }
        Ok(())
    }

    fn withdraw(&self, key: &IntentKey) -> Result<()> {
        let intent = self.transition(key, &[IntentState::Installed, IntentState::Failed], IntentState::WithdrawReq)?;

        let released = self.resources.release(key);
        log::debug!("Intent {} released {} resources", key, released.len());

        self.intents.write().expect("RwLock poisoned").remove(key);
        self.notify(IntentState::Withdrawn, &intent);
        Ok(())
    }

    fn get_intent(&self, key: &IntentKey) -> Option<Intent> {
        let guard = self.intents.read().expect("RwLock poisoned");
        guard.get(key).map(|(intent, _)| intent.clone())
    }

    fn get_intent_state(&self, key: &IntentKey) -> Option<IntentState> {
        let guard = self.intents.read().expect("RwLock poisoned");
        guard.get(key).map(|(_, state)| *state)
    }

    fn add_listener(&self, listener: Arc<dyn IntentListener>) {
        self.listeners.write().expect("RwLock poisoned").push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optical_model::network::connect_point::ConnectPoint;
    use crate::domain::optical_model::resource::resource::Resource;
    use crate::domain::optical_model::resource::resource_store::ResourceStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        states: Mutex<Vec<IntentState>>,
    }

    impl IntentListener for Recorder {
        fn on_intent_event(&self, event: &IntentEvent) {
            self.states.lock().unwrap().push(event.state);
        }
    }

    fn intent(resources: &ResourceStore, group_id: u64) -> Intent {
        let key = Intent::key_for_group(group_id);
        let held = vec![Resource::Port(ConnectPoint::new("TP-1", 1))];
        resources.allocate(&key, &held).unwrap();
        Intent { key, group_id, connections: Vec::new(), resources: held }
    }

    #[test]
    fn test_withdraw_releases_resources() {
        let resources = Arc::new(ResourceStore::new());
        let service = LocalIntentService::new(resources.clone(), true);
        let recorder = Arc::new(Recorder::default());
        service.add_listener(recorder.clone());

        let intent = intent(&resources, 1);
        service.submit(intent.clone()).unwrap();
        assert_eq!(service.get_intent_state(&intent.key), Some(IntentState::Installed));

        service.withdraw(&intent.key).unwrap();
        assert!(service.get_intent(&intent.key).is_none());
        assert!(resources.is_available(&intent.resources[0]));
        assert_eq!(
            *recorder.states.lock().unwrap(),
            vec![IntentState::InstallReq, IntentState::Installed, IntentState::WithdrawReq, IntentState::Withdrawn]
        );
    }

    #[test]
    fn test_pending_intent_cannot_be_withdrawn() {
        let resources = Arc::new(ResourceStore::new());
        let service = LocalIntentService::new(resources.clone(), false);
        let intent = intent(&resources, 2);

        service.submit(intent.clone()).unwrap();
        assert_eq!(service.get_intent_state(&intent.key), Some(IntentState::InstallReq));
        assert!(matches!(service.withdraw(&intent.key), Err(Error::IllegalState(_))));
        assert!(matches!(service.submit(intent.clone()), Err(Error::IllegalState(_))));

        service.install(&intent.key).unwrap();
        service.withdraw(&intent.key).unwrap();
    }
}
