use serde::Serialize;
use std::fmt;

use crate::domain::optical_model::network::connect_point::ConnectPoint;
use crate::domain::optical_model::resource::resource::Resource;
use crate::domain::optical_model::signal::och_signal::OchSignal;
use crate::domain::optical_model::utils::id::IntentKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentState {
    InstallReq,
    Installed,
    WithdrawReq,
    Withdrawn,
    Failed,
}

impl fmt::Display for IntentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntentState::InstallReq => "INSTALL_REQ",
            IntentState::Installed => "INSTALLED",
            IntentState::WithdrawReq => "WITHDRAW_REQ",
            IntentState::Withdrawn => "WITHDRAWN",
            IntentState::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

/// One optical connection programmed by an intent.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalConnection {
    pub path_id: u64,
    pub ingress: ConnectPoint,
    pub egress: ConnectPoint,
    pub signal: OchSignal,
}

/// Request to program every leg of a redundancy group.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub key: IntentKey,
    pub group_id: u64,
    pub connections: Vec<OpticalConnection>,

    /// Held under `key` while the intent exists.
    pub resources: Vec<Resource>,
}

impl Intent {
    pub fn key_for_group(group_id: u64) -> IntentKey {
        IntentKey::new(format!("wavelength-path-{}", group_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentEvent {
    pub state: IntentState,
    pub intent: Intent,
}
