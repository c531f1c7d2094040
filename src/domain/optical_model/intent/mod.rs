pub mod intent;
pub mod intent_service;
