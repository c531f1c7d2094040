pub mod assigner;
pub mod config;
pub mod intent;
pub mod network;
pub mod optimizer;
pub mod planner;
pub mod quality;
pub mod reservation;
pub mod resource;
pub mod routing;
pub mod signal;
pub mod utils;
