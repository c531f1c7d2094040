pub mod config;
pub mod external_invoker;
pub mod internal_provider;
pub mod osnr_provider;
pub mod parameter_table;
pub mod q_value;
pub mod signal_quality_model;
