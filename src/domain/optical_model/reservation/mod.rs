pub mod event_journal;
pub mod reservation_manager;
pub mod wavelength_path;
pub mod wavelength_path_store;
