pub mod change_detector;
pub mod wdm_path;
pub mod wdm_path_planner;
pub mod wdm_path_store;
