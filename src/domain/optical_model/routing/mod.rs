pub mod path_finder;
pub mod span_weigher;
