pub mod frequency_converter;
pub mod och_param;
pub mod och_signal;
