pub mod candidate;
pub mod wavelength_assigner;
