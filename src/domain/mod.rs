pub mod optical_model;
