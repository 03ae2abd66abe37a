pub mod status;
pub mod transformation;
