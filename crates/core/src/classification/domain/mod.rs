pub mod accent_model;
pub mod classifier;
pub mod label_table;
pub mod prediction;
