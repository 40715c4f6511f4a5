pub mod policy;
pub mod report;
pub mod settings;
pub mod stock;
