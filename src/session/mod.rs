pub mod drill;
pub mod history;
pub mod result;
