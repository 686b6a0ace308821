pub mod allocate;
pub mod report;
pub mod validate;
