pub mod password;
pub mod seal;
pub mod tracing;
