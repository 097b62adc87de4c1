pub mod check;
pub mod confirm;
pub mod login;
pub mod session;
