pub mod otps;
pub mod users;
