pub mod auth;
pub mod boundary;
pub mod status;
