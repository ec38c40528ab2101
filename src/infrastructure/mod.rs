pub mod encoding;
pub mod server_impl;
