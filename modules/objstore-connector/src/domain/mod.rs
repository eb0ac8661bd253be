pub mod connector;
pub mod ports;
pub mod requests;
