mod connection;
mod error;
pub mod request;
pub mod transport;

pub use connection::*;
pub use error::*;

#[cfg(test)]
mod connection_test;
