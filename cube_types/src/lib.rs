pub mod error;
pub mod serde;
pub mod values;

pub use error::{Result, ValueError};
