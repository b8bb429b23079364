//! API request handlers

mod health;
mod medicines;
mod system;

pub use health::*;
pub use medicines::*;
pub use system::*;
