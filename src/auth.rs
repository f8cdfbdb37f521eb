//! Machine-to-machine credentials and the token cache that keeps them fresh.

pub mod cache;
pub mod token;

pub use cache::*;
pub use token::{credential::*, secret::*};
