//! The retailer: its basket API and its website.

pub mod basket;
pub mod driver;

pub use basket::{SainsburysClient, SessionCredentials};
pub use driver::SainsburysDriver;
