pub mod quantity;
pub mod shopping;
pub mod trolley;

pub use quantity::*;
pub use shopping::*;
pub use trolley::*;
