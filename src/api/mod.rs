pub mod hypixel;
pub mod types;

pub use hypixel::{AuctionPageSource, HypixelClient};
pub use types::*;
