pub mod logs;
pub mod reporter;
pub mod sell_tracker;

pub use logs::{AuditLog, SnipeLog, SnipeRow, SnipeSink};
pub use sell_tracker::{AuctionRow, SaleReceipt, SaleRow, SellTracker};
