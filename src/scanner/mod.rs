pub mod filter;
pub mod ledger;
pub mod normalizer;
pub mod scheduler;
pub mod snapshot;

pub use filter::{Candidate, FilterGates};
pub use ledger::{LedgerEntry, Observation, PriceLedger};
pub use normalizer::normalize;
pub use scheduler::SniperScheduler;
pub use snapshot::{ScanOutcome, SnapshotScanner};
