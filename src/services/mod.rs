pub mod aggregator;

pub use aggregator::{Aggregator, RefreshHandle, RefreshRequest};
