pub mod batch;
pub mod store;

pub use batch::{Batch, GroupingPolicy};
pub use store::BatchStore;
