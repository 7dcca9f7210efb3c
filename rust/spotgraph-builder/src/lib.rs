pub mod batch;

pub use batch::{aggregate, run_batch, BatchConfig, BatchSummary, MapFailure};
