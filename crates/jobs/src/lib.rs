pub mod reconciler;
pub mod runner;
pub mod status;

pub use reconciler::{ReconcilerHandle, ReconcilerJob};
pub use runner::{JobHandles, JobRunner};
pub use status::{ReconcilerState, ReconcilerStats, ReconcilerStatsSnapshot, ReconcilerStatus};
