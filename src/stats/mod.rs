//! # Estadísticas
//!
//! Agregación concurrente con deadline compartido. Ver `aggregator`.

pub mod aggregator;
pub mod branches;
pub mod snapshot;

pub use aggregator::{branch_fn, Aggregator, Deadline, StatBranch, DEFAULT_STATS_TIMEOUT};
pub use branches::DEFAULT_RECENT_WINDOW;
pub use snapshot::{Contribution, StatsSnapshot};
