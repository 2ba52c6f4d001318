//! # Sistema de Jobs de Analytics
//!
//! Cola acotada + pool fijo de workers. Encolar nunca bloquea al caller:
//! si la cola está llena el job se descarta (backpressure por descarte).

pub mod pool;
pub mod processor;
pub mod queue;

pub use pool::{WorkerPool, DEFAULT_WORKERS};
pub use processor::{AnalyticsProcessor, JobProcessor};
pub use queue::{JobQueue, DEFAULT_QUEUE_CAPACITY};
