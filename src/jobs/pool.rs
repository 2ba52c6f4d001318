//! # Pool de Workers
//! src/jobs/pool.rs
//!
//! N threads de larga vida atados a una misma `JobQueue`. Cada worker
//! desencola un job a la vez y lo procesa; sale cuando la cola está
//! cerrada y vacía.

use crate::jobs::processor::JobProcessor;
use crate::jobs::queue::JobQueue;
use crate::metrics::ProcessingLedger;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Número de workers por defecto
pub const DEFAULT_WORKERS: usize = 3;

/// Pool de workers con ciclo de vida explícito
pub struct WorkerPool {
    queue: JobQueue,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Lanza `worker_count` workers sobre `queue`.
    ///
    /// `ledger` cuenta los jobs fallidos; los completados los registra el
    /// procesador si le interesa.
    pub fn start(
        queue: JobQueue,
        worker_count: usize,
        processor: Arc<dyn JobProcessor>,
        ledger: ProcessingLedger,
    ) -> io::Result<Self> {
        let mut handles = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let worker_queue = queue.clone();
            let processor = Arc::clone(&processor);
            let ledger = ledger.clone();

            let spawned = thread::Builder::new()
                .name(format!("analytics-{}", worker_id))
                .spawn(move || Self::worker_loop(worker_id, worker_queue, processor, ledger));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // No dejar workers huérfanos
                    queue.close();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(e);
                }
            }
        }

        info!(workers = worker_count, capacity = queue.capacity(), "worker pool started");

        Ok(Self { queue, handles })
    }

    /// Loop principal del worker
    fn worker_loop(
        worker_id: usize,
        queue: JobQueue,
        processor: Arc<dyn JobProcessor>,
        ledger: ProcessingLedger,
    ) {
        debug!(worker = worker_id, "worker started");

        while let Some(user_id) = queue.dequeue() {
            debug!(worker = worker_id, user_id, "picked up job");

            match processor.process(worker_id, user_id) {
                Ok(()) => {
                    debug!(worker = worker_id, user_id, "completed job");
                }
                Err(e) => {
                    ledger.record_failed();
                    warn!(worker = worker_id, user_id, error = %e, "analytics job failed");
                }
            }
        }

        debug!(worker = worker_id, "queue closed, worker exiting");
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Cierra la cola, deja terminar lo pendiente y une todos los threads
    pub fn shutdown(self) {
        let pending = self.queue.len();
        self.queue.close();
        info!(pending, "worker pool draining");

        for handle in self.handles {
            if let Err(e) = handle.join() {
                error!(error = ?e, "worker panicked");
            }
        }

        info!("worker pool stopped");
    }
}
