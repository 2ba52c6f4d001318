//! # Procesamiento de Jobs de Analytics
//! src/jobs/processor.rs
//!
//! Define la unidad de trabajo que ejecuta cada worker.

use crate::error::JobError;
use crate::metrics::ProcessingLedger;
use crate::users::UserId;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Trabajo que un worker ejecuta por cada job.
///
/// Best-effort: sin dedup ni reintentos. Un error solo se loguea.
/// No debe tomar locks compartidos con otros workers mientras espera I/O.
pub trait JobProcessor: Send + Sync + 'static {
    fn process(&self, worker_id: usize, job: UserId) -> Result<(), JobError>;
}

impl<F> JobProcessor for F
where
    F: Fn(usize, UserId) -> Result<(), JobError> + Send + Sync + 'static,
{
    fn process(&self, worker_id: usize, job: UserId) -> Result<(), JobError> {
        self(worker_id, job)
    }
}

/// Procesador de analytics con latencia de I/O simulada
pub struct AnalyticsProcessor {
    latency: Duration,
    ledger: ProcessingLedger,
}

impl AnalyticsProcessor {
    pub fn new(latency: Duration, ledger: ProcessingLedger) -> Self {
        Self { latency, ledger }
    }

    pub fn ledger(&self) -> &ProcessingLedger {
        &self.ledger
    }
}

impl JobProcessor for AnalyticsProcessor {
    fn process(&self, worker_id: usize, job: UserId) -> Result<(), JobError> {
        debug!(worker = worker_id, user_id = job, "processing analytics");

        // Simular I/O (actualizar estadísticas, enviar emails, etc.)
        thread::sleep(self.latency);

        self.ledger.record_processed();
        Ok(())
    }
}
