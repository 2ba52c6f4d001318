//! # Ramas de Estadísticas
//! src/stats/branches.rs
//!
//! Las tres ramas estándar: total de usuarios, usuarios recientes y
//! métricas de jobs en segundo plano.

use crate::error::BranchErrorKind;
use crate::jobs::JobQueue;
use crate::metrics::ProcessingLedger;
use crate::stats::aggregator::{Aggregator, Deadline, StatBranch};
use crate::stats::snapshot::Contribution;
use crate::users::UserRepository;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

pub const TOTAL_USERS: &str = "total_users";
pub const RECENT_USERS: &str = "recent_users";
pub const BACKGROUND_JOBS: &str = "background_jobs";

/// Ventana por defecto para "usuarios recientes"
pub const DEFAULT_RECENT_WINDOW: Duration = Duration::from_secs(7 * 86_400);

pub struct TotalUsersBranch {
    repo: Arc<dyn UserRepository>,
}

impl TotalUsersBranch {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

impl StatBranch for TotalUsersBranch {
    fn name(&self) -> &str {
        TOTAL_USERS
    }

    fn gather(&self, _deadline: &Deadline) -> Result<Contribution, BranchErrorKind> {
        let total = self
            .repo
            .count_users()
            .map_err(|e| BranchErrorKind::Source(e.to_string()))?;
        Ok(Contribution::TotalUsers(total as u64))
    }
}

pub struct RecentUsersBranch {
    repo: Arc<dyn UserRepository>,
    window: Duration,
}

impl RecentUsersBranch {
    pub fn new(repo: Arc<dyn UserRepository>, window: Duration) -> Self {
        Self { repo, window }
    }
}

impl StatBranch for RecentUsersBranch {
    fn name(&self) -> &str {
        RECENT_USERS
    }

    fn gather(&self, _deadline: &Deadline) -> Result<Contribution, BranchErrorKind> {
        let since = SystemTime::now()
            .checked_sub(self.window)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let recent = self
            .repo
            .count_users_since(since)
            .map_err(|e| BranchErrorKind::Source(e.to_string()))?;
        Ok(Contribution::RecentUsers(recent as u64))
    }
}

pub struct BackgroundJobsBranch {
    ledger: ProcessingLedger,
    queue: JobQueue,
}

impl BackgroundJobsBranch {
    pub fn new(ledger: ProcessingLedger, queue: JobQueue) -> Self {
        Self { ledger, queue }
    }
}

impl StatBranch for BackgroundJobsBranch {
    fn name(&self) -> &str {
        BACKGROUND_JOBS
    }

    fn gather(&self, _deadline: &Deadline) -> Result<Contribution, BranchErrorKind> {
        Ok(Contribution::BackgroundJobs {
            processed_today: self.ledger.processed_today(),
            queue_depth: self.queue.len() as u64,
        })
    }
}

impl Aggregator {
    /// Agregador con las tres ramas estándar
    pub fn standard(
        repo: Arc<dyn UserRepository>,
        ledger: ProcessingLedger,
        queue: JobQueue,
        recent_window: Duration,
    ) -> Self {
        Aggregator::new()
            .with_branch(TotalUsersBranch::new(Arc::clone(&repo)))
            .with_branch(RecentUsersBranch::new(repo, recent_window))
            .with_branch(BackgroundJobsBranch::new(ledger, queue))
    }
}
