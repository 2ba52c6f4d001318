//! # Agregador Concurrente
//! src/stats/aggregator.rs
//!
//! Fan-out/fan-in: cada rama corre en su propio thread bajo un deadline
//! compartido y los resultados se mezclan bajo un único mutex.
//!
//! El deadline es cooperativo. Se revisa al entrar a la rama y otra vez
//! al momento de escribir su resultado; una rama que ya arrancó nunca se
//! interrumpe, pero si termina tarde su resultado se descarta como
//! timeout. Las ramas largas pueden además consultar el `Deadline` que
//! reciben.

use crate::error::{AggregateError, BranchError, BranchErrorKind};
use crate::stats::snapshot::{Contribution, StatsSnapshot};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Timeout por defecto de una corrida
pub const DEFAULT_STATS_TIMEOUT: Duration = Duration::from_secs(5);

/// Instante límite compartido por todas las ramas de una corrida.
/// `None` si el timeout no cabe en un `Instant`: nunca vence.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }

    pub fn remaining(&self) -> Duration {
        match self.expires_at {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }

    /// Atajo para ramas que sondean el deadline durante su trabajo
    pub fn check(&self) -> Result<(), BranchErrorKind> {
        if self.is_expired() {
            Err(BranchErrorKind::Timeout)
        } else {
            Ok(())
        }
    }
}

/// Una computación independiente dentro de una corrida
pub trait StatBranch: Send + Sync {
    fn name(&self) -> &str;

    /// Consulta la fuente de datos. No debe leer resultados de otras ramas.
    fn gather(&self, deadline: &Deadline) -> Result<Contribution, BranchErrorKind>;
}

/// Rama a partir de un closure
pub struct FnBranch<F> {
    name: String,
    gather: F,
}

impl<F> StatBranch for FnBranch<F>
where
    F: Fn(&Deadline) -> Result<Contribution, BranchErrorKind> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn gather(&self, deadline: &Deadline) -> Result<Contribution, BranchErrorKind> {
        (self.gather)(deadline)
    }
}

pub fn branch_fn<F>(name: impl Into<String>, gather: F) -> FnBranch<F>
where
    F: Fn(&Deadline) -> Result<Contribution, BranchErrorKind> + Send + Sync,
{
    FnBranch {
        name: name.into(),
        gather,
    }
}

/// Estado compartido de una corrida. Vive solo durante `compute_snapshot`.
#[derive(Default)]
struct Merge {
    snapshot: StatsSnapshot,
    failures: Vec<BranchError>,
}

/// Conjunto fijo de ramas que producen un `StatsSnapshot`
#[derive(Default)]
pub struct Aggregator {
    branches: Vec<Box<dyn StatBranch>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: impl StatBranch + 'static) -> Self {
        self.branches.push(Box::new(branch));
        self
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name()).collect()
    }

    /// Lanza todas las ramas en paralelo y espera a que terminen todas.
    ///
    /// Si alguna falla o vence, retorna un `AggregateError` con todas las
    /// fallas y ningún dato parcial.
    pub fn compute_snapshot(&self, timeout: Duration) -> Result<StatsSnapshot, AggregateError> {
        let started = Instant::now();
        let deadline = Deadline::after(timeout);
        let merge = Mutex::new(Merge::default());

        thread::scope(|scope| {
            let handles: Vec<_> = self
                .branches
                .iter()
                .map(|branch| {
                    let branch: &dyn StatBranch = &**branch;
                    let merge = &merge;
                    let deadline = &deadline;
                    (branch.name(), scope.spawn(move || run_branch(branch, deadline, merge)))
                })
                .collect();

            for (name, handle) in handles {
                if handle.join().is_err() {
                    lock(&merge)
                        .failures
                        .push(BranchError::source(name, "branch panicked"));
                }
            }
        });

        let Merge { snapshot, failures } = merge
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if failures.is_empty() {
            debug!(elapsed_ms = started.elapsed().as_millis() as u64, "statistics computed");
            Ok(snapshot)
        } else {
            let err = AggregateError { failures };
            warn!(failed = ?err.branches(), "statistics incomplete");
            Err(err)
        }
    }
}

fn lock(merge: &Mutex<Merge>) -> MutexGuard<'_, Merge> {
    merge.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Ejecuta una rama y mezcla su resultado
fn run_branch(branch: &dyn StatBranch, deadline: &Deadline, merge: &Mutex<Merge>) {
    let name = branch.name();

    if deadline.is_expired() {
        debug!(branch = name, "deadline elapsed before start");
        lock(merge).failures.push(BranchError::timeout(name));
        return;
    }

    let outcome = branch.gather(deadline);

    let mut merge = lock(merge);
    match outcome {
        Ok(_) if deadline.is_expired() => {
            debug!(branch = name, "result arrived after deadline, discarded");
            merge.failures.push(BranchError::timeout(name));
        }
        Ok(contribution) => contribution.apply(&mut merge.snapshot),
        Err(kind) => merge.failures.push(BranchError {
            branch: name.to_string(),
            kind,
        }),
    }
}
