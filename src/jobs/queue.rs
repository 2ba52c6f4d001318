//! # Cola Acotada de Jobs
//! src/jobs/queue.rs
//!
//! Cola FIFO thread-safe de capacidad fija. El encolado nunca bloquea:
//! si la cola está llena (o cerrada) el job se descarta.

use crate::users::UserId;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Capacidad por defecto de la cola de analytics
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Estado protegido por el mutex
struct QueueState {
    jobs: VecDeque<UserId>,
    closed: bool,
}

/// Cola FIFO acotada, múltiples productores y consumidores.
///
/// Los clones comparten el mismo buffer.
pub struct JobQueue {
    state: Arc<Mutex<QueueState>>,

    /// Despierta a workers esperando jobs (o el cierre)
    condvar: Arc<Condvar>,

    capacity: usize,
}

impl JobQueue {
    /// Crea una nueva cola con capacidad máxima
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                jobs: VecDeque::with_capacity(capacity),
                closed: false,
            })),
            condvar: Arc::new(Condvar::new()),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Un worker que paniquea no deja el VecDeque a medias
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Intenta encolar un job sin bloquear.
    ///
    /// Retorna `false` si la cola está llena o cerrada.
    pub fn try_submit(&self, job: UserId) -> bool {
        let mut state = self.lock();

        if state.closed || state.jobs.len() >= self.capacity {
            return false;
        }

        state.jobs.push_back(job);
        drop(state);

        self.condvar.notify_one();
        true
    }

    /// Desencola el job más antiguo.
    ///
    /// Bloquea hasta que haya un job. Retorna `None` solo cuando la cola
    /// está cerrada y vacía.
    pub fn dequeue(&self) -> Option<UserId> {
        let mut state = self.lock();

        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            if state.closed {
                return None;
            }

            state = self
                .condvar
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Intenta desencolar sin bloquear
    pub fn try_dequeue(&self) -> Option<UserId> {
        self.lock().jobs.pop_front()
    }

    /// Cierra la cola: no se aceptan más jobs y los workers salen al vaciarla
    pub fn close(&self) {
        self.lock().closed = true;
        self.condvar.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Jobs pendientes en este momento
    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl Clone for JobQueue {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            condvar: Arc::clone(&self.condvar),
            capacity: self.capacity,
        }
    }
}
