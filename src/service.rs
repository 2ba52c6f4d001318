//! # Fachada del Servicio de Usuarios
//! src/service.rs
//!
//! Coordina las operaciones de usuario con el repositorio y, como efecto
//! secundario, encola un job de analytics (registro, login, update,
//! delete). También expone las estadísticas del agregador.

use crate::config::Config;
use crate::error::{RepositoryError, Result, ServiceError};
use crate::jobs::{AnalyticsProcessor, JobProcessor, JobQueue, WorkerPool};
use crate::metrics::ProcessingLedger;
use crate::stats::{Aggregator, StatsSnapshot};
use crate::users::{
    LoginRequest, NewUser, PaginatedUsers, PasswordHasher, RegisterRequest, TokenIssuer,
    UpdateUserRequest, User, UserId, UserRepository,
};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Límite de página por defecto y máximo
const DEFAULT_PAGE_LIMIT: usize = 10;
const MAX_PAGE_LIMIT: usize = 100;

/// Parámetros del núcleo concurrente
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub workers: usize,
    pub queue_capacity: usize,
    pub job_latency: Duration,
    pub stats_timeout: Duration,
    pub recent_window: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ServiceOptions {
    /// Crea las opciones desde el Config principal
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.workers,
            queue_capacity: config.queue_capacity,
            job_latency: config.job_latency(),
            stats_timeout: config.stats_timeout(),
            recent_window: config.recent_window(),
        }
    }
}

/// Colaboradores externos que consume el servicio
#[derive(Clone)]
pub struct Collaborators {
    pub repo: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
}

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,

    queue: JobQueue,

    /// `None` después de `shutdown`
    pool: Mutex<Option<WorkerPool>>,

    ledger: ProcessingLedger,
    aggregator: Aggregator,
    stats_timeout: Duration,
}

impl UserService {
    /// Servicio con el procesador de analytics por defecto
    pub fn new(collaborators: Collaborators, options: ServiceOptions) -> io::Result<Self> {
        let ledger = ProcessingLedger::new();
        let processor = Arc::new(AnalyticsProcessor::new(options.job_latency, ledger.clone()));
        Self::with_processor(collaborators, options, processor, ledger)
    }

    /// Servicio con un procesador de jobs propio.
    ///
    /// `ledger` alimenta `processed_today`; el procesador debe registrar
    /// en él lo que complete.
    pub fn with_processor(
        collaborators: Collaborators,
        options: ServiceOptions,
        processor: Arc<dyn JobProcessor>,
        ledger: ProcessingLedger,
    ) -> io::Result<Self> {
        let Collaborators {
            repo,
            hasher,
            tokens,
        } = collaborators;

        let queue = JobQueue::new(options.queue_capacity);
        let pool = WorkerPool::start(queue.clone(), options.workers, processor, ledger.clone())?;
        let aggregator = Aggregator::standard(
            Arc::clone(&repo),
            ledger.clone(),
            queue.clone(),
            options.recent_window,
        );

        Ok(Self {
            repo,
            hasher,
            tokens,
            queue,
            pool: Mutex::new(Some(pool)),
            ledger,
            aggregator,
            stats_timeout: options.stats_timeout,
        })
    }

    // ==================== Autenticación ====================

    /// Crea una cuenta nueva
    pub fn register(&self, req: RegisterRequest) -> Result<User> {
        match self.repo.get_user_by_email(&req.email) {
            Ok(_) => return Err(ServiceError::EmailTaken(req.email)),
            Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = self.hasher.hash(&req.password)?;

        let email = req.email.clone();
        let user = self
            .repo
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .map_err(|e| email_conflict(e, &email))?;

        info!(user_id = user.id, "user registered");
        self.submit_analytics_job(user.id);

        Ok(user.redacted())
    }

    /// Autentica y retorna un token
    pub fn login(&self, req: LoginRequest) -> Result<String> {
        let user = match self.repo.get_user_by_email(&req.email) {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => return Err(ServiceError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        if !self.hasher.verify(&user.password_hash, &req.password)? {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;

        info!(user_id = user.id, "user logged in");
        self.submit_analytics_job(user.id);

        Ok(token)
    }

    /// Valida un token y retorna el usuario dueño
    pub fn authenticate(&self, token: &str) -> Result<UserId> {
        Ok(self.tokens.validate(token)?)
    }

    // ==================== Usuarios ====================

    pub fn get_user(&self, id: UserId) -> Result<User> {
        Ok(self.repo.get_user_by_id(id)?.redacted())
    }

    /// Página de usuarios; la lista y el total se consultan en paralelo
    pub fn get_users(&self, page: usize, limit: usize) -> Result<PaginatedUsers> {
        let page = page.max(1);
        let limit = if (1..=MAX_PAGE_LIMIT).contains(&limit) {
            limit
        } else {
            DEFAULT_PAGE_LIMIT
        };
        let offset = (page - 1).saturating_mul(limit);

        let (users, total) = thread::scope(|scope| {
            let users = scope.spawn(|| self.repo.get_users(limit, offset));
            let total = scope.spawn(|| self.repo.count_users());
            (join_query(users.join()), join_query(total.join()))
        });

        let users: Vec<User> = users?.into_iter().map(User::redacted).collect();
        let total = total?;

        Ok(PaginatedUsers {
            users,
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        })
    }

    /// Actualiza username y/o email
    pub fn update_user(&self, id: UserId, req: UpdateUserRequest) -> Result<User> {
        let existing = self.repo.get_user_by_id(id)?;
        let update = req.into_update();

        if let Some(email) = &update.email {
            if email != &existing.email {
                match self.repo.get_user_by_email(email) {
                    Ok(_) => return Err(ServiceError::EmailTaken(email.clone())),
                    Err(RepositoryError::NotFound) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        if update.is_empty() {
            return Err(ServiceError::NoUpdates);
        }

        let email = update.email.clone().unwrap_or_default();
        let updated = self
            .repo
            .update_user(id, update)
            .map_err(|e| email_conflict(e, &email))?;

        info!(user_id = id, "user updated");
        self.submit_analytics_job(id);

        Ok(updated.redacted())
    }

    pub fn delete_user(&self, id: UserId) -> Result<()> {
        self.repo.get_user_by_id(id)?;
        self.repo.delete_user(id)?;

        info!(user_id = id, "user deleted");
        self.submit_analytics_job(id);

        Ok(())
    }

    // ==================== Núcleo concurrente ====================

    /// Encola un job de analytics sin bloquear.
    ///
    /// `false` si la cola está llena o cerrada; el job se pierde.
    pub fn submit_analytics_job(&self, user_id: UserId) -> bool {
        let accepted = self.queue.try_submit(user_id);
        if accepted {
            debug!(user_id, queue_depth = self.queue.len(), "queued analytics job");
        } else {
            warn!(user_id, "analytics queue full or closed, skipping");
        }
        accepted
    }

    /// Estadísticas con el timeout configurado
    pub fn get_statistics(&self) -> Result<StatsSnapshot> {
        self.get_statistics_within(self.stats_timeout)
    }

    pub fn get_statistics_within(&self, timeout: Duration) -> Result<StatsSnapshot> {
        Ok(self.aggregator.compute_snapshot(timeout)?)
    }

    /// Jobs esperando en la cola
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn ledger(&self) -> &ProcessingLedger {
        &self.ledger
    }

    /// Cierra la cola y espera a que los workers drenen. Idempotente.
    pub fn shutdown(&self) {
        let pool = self
            .pool
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(pool) = pool {
            pool.shutdown();
        }
    }
}

impl Drop for UserService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Un conflicto de email del repositorio es un `EmailTaken`
fn email_conflict(err: RepositoryError, email: &str) -> ServiceError {
    match err {
        RepositoryError::Conflict(_) => ServiceError::EmailTaken(email.to_string()),
        other => other.into(),
    }
}

fn join_query<T>(
    joined: thread::Result<std::result::Result<T, RepositoryError>>,
) -> Result<T> {
    match joined {
        Ok(result) => Ok(result?),
        Err(_) => Err(ServiceError::Repository(RepositoryError::Unavailable(
            "query thread panicked".to_string(),
        ))),
    }
}
