//! # Errores del Servicio
//! src/error.rs
//!
//! Taxonomía de errores por capa. Los errores de jobs nunca llegan al
//! caller; los de agregación siempre llegan, combinados en uno solo.

use serde::Serialize;
use std::fmt;

/// Errores del repositorio de usuarios (colaborador externo)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("user not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Errores de hashing y tokens
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("password hash error: {0}")]
    Hash(String),

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,
}

/// Error de un job de analytics. Solo se loguea.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job failed: {0}")]
pub struct JobError(pub String);

/// Por qué falló una rama del agregador
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum BranchErrorKind {
    /// La rama observó el deadline vencido
    Timeout,

    /// La fuente de datos de la rama falló
    Source(String),
}

/// Falla de una rama concreta
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchError {
    pub branch: String,
    #[serde(flatten)]
    pub kind: BranchErrorKind,
}

impl BranchError {
    pub fn timeout(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            kind: BranchErrorKind::Timeout,
        }
    }

    pub fn source(branch: &str, detail: impl Into<String>) -> Self {
        Self {
            branch: branch.to_string(),
            kind: BranchErrorKind::Source(detail.into()),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, BranchErrorKind::Timeout)
    }
}

impl fmt::Display for BranchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BranchErrorKind::Timeout => write!(f, "timeout getting {}", self.branch),
            BranchErrorKind::Source(detail) => write!(f, "{} failed: {}", self.branch, detail),
        }
    }
}

/// Resultado fallido de una corrida del agregador.
///
/// Enumera todas las ramas que fallaron; nunca trae datos parciales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("failed to get complete statistics: [{}]", join_failures(.failures))]
pub struct AggregateError {
    pub failures: Vec<BranchError>,
}

impl AggregateError {
    /// Nombres de las ramas fallidas, en el orden en que se registraron
    pub fn branches(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.branch.as_str()).collect()
    }

    pub fn contains(&self, branch: &str) -> bool {
        self.failures.iter().any(|f| f.branch == branch)
    }
}

fn join_failures(failures: &[BranchError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errores de la fachada del servicio
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("user not found")]
    UserNotFound,

    #[error("user with email {0} already exists")]
    EmailTaken(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no updates provided")]
    NoUpdates,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Statistics(#[from] AggregateError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::UserNotFound,
            other => ServiceError::Repository(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
