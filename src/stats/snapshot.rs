//! # Snapshot de Estadísticas
//! src/stats/snapshot.rs

use serde::Serialize;

/// Resultado inmutable de una corrida completa del agregador.
///
/// Cada campo lo escribe exactamente una rama. Se devuelve por copia.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_users: u64,

    /// Usuarios creados dentro de la ventana reciente (7 días por defecto)
    pub recent_users: u64,

    pub processed_today: u64,

    /// Jobs de analytics esperando en la cola
    pub background_jobs: u64,
}

/// Porción del snapshot que aporta una rama
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    TotalUsers(u64),
    RecentUsers(u64),
    BackgroundJobs { processed_today: u64, queue_depth: u64 },
}

impl Contribution {
    /// Escribe solo los campos que le pertenecen
    pub fn apply(self, snapshot: &mut StatsSnapshot) {
        match self {
            Contribution::TotalUsers(n) => snapshot.total_users = n,
            Contribution::RecentUsers(n) => snapshot.recent_users = n,
            Contribution::BackgroundJobs {
                processed_today,
                queue_depth,
            } => {
                snapshot.processed_today = processed_today;
                snapshot.background_jobs = queue_depth;
            }
        }
    }
}
