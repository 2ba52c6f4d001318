//! # Configuración del Servicio
//! src/config.rs
//!
//! Configuración con soporte para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./user_analytics --workers 4 \
//!   --queue-capacity 200 \
//!   --stats-timeout-ms 2000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! ANALYTICS_WORKERS=4 JWT_SECRET=s3cr3t ./user_analytics
//! ```

use clap::Parser;
use std::time::Duration;
use tracing::info;

/// Configuración del servicio de usuarios
#[derive(Debug, Clone, Parser)]
#[command(name = "user_analytics")]
#[command(about = "Servicio de usuarios con jobs de analytics y estadísticas concurrentes")]
#[command(version = "0.1.0")]
pub struct Config {
    // === Workers ===

    /// Número de workers de analytics
    #[arg(long, default_value = "3", env = "ANALYTICS_WORKERS")]
    pub workers: usize,

    /// Capacidad máxima de la cola de analytics
    #[arg(long = "queue-capacity", default_value = "100", env = "ANALYTICS_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Latencia simulada de cada job en milisegundos
    #[arg(long = "job-latency-ms", default_value = "100", env = "ANALYTICS_JOB_LATENCY_MS")]
    pub job_latency_ms: u64,

    // === Estadísticas ===

    /// Deadline compartido de las ramas de estadísticas en milisegundos
    #[arg(long = "stats-timeout-ms", default_value = "5000", env = "STATS_TIMEOUT_MS")]
    pub stats_timeout_ms: u64,

    /// Días que cuentan como "usuario reciente"
    #[arg(long = "recent-window-days", default_value = "7", env = "RECENT_WINDOW_DAYS")]
    pub recent_window_days: u64,

    // === Tokens ===

    /// Secreto para firmar tokens
    #[arg(
        long = "token-secret",
        default_value = "your-super-secret-jwt-key-change-this-in-production",
        env = "JWT_SECRET",
        hide_env_values = true
    )]
    pub token_secret: String,

    /// Vigencia de los tokens en segundos
    #[arg(long = "token-ttl-secs", default_value = "86400", env = "TOKEN_TTL_SECS")]
    pub token_ttl_secs: u64,

    // === Demo ===

    /// Usuarios que registra el binario de demostración
    #[arg(long = "demo-users", default_value = "10", env = "DEMO_USERS")]
    pub demo_users: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    pub fn stats_timeout(&self) -> Duration {
        Duration::from_millis(self.stats_timeout_ms)
    }

    pub fn job_latency(&self) -> Duration {
        Duration::from_millis(self.job_latency_ms)
    }

    pub fn recent_window(&self) -> Duration {
        Duration::from_secs(self.recent_window_days.saturating_mul(86_400))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }
        if self.stats_timeout_ms == 0 {
            return Err("Stats timeout must be > 0".to_string());
        }
        if self.recent_window_days == 0 {
            return Err("Recent window must be >= 1 day".to_string());
        }
        if self.token_secret.is_empty() {
            return Err("Token secret must not be empty".to_string());
        }
        if self.token_ttl_secs == 0 {
            return Err("Token TTL must be > 0".to_string());
        }

        Ok(())
    }

    /// Loguea un resumen de la configuración efectiva
    pub fn log_summary(&self) {
        info!(
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            job_latency_ms = self.job_latency_ms,
            "analytics worker pool"
        );
        info!(
            timeout_ms = self.stats_timeout_ms,
            recent_window_days = self.recent_window_days,
            "statistics aggregator"
        );
        info!(token_ttl_secs = self.token_ttl_secs, "token issuer");
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            workers: 3,
            queue_capacity: 100,
            job_latency_ms: 100,
            stats_timeout_ms: 5_000,
            recent_window_days: 7,
            token_secret: "your-super-secret-jwt-key-change-this-in-production".to_string(),
            token_ttl_secs: 86_400,
            demo_users: 10,
        }
    }
}
