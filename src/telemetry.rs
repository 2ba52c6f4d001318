//! # Logging Estructurado
//! src/telemetry.rs
//!
//! - Debug: salida legible para humanos
//! - Release: JSON para agregadores de logs
//!
//! El nivel se controla con `RUST_LOG` (por defecto `info`).

use tracing_subscriber::EnvFilter;

/// Instala el subscriber global. Llamarlo dos veces no es un error.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = if cfg!(debug_assertions) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing();
        init_tracing();
    }
}
