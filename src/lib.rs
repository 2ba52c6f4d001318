//! # User Analytics
//! src/lib.rs
//!
//! Servicio de usuarios con un núcleo concurrente de dos partes:
//! una cola acotada de jobs de analytics atendida por un pool fijo de
//! workers, y un agregador que calcula estadísticas en paralelo bajo un
//! deadline compartido.
//!
//! ## Arquitectura
//!
//! - `jobs`: cola acotada, pool de workers y procesador de analytics
//! - `stats`: agregador fan-out/fan-in y sus ramas
//! - `metrics`: ledger de jobs procesados por día
//! - `users`: modelo y colaboradores externos (repositorio, hashing, tokens)
//! - `service`: fachada que une todo
//! - `config`: configuración CLI / variables de entorno
//! - `telemetry`: logging estructurado
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use user_analytics::service::{Collaborators, ServiceOptions, UserService};
//! use user_analytics::users::{DigestTokenIssuer, InMemoryRepository, Sha256Hasher};
//!
//! let service = UserService::new(
//!     Collaborators {
//!         repo: Arc::new(InMemoryRepository::new()),
//!         hasher: Arc::new(Sha256Hasher),
//!         tokens: Arc::new(DigestTokenIssuer::new("secret", Duration::from_secs(3600))),
//!     },
//!     ServiceOptions::default(),
//! )
//! .expect("Error al iniciar workers");
//!
//! service.submit_analytics_job(1);
//! let stats = service.get_statistics();
//! service.shutdown();
//! ```

pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod service;
pub mod stats;
pub mod telemetry;
pub mod users;
