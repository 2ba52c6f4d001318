//! # Métricas de Jobs
//! src/metrics/mod.rs
//!
//! Contadores de jobs de analytics completados y fallidos.

pub mod ledger;

pub use ledger::ProcessingLedger;
