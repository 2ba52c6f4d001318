//! # Ledger de Jobs Procesados
//! src/metrics/ledger.rs
//!
//! Cuenta los jobs de analytics completados, agrupados por día UTC.
//! Es la fuente de datos de `processed_today` en las estadísticas.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 86_400;

/// Días de historial que se conservan
const RETAINED_DAYS: u64 = 7;

/// Día UTC (días desde epoch) de un instante
pub fn day_index(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() / SECS_PER_DAY)
        .unwrap_or(0)
}

/// Ledger thread-safe, los clones comparten datos
#[derive(Clone, Default)]
pub struct ProcessingLedger {
    inner: Arc<Mutex<LedgerData>>,
}

#[derive(Default)]
struct LedgerData {
    /// día -> jobs completados ese día
    per_day: BTreeMap<u64, u64>,

    total_processed: u64,

    total_failed: u64,
}

impl ProcessingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerData> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registra un job completado ahora
    pub fn record_processed(&self) {
        self.record_processed_at(SystemTime::now());
    }

    /// Registra un job completado en un instante dado
    pub fn record_processed_at(&self, at: SystemTime) {
        let day = day_index(at);
        let mut data = self.lock();

        data.total_processed += 1;
        *data.per_day.entry(day).or_insert(0) += 1;

        // Descartar días fuera de la ventana
        let oldest = day.saturating_sub(RETAINED_DAYS - 1);
        data.per_day = data.per_day.split_off(&oldest);
    }

    /// Registra un job que falló
    pub fn record_failed(&self) {
        self.lock().total_failed += 1;
    }

    /// Jobs completados hoy (UTC)
    pub fn processed_today(&self) -> u64 {
        self.processed_on(SystemTime::now())
    }

    /// Jobs completados el día de `at`
    pub fn processed_on(&self, at: SystemTime) -> u64 {
        let day = day_index(at);
        self.lock().per_day.get(&day).copied().unwrap_or(0)
    }

    pub fn total_processed(&self) -> u64 {
        self.lock().total_processed
    }

    pub fn total_failed(&self) -> u64 {
        self.lock().total_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn day(n: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(n * SECS_PER_DAY + 3_600)
    }

    #[test]
    fn test_counts_per_day() {
        let ledger = ProcessingLedger::new();

        ledger.record_processed_at(day(100));
        ledger.record_processed_at(day(100));
        ledger.record_processed_at(day(101));

        assert_eq!(ledger.processed_on(day(100)), 2);
        assert_eq!(ledger.processed_on(day(101)), 1);
        assert_eq!(ledger.processed_on(day(102)), 0);
        assert_eq!(ledger.total_processed(), 3);
    }

    #[test]
    fn test_old_days_are_pruned() {
        let ledger = ProcessingLedger::new();

        ledger.record_processed_at(day(10));
        ledger.record_processed_at(day(10 + RETAINED_DAYS));

        assert_eq!(ledger.processed_on(day(10)), 0);
        assert_eq!(ledger.processed_on(day(10 + RETAINED_DAYS)), 1);
        // El total no se poda
        assert_eq!(ledger.total_processed(), 2);
    }

    #[test]
    fn test_processed_today() {
        let ledger = ProcessingLedger::new();
        assert_eq!(ledger.processed_today(), 0);

        ledger.record_processed();
        ledger.record_failed();

        assert_eq!(ledger.processed_today(), 1);
        assert_eq!(ledger.total_failed(), 1);
    }

    #[test]
    fn test_clone_shares_counts() {
        let ledger = ProcessingLedger::new();
        let other = ledger.clone();

        other.record_processed();

        assert_eq!(ledger.total_processed(), 1);
    }

    #[test]
    fn test_concurrent_records() {
        let ledger = ProcessingLedger::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ledger.record_processed();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(ledger.total_processed(), 800);
    }
}
