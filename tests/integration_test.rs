//! Tests de integración del servicio
//! tests/integration_test.rs
//!
//! Ejercitan la fachada completa sobre el repositorio en memoria: no
//! requieren ningún proceso externo.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use user_analytics::error::{JobError, ServiceError};
use user_analytics::jobs::{JobProcessor, JobQueue, WorkerPool};
use user_analytics::metrics::ProcessingLedger;
use user_analytics::service::{Collaborators, ServiceOptions, UserService};
use user_analytics::stats::{branch_fn, Aggregator, Contribution, Deadline};
use user_analytics::users::{
    DigestTokenIssuer, InMemoryRepository, LoginRequest, RegisterRequest, Sha256Hasher, UserId,
};

/// Helper: colaboradores en memoria
fn collaborators(repo: &InMemoryRepository) -> Collaborators {
    Collaborators {
        repo: Arc::new(repo.clone()),
        hasher: Arc::new(Sha256Hasher),
        tokens: Arc::new(DigestTokenIssuer::new("integration", Duration::from_secs(300))),
    }
}

fn options(workers: usize, queue_capacity: usize) -> ServiceOptions {
    ServiceOptions {
        workers,
        queue_capacity,
        job_latency: Duration::from_millis(1),
        stats_timeout: Duration::from_secs(2),
        recent_window: Duration::from_secs(7 * 86_400),
    }
}

fn register_request(n: usize) -> RegisterRequest {
    RegisterRequest {
        username: format!("user{}", n),
        email: format!("user{}@example.com", n),
        password: "password123".to_string(),
    }
}

/// Procesador que bloquea hasta que el test lo libere
fn gated_processor(
    ledger: ProcessingLedger,
) -> (Arc<Mutex<()>>, Arc<dyn JobProcessor>) {
    let gate = Arc::new(Mutex::new(()));
    let held = Arc::clone(&gate);
    let processor = move |_worker: usize, _job: UserId| -> Result<(), JobError> {
        let _pass = held.lock().unwrap();
        ledger.record_processed();
        Ok(())
    };
    (gate, Arc::new(processor))
}

#[test]
fn test_capacity_scenario_without_workers_draining() {
    let queue = JobQueue::new(2);

    let accepted: Vec<bool> = [1, 2, 3].into_iter().map(|id| queue.try_submit(id)).collect();

    assert_eq!(accepted, vec![true, true, false]);
}

#[test]
fn test_fifty_parallel_callers_against_capacity_ten() {
    let ledger = ProcessingLedger::new();
    let (gate, processor) = gated_processor(ledger.clone());
    let repo = InMemoryRepository::new();

    // Con la compuerta cerrada ningún worker libera espacio...
    let closed = gate.lock().unwrap();
    let service = Arc::new(
        UserService::with_processor(collaborators(&repo), options(1, 10), processor, ledger.clone())
            .unwrap(),
    );
    // ...salvo el job que el único worker ya tomó
    assert!(service.submit_analytics_job(0));
    let started = Instant::now();
    while service.queue_depth() != 0 && started.elapsed() < Duration::from_secs(2) {
        thread::sleep(Duration::from_millis(1));
    }

    let barrier = Arc::new(Barrier::new(50));
    let handles: Vec<_> = (1..=50)
        .map(|id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.submit_analytics_job(id)
            })
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&ok| ok)
        .count();

    assert_eq!(accepted, 10);
    assert_eq!(service.queue_depth(), 10);

    drop(closed);
    service.shutdown();
    assert_eq!(ledger.total_processed(), 11);
}

#[test]
fn test_submission_succeeds_again_after_drain() {
    let ledger = ProcessingLedger::new();
    let (gate, processor) = gated_processor(ledger.clone());
    let queue = JobQueue::new(3);

    let closed = gate.lock().unwrap();
    let pool = WorkerPool::start(queue.clone(), 1, processor, ledger.clone()).unwrap();

    // El worker toma el primero y se queda bloqueado; 3 más llenan la cola
    assert!(queue.try_submit(0));
    while !queue.is_empty() {
        thread::sleep(Duration::from_millis(1));
    }
    for id in 1..=3 {
        assert!(queue.try_submit(id));
    }
    assert!(!queue.try_submit(4));

    drop(closed);
    while queue.is_full() {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(queue.try_submit(5));

    pool.shutdown();
    assert_eq!(ledger.total_processed(), 5);
}

#[test]
fn test_every_user_operation_is_processed_exactly_once() {
    let repo = InMemoryRepository::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let ledger = ProcessingLedger::new();
    let recorder = ledger.clone();
    let processor = move |_worker: usize, job: UserId| -> Result<(), JobError> {
        sink.lock().unwrap().push(job);
        recorder.record_processed();
        Ok(())
    };

    let service = UserService::with_processor(
        collaborators(&repo),
        options(4, 100),
        Arc::new(processor),
        ledger,
    )
    .unwrap();

    for n in 0..20 {
        let user = service.register(register_request(n)).unwrap();
        service
            .login(LoginRequest {
                email: user.email.clone(),
                password: "password123".into(),
            })
            .unwrap();
    }
    service.shutdown();

    let mut jobs = seen.lock().unwrap().clone();
    jobs.sort();
    let expected: Vec<UserId> = (1..=20).flat_map(|id| [id, id]).collect();
    assert_eq!(jobs, expected);
}

#[test]
fn test_statistics_match_ground_truth() {
    let repo = InMemoryRepository::new();
    let service = UserService::new(collaborators(&repo), options(3, 100)).unwrap();

    for n in 0..6 {
        service.register(register_request(n)).unwrap();
    }
    service.delete_user(2).unwrap();
    service.shutdown();

    let stats = service.get_statistics().unwrap();

    assert_eq!(stats.total_users, 5);
    assert_eq!(stats.recent_users, 5);
    // 6 registros + 1 delete
    assert_eq!(stats.processed_today, 7);
    assert_eq!(stats.background_jobs, 0);
}

#[test]
fn test_statistics_report_queue_depth() {
    let ledger = ProcessingLedger::new();
    let (gate, processor) = gated_processor(ledger.clone());
    let repo = InMemoryRepository::new();

    let closed = gate.lock().unwrap();
    let service =
        UserService::with_processor(collaborators(&repo), options(1, 10), processor, ledger)
            .unwrap();

    assert!(service.submit_analytics_job(100));
    while service.queue_depth() != 0 {
        thread::sleep(Duration::from_millis(1));
    }
    for id in 0..4 {
        service.submit_analytics_job(id);
    }

    let stats = service.get_statistics().unwrap();
    assert_eq!(stats.background_jobs, 4);
    assert_eq!(stats.processed_today, 0);

    drop(closed);
    service.shutdown();
}

#[test]
fn test_slow_branch_scenario() {
    let aggregator = Aggregator::new()
        .with_branch(branch_fn("a", |_d: &Deadline| {
            thread::sleep(Duration::from_millis(10));
            Ok(Contribution::TotalUsers(1))
        }))
        .with_branch(branch_fn("b", |_d: &Deadline| {
            thread::sleep(Duration::from_millis(10));
            Ok(Contribution::RecentUsers(2))
        }))
        .with_branch(branch_fn("c", |_d: &Deadline| {
            thread::sleep(Duration::from_millis(200));
            Ok(Contribution::BackgroundJobs {
                processed_today: 3,
                queue_depth: 4,
            })
        }));

    let err = aggregator
        .compute_snapshot(Duration::from_millis(50))
        .unwrap_err();

    assert_eq!(err.branches(), vec!["c"]);
    assert!(err.to_string().contains("timeout getting c"));
}

#[test]
fn test_statistics_error_through_service() {
    let repo = InMemoryRepository::new();
    let service = UserService::new(collaborators(&repo), options(2, 10)).unwrap();
    service.register(register_request(1)).unwrap();

    repo.set_unavailable(true);
    let err = service.get_statistics().unwrap_err();
    repo.set_unavailable(false);

    match err {
        ServiceError::Statistics(aggregate) => {
            let mut names = aggregate.branches();
            names.sort();
            assert_eq!(names, vec!["recent_users", "total_users"]);
        }
        other => panic!("expected statistics error, got {:?}", other),
    }

    assert_eq!(service.get_statistics().unwrap().total_users, 1);
}

#[test]
fn test_shutdown_stops_accepting_jobs() {
    let repo = InMemoryRepository::new();
    let service = UserService::new(collaborators(&repo), options(2, 10)).unwrap();
    service.register(register_request(1)).unwrap();

    service.shutdown();

    assert!(!service.submit_analytics_job(1));
    // Las operaciones de usuario siguen funcionando; el job se descarta
    service.register(register_request(2)).unwrap();
    assert_eq!(service.ledger().total_processed(), 1);
}
