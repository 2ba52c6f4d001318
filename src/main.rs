//! # User Analytics - Entry Point
//! src/main.rs
//!
//! Levanta el servicio sobre el repositorio en memoria, ejecuta una carga
//! de demostración (registro, login, update, delete) e imprime las
//! estadísticas en JSON antes de apagar los workers.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use user_analytics::config::Config;
use user_analytics::service::{Collaborators, ServiceOptions, UserService};
use user_analytics::telemetry;
use user_analytics::users::{
    DigestTokenIssuer, InMemoryRepository, LoginRequest, RegisterRequest, Sha256Hasher,
    UpdateUserRequest,
};

fn main() {
    telemetry::init_tracing();

    let config = Config::new();
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }
    config.log_summary();

    if let Err(e) = run(&config) {
        error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let collaborators = Collaborators {
        repo: Arc::new(InMemoryRepository::new()),
        hasher: Arc::new(Sha256Hasher),
        tokens: Arc::new(DigestTokenIssuer::new(
            config.token_secret.clone(),
            config.token_ttl(),
        )),
    };
    let service = UserService::new(collaborators, ServiceOptions::from_config(config))?;

    for n in 0..config.demo_users {
        let email = format!("demo{}@example.com", n);
        let user = service.register(RegisterRequest {
            username: format!("demo{}", n),
            email: email.clone(),
            password: "demo-password".to_string(),
        })?;

        let token = service.login(LoginRequest {
            email,
            password: "demo-password".to_string(),
        })?;
        service.authenticate(&token)?;

        if n % 3 == 0 {
            service.update_user(
                user.id,
                UpdateUserRequest {
                    username: format!("demo{}-renamed", n),
                    email: String::new(),
                },
            )?;
        }
    }

    if config.demo_users > 1 {
        service.delete_user(1)?;
    }

    info!(queue_depth = service.queue_depth(), "demo workload submitted");

    // Dar tiempo a los workers antes de medir
    thread::sleep(config.job_latency() + Duration::from_millis(50));

    match service.get_statistics() {
        Ok(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
        Err(e) => warn!(error = %e, "statistics unavailable"),
    }

    let page = service.get_users(1, 5)?;
    info!(total = page.total, pages = page.total_pages, "user listing");

    service.shutdown();
    info!(
        processed = service.ledger().total_processed(),
        failed = service.ledger().total_failed(),
        "shutdown complete"
    );

    Ok(())
}
