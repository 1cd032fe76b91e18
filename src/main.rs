//! User store - demo entry point
//!
//! Registers a couple of accounts, runs the classic login sequence and prints
//! the administrative export.

use std::sync::Arc;

use log::{error, info};

use user_store::error::handlers::handle_error;
use user_store::utils::logging::setup_logging;
use user_store::{StoreConfig, UserStore, UserStoreError};

const DEMO_USERS: [(&str, &str); 2] = [("alice", "password123"), ("bob", "hunter2")];

#[tokio::main]
async fn main() {
    setup_logging();

    if let Err(e) = run().await {
        handle_error(&e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), UserStoreError> {
    let config = StoreConfig::load()?;
    info!(
        "Starting user store (argon2id m={} KiB, t={}, p={})",
        config.hashing.memory_kib, config.hashing.iterations, config.hashing.parallelism
    );

    let store = Arc::new(UserStore::with_config(&config));

    // Hashing is CPU-bound, keep it off the async workers
    let registrations: Vec<_> = DEMO_USERS
        .iter()
        .map(|&(username, password)| {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || store.add_user(username, password))
        })
        .collect();

    for task in registrations {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => handle_error(&UserStoreError::from(e)),
            Err(e) => error!("Registration task failed: {}", e),
        }
    }

    for (username, password) in [
        ("alice", "password123"),
        ("alice", "wrongpass"),
        ("bob", "hunter2"),
    ] {
        println!("{}", store.authenticate(username, password));
    }

    println!("{}", store.export_users()?);
    Ok(())
}
