//! Activities Service — standalone binary for managing school activities.
//!
//! Hosts the JSON API and the static UI on the same port.
//! Default: http://127.0.0.1:8000/

mod config;
mod error;
mod routes;
mod store;

use config::Config;
use error::StartupError;
use routes::AppState;
use std::sync::Arc;
use store::ActivityStore;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let store = ActivityStore::open(&config.data_path)?;
    if store.is_empty() {
        log::info!("No activities in {} yet", store.path().display());
    } else {
        log::info!("Loaded {} activities from {}", store.len(), store.path().display());
    }

    let state = Arc::new(AppState {
        store: Arc::new(store),
    });
    let app = routes::router(state, &config.static_dir);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;
    log::info!("Activities Service listening on http://{}", addr);

    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
