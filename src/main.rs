//! Padel Live Back binary entrypoint wiring REST, SSE and the storage supervisor.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use padel_live_back::{
    config::AppConfig,
    dao::{
        storage::StorageError,
        tournament_store::{TournamentStore, memory::MemoryTournamentStore},
    },
    routes,
    services::{sse_events, storage_supervisor},
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Storage backend selected with `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy)]
enum Backend {
    #[cfg(feature = "mongo-store")]
    Mongo,
    #[cfg(feature = "couch-store")]
    Couch,
    Memory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let backend = select_backend()?;
    let app_state = AppState::new(AppConfig::load());

    spawn_storage_supervisor(app_state.clone(), backend);
    tokio::spawn(forward_degraded_changes(app_state.clone()));

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, ?backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

fn select_backend() -> anyhow::Result<Backend> {
    let requested = env::var("STORAGE_BACKEND").ok();
    let backend = match requested.as_deref().map(str::trim) {
        #[cfg(feature = "mongo-store")]
        None | Some("") | Some("mongo") => Backend::Mongo,
        #[cfg(not(feature = "mongo-store"))]
        None | Some("") => Backend::Memory,
        #[cfg(feature = "couch-store")]
        Some("couch") => Backend::Couch,
        Some("memory") => Backend::Memory,
        Some(other) => bail!("unsupported STORAGE_BACKEND `{other}`"),
    };
    Ok(backend)
}

/// Hand the selected backend's connector to the storage supervisor.
fn spawn_storage_supervisor(state: SharedState, backend: Backend) {
    match backend {
        #[cfg(feature = "mongo-store")]
        Backend::Mongo => {
            use padel_live_back::dao::tournament_store::mongodb::{
                MongoConfig, MongoTournamentStore,
            };

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoTournamentStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn TournamentStore>)
            }));
        }
        #[cfg(feature = "couch-store")]
        Backend::Couch => {
            use padel_live_back::dao::tournament_store::couchdb::{
                CouchConfig, CouchTournamentStore,
            };

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = CouchConfig::from_env()?;
                let store = CouchTournamentStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn TournamentStore>)
            }));
        }
        Backend::Memory => {
            let store: Arc<dyn TournamentStore> = Arc::new(MemoryTournamentStore::new());
            tokio::spawn(storage_supervisor::run(state, move || {
                let store = store.clone();
                async move { Ok::<_, StorageError>(store) }
            }));
        }
    }
}

/// Push degraded mode changes to realtime subscribers.
async fn forward_degraded_changes(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    while watcher.changed().await.is_ok() {
        let degraded = *watcher.borrow_and_update();
        info!(degraded, "storage availability changed");
        sse_events::broadcast_system_status(&state, degraded);
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
