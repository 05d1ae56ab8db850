use std::net::SocketAddr;
use std::sync::Arc;

use kereta_api::{app, AppState};
use kereta_store::app_config::{Config, StorageBackend};
use kereta_store::{
    DbClient, LocalStore, MemoryUserAccounts, SqliteHistoryStore, SqliteScheduleSource,
    SqliteUserAccounts, StaticScheduleSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kereta_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Kereta API on port {}", config.server.port);

    let state = match config.storage.backend {
        StorageBackend::Local => {
            let store = LocalStore::open(&config.storage.data_dir)
                .expect("Failed to open local data directory");
            AppState {
                history: Arc::new(store),
                schedules: Arc::new(StaticScheduleSource::new()),
                users: Arc::new(MemoryUserAccounts::default()),
            }
        }
        StorageBackend::Sqlite => {
            let database = config
                .database
                .as_ref()
                .expect("storage.backend = sqlite requires a [database] section");
            let db = DbClient::new(&database.url)
                .await
                .expect("Failed to connect to database");
            db.migrate().await.expect("Failed to run migrations");
            AppState {
                history: Arc::new(SqliteHistoryStore::new(
                    db.pool.clone(),
                    config.storage.session.clone(),
                )),
                schedules: Arc::new(SqliteScheduleSource::new(db.pool.clone())),
                users: Arc::new(SqliteUserAccounts::new(db.pool)),
            }
        }
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
