//! Example consumer: serves the models from `MODELS_PATH` (default `models.json`) under `/api`.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Settings come from the environment or a `.env` file: DATABASE_URL, BIND_ADDR, API_BASE,
//! MODELS_PATH, DELETED_COLUMN, BODY_LIMIT.

use restormify::{common_routes, define_from_path, restormify_with_state, AppState, Db, ServerSettings};
use std::path::PathBuf;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("restormify=info,example_consumer=info")),
        )
        .init();

    let settings = ServerSettings::from_env()?;
    let db = Db::connect(&settings.database_url).await?;

    let models_path = settings
        .models_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models.json"));
    let names = define_from_path(&db, &models_path).await?;
    tracing::info!(models = ?names, "models ready");

    let state = AppState::new(db.clone(), settings.options.clone());
    let app = common_routes(state.clone()).merge(restormify_with_state(state));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    db.close().await;
    Ok(())
}
