//! Quarterdeck server - sea service training record verification

use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quarterdeck::registry::PersonnelClient;
use quarterdeck::{api, AppState};

#[derive(Parser)]
#[command(name = "quarterdeck")]
#[command(about = "Sea service training record verification server")]
#[command(version)]
struct Config {
    /// Address to listen on
    #[arg(long, env = "QUARTERDECK_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:quarterdeck.db")]
    database_url: String,

    /// Base URL of the personnel/assignment registry
    #[arg(long, env = "REGISTRY_URL", default_value = "http://localhost:8080")]
    registry_url: String,

    /// Bearer token for the personnel registry
    #[arg(long, env = "REGISTRY_TOKEN", default_value = "", hide_env_values = true)]
    registry_token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quarterdeck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    // Database connection
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    // Run migrations and seed the guidance read-model
    sqlx::migrate!("./migrations").run(&pool).await?;

    let registry = PersonnelClient::new(&config.registry_url, &config.registry_token);
    let state = AppState::new(pool, registry);
    state.store.ensure_seeded().await?;

    // Build router
    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
