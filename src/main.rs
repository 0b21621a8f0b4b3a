use book_search::catalog::source::{BookSource, GraphQlSource, StaticSource};
use book_search::catalog::store::Catalog;
use book_search::config::Config;
use book_search::search::handlers::{router, AppState};
use book_search::search::sessions::SessionStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env()?;
    tracing::info!("Reset policy: {:?}", config.reset_policy);

    // 1. Book source:
    let source: Arc<dyn BookSource> = match &config.books_file {
        Some(path) => Arc::new(StaticSource::from_json_file(path)?),
        None => Arc::new(GraphQlSource::new(
            &config.books_api_url,
            config.fetch_timeout,
            config.fetch_attempts,
        )),
    };

    // 2. Catalog (fetched once; a failure is served as an error, not fatal):
    let catalog = Catalog::mount(source).await;
    if let Some(message) = catalog.state().await.error_message() {
        tracing::warn!("{}", message);
    }

    // 3. Search sessions (bounded, swept once a minute):
    let sessions = SessionStore::with_limits(
        config.reset_policy,
        config.session_capacity,
        config.session_idle_timeout,
    );
    sessions.start_sweeper(Duration::from_secs(60));

    // 4. HTTP Router:
    let app = router(AppState::with_sessions(
        catalog,
        config.reset_policy,
        sessions,
    ));

    // 5. Start HTTP server:
    tracing::info!("Search API listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
