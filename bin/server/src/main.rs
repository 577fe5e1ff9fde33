use std::path::PathBuf;
use std::sync::Arc;

use gatehouse_provider::{GoogleProvider, ProviderRegistry};
use gatehouse_session::{DEFAULT_MAX_AGE, SessionConfig, SessionStore};
use gatehouse_server::auth::AppState;
use gatehouse_server::config::ServerConfig;
use gatehouse_server::router;
use gatehouse_server::static_files::StaticConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!(env = %config.app_env, "loaded configuration");

    let sessions = SessionStore::new(
        &config.app_secret,
        SessionConfig {
            max_age: DEFAULT_MAX_AGE,
            secure: config.is_production(),
        },
    )
    .expect("invalid session secret");

    let google = GoogleProvider::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.redirect_url(),
    )
    .expect("invalid provider configuration");

    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(google));

    let content = StaticConfig::new(PathBuf::from(&config.content_root))
        .with_index(config.index_file.clone())
        .with_html5(config.html5);

    let state = Arc::new(AppState::new(
        sessions,
        providers,
        config.base_url.clone(),
        content,
    ));

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
