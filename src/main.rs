// ============================================================================
// SNAPGRAM CLIENT
// ============================================================================

// - Sign-up / sign-in forms with client-side validation
// - Session context populated from the remote account
// - Feed, search, likes, saves and profiles over the remote document API
// - Appwrite REST backend, or an in-memory stand-in for local development
// - Structured logging

use snapgram::{
    AppState,
    api::Api,
    backend::{AppwriteBackend, Backend, MemoryBackend},
    config::{BackendKind, Config},
    routes,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snapgram=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::load().expect("Environment misconfigured!");

    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::Appwrite(appwrite) => {
            info!("Using Appwrite backend at {}", appwrite.endpoint);
            Arc::new(AppwriteBackend::new(appwrite).expect("Invalid Appwrite configuration"))
        }
        BackendKind::Memory => {
            info!("Using in-memory backend");
            Arc::new(MemoryBackend::new(config.session_secret, config.login_quota))
        }
    };

    let state = AppState::new(Api::new(backend));

    // Pick up a session left over from a previous run
    let landing = state.session.restore(&state.api).await;
    info!("Landing on {}", landing.path());

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests.get()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .expect("Failed to bind address");

    info!("Snapgram running on http://{}", config.addr);
    info!("Endpoints:");
    info!("  POST   /sign-up            - Create account and sign in");
    info!("  POST   /sign-in            - Sign in");
    info!("  POST   /sign-out           - Sign out");
    info!("  GET    /                   - Home feed (auth)");
    info!("  GET    /explore            - Search or page through posts (auth)");
    info!("  GET    /all-users          - People (auth)");
    info!("  GET    /profile/{{id}}       - Profile (auth)");
    info!("  GET    /saved              - Saved posts (auth)");
    info!("  POST   /create-post        - Create post (auth)");
    info!("  POST   /posts/{{id}}/like    - Toggle like (auth)");
    info!("  POST   /posts/{{id}}/save    - Toggle save (auth)");

    axum::serve(listener, app).await.expect("Server error");
}
