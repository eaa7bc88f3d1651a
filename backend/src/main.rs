use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatehouse_backend::{
    config::Config,
    db::connection::{create_pool, run_migrations, DbPool},
    handlers, middleware as auth_middleware,
    state::AppState,
    utils::email::Mailer,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        jwt_secret = %mask_secret(&config.jwt_secret),
        session_ttl_hours = config.session_ttl_hours,
        reset_token_ttl_minutes = config.reset_token_ttl_minutes,
        frontend_url = %config.frontend_url,
        cookie_secure = config.cookie_secure,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool: DbPool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let mailer = Mailer::from_config(&config.smtp)?;
    let state = AppState::new(pool, config.clone(), mailer);

    // Build public routes (no session required)
    let public_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/status", get(handlers::auth::login_status))
        .route(
            "/api/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route(
            "/api/auth/reset-password/{token}",
            put(handlers::auth::reset_password),
        );

    // Build session-protected routes
    let protected_routes = Router::new()
        .route(
            "/api/auth/change-password",
            put(handlers::auth::change_password),
        )
        .route(
            "/api/users/me",
            get(handlers::users::get_me).patch(handlers::users::update_me),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_session,
        ));

    // The session cookie is cross-site, so CORS must name the frontend origin
    // explicitly and allow credentials; a wildcard would break cookie auth.
    let cors = CorsLayer::new()
        .allow_origin(config.frontend_url.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(24 * 60 * 60));

    // Compose app with shared layers (CORS/Trace) and shared state
    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
