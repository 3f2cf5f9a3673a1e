use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use folio_api::config::AppConfig;
use folio_api::handlers;
use folio_api::state::AppState;
use folio_api::store;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting folio API in {:?} mode", config.environment);

    // Lazy pool: requests surface connect errors, startup does not block on the store
    let pool = match store::connect(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("invalid database configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Upload directories exist before the first request, not per-request
    let upload_root = std::path::PathBuf::from(&config.upload.root_dir);
    for category in handlers::upload::CATEGORIES {
        if let Err(e) = std::fs::create_dir_all(upload_root.join(category)) {
            tracing::error!("failed to create upload directory '{}': {}", category, e);
            std::process::exit(1);
        }
    }

    let port = config.server.port;
    let cors = cors_layer(&config.security.cors_origin);

    let state = AppState {
        pool,
        config: std::sync::Arc::new(config),
        upload_root,
    };

    let app = app(state).layer(cors).layer(TraceLayer::new_for_http());

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("folio API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(auth_routes())
        .merge(portfolio_routes())
        .merge(resource_routes())
        .merge(visitor_routes())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use axum::routing::post;
    use folio_api::handlers::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/password-reset", post(auth::password_reset))
}

fn portfolio_routes() -> Router<AppState> {
    use axum::routing::{get, patch, post};
    use folio_api::handlers::{analytics, templates, upload, users};

    Router::new()
        // Portfolio read is public; the profile patch on the same path is not
        .route(
            "/api/users/:id",
            get(users::get_portfolio).patch(users::update_profile),
        )
        .route("/api/users/:id/settings", patch(users::update_settings))
        .route("/api/templates", get(templates::list))
        .route("/api/analytics/:id", get(analytics::get))
        .route(
            "/api/upload/:category",
            post(upload::upload_image).layer(upload::upload_body_limit()),
        )
}

fn resource_routes() -> Router<AppState> {
    use axum::routing::{get, patch};
    use folio_api::handlers::{experience, posts, projects, skills, testimonials};

    Router::new()
        .route(
            "/api/users/:id/projects",
            get(projects::list).post(projects::create),
        )
        .route(
            "/api/projects/:id",
            get(projects::get)
                .patch(projects::update)
                .delete(projects::remove),
        )
        .route(
            "/api/users/:id/skills",
            get(skills::list).post(skills::create),
        )
        .route("/api/skills/:id", patch(skills::update).delete(skills::remove))
        .route(
            "/api/users/:id/experience",
            get(experience::list).post(experience::create),
        )
        .route(
            "/api/experience/:id",
            patch(experience::update).delete(experience::remove),
        )
        .route(
            "/api/users/:id/testimonials",
            get(testimonials::list).post(testimonials::create),
        )
        .route(
            "/api/testimonials/:id",
            patch(testimonials::update).delete(testimonials::remove),
        )
        .route(
            "/api/users/:id/blog-posts",
            get(posts::list).post(posts::create),
        )
        .route("/api/blog-posts/:id", patch(posts::update).delete(posts::remove))
}

fn visitor_routes() -> Router<AppState> {
    use axum::routing::{get, post};
    use folio_api::handlers::{comments, contact};

    Router::new()
        .route(
            "/api/projects/:id/comments",
            get(comments::list).post(comments::create),
        )
        .route("/api/contact/:id", post(contact::send_message))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<axum::http::HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("invalid CORS origin '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}
