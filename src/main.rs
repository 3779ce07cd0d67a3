use axum::{
    Server,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::from_fn,
};
use skillzbloom_backend::{
    AppState, config::Config, db, error::{AppError, AppResult}, init_tracing, middleware::logger,
    middleware::REQUEST_ID_HEADER, routes,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    if let Err(err) = run(config).await {
        error!(error = %err, "Server terminated");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> AppResult<()> {
    let server = config.server();

    // Initialize database
    let db = db::create_pool(&config.database())?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.as_str())?;

    let addr: SocketAddr = config
        .server_address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;

    let state = Arc::new(AppState::new(db, redis, config)?);

    let app = routes::create_router(state)
        .layer(cors_layer(&server.cors_origins))
        .layer(from_fn(logger));

    info!("Server running at http://{}", addr);
    info!("Roadmap stream available at ws://{}/ws/roadmap", addr);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
