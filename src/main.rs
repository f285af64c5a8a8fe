use axum::{Server, http::HeaderValue, middleware::from_fn};
use campus_desk::{
    AppState,
    config::Config,
    db::create_pool,
    init_tracing,
    middleware::request_tracking_middleware,
    routes::create_router,
    websocket::start_connection_cleanup_task,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(&config.logging());

    let db = create_pool(&config.database())?;
    let redis = redis::Client::open(config.redis_url.as_str())?;
    let addr: SocketAddr = config.server_address().parse()?;
    let cors = cors_layer(&config.server().cors_origins);

    let state = Arc::new(AppState::new(db, redis, config));

    let ws_manager = state.ws.clone();
    tokio::spawn(async move {
        start_connection_cleanup_task(ws_manager).await;
    });

    let app = create_router(state)
        .layer(cors)
        .layer(from_fn(request_tracking_middleware));

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("WebSocket endpoint available at ws://{}/ws", addr);
    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
