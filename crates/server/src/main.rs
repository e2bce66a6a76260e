use axum::Router;
use database::db::create_connection;
use log::info;
use std::env;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{doc::ApiDoc, state::AppState, utils::shutdown::shutdown_signal};

mod doc;
mod dtos;
mod error;
mod extractors;
mod routes;
mod state;
mod utils;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

fn app(state: AppState) -> Router {
    let (router, api) = routes::router()
        .with_state(state)
        .split_for_parts();
    let api = ApiDoc::openapi().merge_from(api);

    router
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", api))
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let db = create_connection()
        .await
        .expect("Failed to connect to the database");

    let bind_address =
        env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
    let listener = TcpListener::bind(&bind_address)
        .await
        .expect("Failed to bind address");
    info!("Running axum on http://{bind_address} (docs at /docs)");

    axum::serve(listener, app(AppState::new(db)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}
