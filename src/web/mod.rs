// Web server: a single GET / route that runs the pipeline and renders HTML.
//
// Each request reloads the spreadsheet and re-fits on a blocking worker, so
// concurrent requests never share mutable state. The pipeline itself
// (resources, engine, optional fit cache) is built once and shared read-only.

use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::pipeline::TopicPipeline;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TopicPipeline>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(pipeline: TopicPipeline, port: u16, bind: &str) -> Result<()> {
    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Comment topics page listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index::index))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
