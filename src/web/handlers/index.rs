// GET / runs load -> normalize -> fit -> label -> rank and renders the page.
//
// Returns 200 with the results page on success. DataLoad and Model errors
// return 500, ResourceUnavailable returns 503; each with an HTML error page
// naming the error kind.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::error::Error;
use crate::output::html::{render_error_page, render_page};
use crate::web::AppState;

pub async fn index(State(state): State<AppState>) -> Response {
    // CPU-bound fit; keep it off the async workers
    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.run()).await;

    match result {
        Ok(Ok(report)) => Html(render_page(&report)).into_response(),
        Ok(Err(err)) => {
            error!(kind = err.kind(), error = %err, "Topic pipeline failed");
            error_response(&err)
        }
        Err(join_err) => {
            error!(error = %join_err, "Topic pipeline worker panicked");
            error_response(&Error::Model(format!("pipeline worker failed: {join_err}")))
        }
    }
}

fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::ResourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::DataLoad { .. } | Error::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Html(render_error_page(err))).into_response()
}
