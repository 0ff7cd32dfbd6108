use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use crate::{errors::ServiceError, handlers::common::success_response, AppState};

async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.dashboard.summary().await?;
    Ok(success_response(summary))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(summary))
}
