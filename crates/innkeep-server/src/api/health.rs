use axum::Router;
use axum::routing::get;

use super::envelope::Envelope;

/// Liveness only; the database is not touched.
pub async fn health_handler() -> Envelope {
    Envelope::message("ok")
}

pub fn router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/health", get(health_handler))
}
