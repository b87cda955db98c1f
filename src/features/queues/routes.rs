use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::queues::handlers;
use crate::features::queues::services::QueueSetService;

/// Create routes for the queue registry
///
/// Reads are open to any authenticated user; writes require a ticketing admin.
pub fn routes(service: Arc<QueueSetService>) -> Router {
    Router::new()
        .route("/api/priorities", get(handlers::list_priorities))
        .route("/api/queue-set-categories", get(handlers::list_categories))
        .route(
            "/api/queue-sets",
            get(handlers::list_queue_sets).post(handlers::create_queue_set),
        )
        .route("/api/queue-sets/{id}", get(handlers::get_queue_set))
        .route(
            "/api/queue-sets/{id}/initial-queues",
            get(handlers::list_initial_queues),
        )
        .route(
            "/api/queue-sets/{id}/filter-settings",
            get(handlers::get_filter_settings),
        )
        .route("/api/queue-sets/{id}/queues", post(handlers::add_queue))
        .route("/api/queue-sets/{id}/users", post(handlers::grant_user))
        .route(
            "/api/queues/{id}/outcomes",
            get(handlers::list_outcomes).post(handlers::add_outcome),
        )
        .with_state(service)
}
