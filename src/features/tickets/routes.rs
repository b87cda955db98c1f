use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::tickets::handlers;
use crate::features::tickets::services::{TicketQueryService, TicketService};

/// Services behind the ticket endpoints
#[derive(Clone)]
pub struct TicketState {
    pub tickets: Arc<TicketService>,
    pub queries: Arc<TicketQueryService>,
}

/// Create routes for the tickets feature
///
/// Note: This feature requires authentication; queue set permissions are
/// checked per ticket.
pub fn routes(state: TicketState) -> Router {
    Router::new()
        .route("/api/queue-sets/{id}/tickets", get(handlers::list_tickets))
        .route(
            "/api/queues/{id}/can-add-patient",
            get(handlers::can_add_patient),
        )
        .route("/api/tickets", post(handlers::create_ticket))
        .route("/api/tickets/{id}", get(handlers::get_ticket))
        .route("/api/tickets/{id}/summary", get(handlers::get_ticket_summary))
        .route("/api/tickets/{id}/history", get(handlers::get_ticket_history))
        .route("/api/tickets/{id}/move", post(handlers::move_ticket))
        .route("/api/tickets/{id}/assignee", put(handlers::set_assignee))
        .with_state(state)
}
