use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::{
    AssignTicketDto, CanAddPatientDto, CanAddPatientQuery, CreateTicketDto, MoveTicketDto,
    QueueAssignmentDto, TicketDetailDto, TicketListItemDto, TicketListQuery, TicketResponseDto,
};
use crate::features::tickets::models::TicketSummary;
use crate::features::tickets::routes::TicketState;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List a queue set's tickets
#[utoipa::path(
    get,
    path = "/api/queue-sets/{id}/tickets",
    params(
        ("id" = Uuid, Path, description = "Queue set ID"),
        TicketListQuery,
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Tickets matching the filter", body = ApiResponse<Vec<TicketListItemDto>>),
        (status = 400, description = "Malformed filter"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Queue set not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn list_tickets(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TicketListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<TicketListItemDto>>>> {
    let filter = query.to_filter()?;
    let (items, meta) = state.queries.list(id, &filter, &pagination, &user).await?;
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// Add a patient to an initial queue, opening a ticket
#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = CreateTicketDto,
    responses(
        (status = 201, description = "Ticket created", body = ApiResponse<TicketDetailDto>),
        (status = 400, description = "Validation error, with per-field messages"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not permissioned for the queue set"),
        (status = 404, description = "Patient, queue, firm or event not found"),
        (status = 409, description = "Patient already has an open ticket in the queue set")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn create_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    ValidatedJson(dto): ValidatedJson<CreateTicketDto>,
) -> Result<(StatusCode, Json<ApiResponse<TicketDetailDto>>)> {
    let detail = state.tickets.add_patient_to_queue(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(detail),
            Some("Patient added to queue".to_string()),
            None,
        )),
    ))
}

/// Get a ticket with its history and next possible queues
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket found", body = ApiResponse<TicketDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketDetailDto>>> {
    let detail = state.tickets.detail(id).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Get the flat summary of a ticket
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/summary",
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket summary", body = ApiResponse<TicketSummary>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn get_ticket_summary(
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketSummary>>> {
    let summary = state.tickets.summary(id).await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Get a ticket's queue assignments, oldest first
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Queue assignments", body = ApiResponse<Vec<QueueAssignmentDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn get_ticket_history(
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<QueueAssignmentDto>>>> {
    let history = state.tickets.history(id).await?;
    Ok(Json(ApiResponse::success(Some(history), None, None)))
}

/// Check whether a patient can be added to a queue
#[utoipa::path(
    get,
    path = "/api/queues/{id}/can-add-patient",
    params(
        ("id" = Uuid, Path, description = "Queue ID"),
        CanAddPatientQuery
    ),
    responses(
        (status = 200, description = "Whether the patient may get a ticket in this queue", body = ApiResponse<CanAddPatientDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Queue not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn can_add_patient(
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CanAddPatientQuery>,
) -> Result<Json<ApiResponse<CanAddPatientDto>>> {
    let can_add = state
        .tickets
        .can_add_patient_to_queue(query.patient_id, id)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(CanAddPatientDto { can_add }),
        None,
        None,
    )))
}

/// Move a ticket to an outcome of its current queue
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/move",
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    request_body = MoveTicketDto,
    responses(
        (status = 200, description = "Ticket moved", body = ApiResponse<TicketDetailDto>),
        (status = 400, description = "Validation error, with per-field messages"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not permissioned for the queue set"),
        (status = 404, description = "Ticket or firm not found"),
        (status = 409, description = "Ticket was moved by someone else")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn move_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<MoveTicketDto>,
) -> Result<Json<ApiResponse<TicketDetailDto>>> {
    let detail = state.tickets.move_ticket(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(detail),
        Some("Ticket moved".to_string()),
        None,
    )))
}

/// Set or release (with null) the user working on a ticket
#[utoipa::path(
    put,
    path = "/api/tickets/{id}/assignee",
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    request_body = AssignTicketDto,
    responses(
        (status = 200, description = "Assignee updated", body = ApiResponse<TicketResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not permissioned for the queue set"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn set_assignee(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = match dto.assignee_user_id.as_deref() {
        Some(assignee) => state.tickets.assign(&user, id, assignee).await?,
        None => state.tickets.release(&user, id).await?,
    };
    Ok(Json(ApiResponse::success(Some(ticket), None, None)))
}
