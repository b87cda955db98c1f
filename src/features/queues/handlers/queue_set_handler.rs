use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, ValidatedJson};
use crate::features::auth::guards::RequireTicketingAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::queues::dtos::{
    AddOutcomeDto, CreateQueueDto, CreateQueueSetDto, GrantQueueSetUserDto, QueueResponseDto,
    QueueSetCreatedDto, QueueSetDetailDto, QueueSetResponseDto,
};
use crate::features::queues::models::{FilterSettings, Priority, QueueSetCategory};
use crate::features::queues::services::QueueSetService;
use crate::shared::types::{ApiResponse, Meta};

/// List ticket priorities
#[utoipa::path(
    get,
    path = "/api/priorities",
    responses(
        (status = 200, description = "Priorities in display order", body = ApiResponse<Vec<Priority>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn list_priorities(
    State(service): State<Arc<QueueSetService>>,
) -> Result<Json<ApiResponse<Vec<Priority>>>> {
    let priorities = service.list_priorities().await?;
    Ok(Json(ApiResponse::success(Some(priorities), None, None)))
}

/// List active queue set categories
#[utoipa::path(
    get,
    path = "/api/queue-set-categories",
    responses(
        (status = 200, description = "Queue set categories", body = ApiResponse<Vec<QueueSetCategory>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn list_categories(
    State(service): State<Arc<QueueSetService>>,
) -> Result<Json<ApiResponse<Vec<QueueSetCategory>>>> {
    let categories = service.list_categories().await?;
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

/// List active queue sets
#[utoipa::path(
    get,
    path = "/api/queue-sets",
    responses(
        (status = 200, description = "Queue sets ordered by name", body = ApiResponse<Vec<QueueSetResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn list_queue_sets(
    State(service): State<Arc<QueueSetService>>,
) -> Result<Json<ApiResponse<Vec<QueueSetResponseDto>>>> {
    let sets = service.list_queue_sets().await?;
    let total = sets.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(sets),
        None,
        Some(Meta {
            total,
            page: None,
            page_size: None,
        }),
    )))
}

/// Get a queue set with its queues and outcomes
///
/// `can_process` tells whether the caller may add patients to and move
/// tickets within this queue set.
#[utoipa::path(
    get,
    path = "/api/queue-sets/{id}",
    params(
        ("id" = Uuid, Path, description = "Queue set ID")
    ),
    responses(
        (status = 200, description = "Queue set found", body = ApiResponse<QueueSetDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Queue set not found")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn get_queue_set(
    user: AuthenticatedUser,
    State(service): State<Arc<QueueSetService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QueueSetDetailDto>>> {
    let detail = service.detail(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// List the queues of a set that new tickets may start in
#[utoipa::path(
    get,
    path = "/api/queue-sets/{id}/initial-queues",
    params(
        ("id" = Uuid, Path, description = "Queue set ID")
    ),
    responses(
        (status = 200, description = "Active initial queues", body = ApiResponse<Vec<QueueResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Queue set not found")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn list_initial_queues(
    State(service): State<Arc<QueueSetService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<QueueResponseDto>>>> {
    let queue_set = service.get_queue_set(id).await?;
    let queues = service.initial_queues_of(queue_set.id).await?;
    let queues: Vec<QueueResponseDto> = queues.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(queues), None, None)))
}

/// Get which ticket listing filters a queue set offers
#[utoipa::path(
    get,
    path = "/api/queue-sets/{id}/filter-settings",
    params(
        ("id" = Uuid, Path, description = "Queue set ID")
    ),
    responses(
        (status = 200, description = "Filter settings", body = ApiResponse<FilterSettings>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Queue set not found")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn get_filter_settings(
    State(service): State<Arc<QueueSetService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FilterSettings>>> {
    let settings = service.filter_settings_of(id).await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

/// Create a queue set and its initial queue
#[utoipa::path(
    post,
    path = "/api/queue-sets",
    request_body = CreateQueueSetDto,
    responses(
        (status = 201, description = "Queue set created", body = ApiResponse<QueueSetCreatedDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Ticketing admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn create_queue_set(
    RequireTicketingAdmin(_admin): RequireTicketingAdmin,
    State(service): State<Arc<QueueSetService>>,
    ValidatedJson(dto): ValidatedJson<CreateQueueSetDto>,
) -> Result<(StatusCode, Json<ApiResponse<QueueSetCreatedDto>>)> {
    let created = service.create_queue_set(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(created),
            Some("Queue set created".to_string()),
            None,
        )),
    ))
}

/// Add a queue to a queue set
#[utoipa::path(
    post,
    path = "/api/queue-sets/{id}/queues",
    params(
        ("id" = Uuid, Path, description = "Queue set ID")
    ),
    request_body = CreateQueueDto,
    responses(
        (status = 201, description = "Queue created", body = ApiResponse<QueueResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Ticketing admin access required"),
        (status = 404, description = "Queue set not found")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn add_queue(
    RequireTicketingAdmin(_admin): RequireTicketingAdmin,
    State(service): State<Arc<QueueSetService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateQueueDto>,
) -> Result<(StatusCode, Json<ApiResponse<QueueResponseDto>>)> {
    let queue = service.add_queue(id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(queue), None, None)),
    ))
}

/// Grant a user permission to process tickets in a queue set
#[utoipa::path(
    post,
    path = "/api/queue-sets/{id}/users",
    params(
        ("id" = Uuid, Path, description = "Queue set ID")
    ),
    request_body = GrantQueueSetUserDto,
    responses(
        (status = 200, description = "Permission granted"),
        (status = 403, description = "Ticketing admin access required"),
        (status = 404, description = "Queue set not found")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn grant_user(
    RequireTicketingAdmin(_admin): RequireTicketingAdmin,
    State(service): State<Arc<QueueSetService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<GrantQueueSetUserDto>,
) -> Result<Json<ApiResponse<()>>> {
    service.grant_user(id, &dto.user_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Permission granted".to_string()),
        None,
    )))
}

/// List the outcomes of a queue
#[utoipa::path(
    get,
    path = "/api/queues/{id}/outcomes",
    params(
        ("id" = Uuid, Path, description = "Queue ID")
    ),
    responses(
        (status = 200, description = "Outcome queues in display order; empty for a terminal queue", body = ApiResponse<Vec<QueueResponseDto>>),
        (status = 404, description = "Queue not found")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn list_outcomes(
    State(service): State<Arc<QueueSetService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<QueueResponseDto>>>> {
    let queue = service.get_queue(id).await?;
    let outcomes = service.outcomes_of(queue.id).await?;
    let outcomes: Vec<QueueResponseDto> = outcomes.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(outcomes), None, None)))
}

/// Add an outcome to a queue
#[utoipa::path(
    post,
    path = "/api/queues/{id}/outcomes",
    params(
        ("id" = Uuid, Path, description = "Queue ID")
    ),
    request_body = AddOutcomeDto,
    responses(
        (status = 201, description = "Outcome added", body = ApiResponse<Vec<QueueResponseDto>>),
        (status = 400, description = "Outcome is the queue itself or in another queue set"),
        (status = 403, description = "Ticketing admin access required"),
        (status = 404, description = "Queue not found"),
        (status = 409, description = "Outcome already configured")
    ),
    security(("bearer_auth" = [])),
    tag = "queues"
)]
pub async fn add_outcome(
    RequireTicketingAdmin(_admin): RequireTicketingAdmin,
    State(service): State<Arc<QueueSetService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AddOutcomeDto>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<QueueResponseDto>>>)> {
    let outcomes = service.add_outcome(id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(outcomes), None, None)),
    ))
}
