use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::queues::{
    dtos as queues_dtos, handlers as queues_handlers, models as queues_models,
};
use crate::features::tickets::{
    dtos as tickets_dtos, handlers as tickets_handlers, models as tickets_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Queues
        queues_handlers::list_priorities,
        queues_handlers::list_categories,
        queues_handlers::list_queue_sets,
        queues_handlers::get_queue_set,
        queues_handlers::list_initial_queues,
        queues_handlers::get_filter_settings,
        queues_handlers::create_queue_set,
        queues_handlers::add_queue,
        queues_handlers::grant_user,
        queues_handlers::list_outcomes,
        queues_handlers::add_outcome,
        // Tickets
        tickets_handlers::list_tickets,
        tickets_handlers::create_ticket,
        tickets_handlers::get_ticket,
        tickets_handlers::get_ticket_summary,
        tickets_handlers::get_ticket_history,
        tickets_handlers::can_add_patient,
        tickets_handlers::move_ticket,
        tickets_handlers::set_assignee,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            // Queues
            queues_models::Priority,
            queues_models::QueueSetCategory,
            queues_models::FilterSettings,
            queues_models::AssignmentField,
            queues_dtos::QueueSetResponseDto,
            queues_dtos::QueueResponseDto,
            queues_dtos::QueueWithOutcomesDto,
            queues_dtos::QueueSetDetailDto,
            queues_dtos::QueueSetCreatedDto,
            queues_dtos::CreateQueueDto,
            queues_dtos::CreateQueueSetDto,
            queues_dtos::AddOutcomeDto,
            queues_dtos::GrantQueueSetUserDto,
            ApiResponse<Vec<queues_models::Priority>>,
            ApiResponse<Vec<queues_models::QueueSetCategory>>,
            ApiResponse<Vec<queues_dtos::QueueSetResponseDto>>,
            ApiResponse<queues_dtos::QueueSetDetailDto>,
            ApiResponse<queues_dtos::QueueSetCreatedDto>,
            ApiResponse<queues_dtos::QueueResponseDto>,
            ApiResponse<Vec<queues_dtos::QueueResponseDto>>,
            ApiResponse<queues_models::FilterSettings>,
            // Tickets
            tickets_models::TicketSummary,
            tickets_dtos::TicketResponseDto,
            tickets_dtos::QueueAssignmentDto,
            tickets_dtos::TicketDetailDto,
            tickets_dtos::TicketListItemDto,
            tickets_dtos::CreateTicketDto,
            tickets_dtos::MoveTicketDto,
            tickets_dtos::AssignTicketDto,
            tickets_dtos::CanAddPatientDto,
            ApiResponse<Vec<tickets_dtos::TicketListItemDto>>,
            ApiResponse<tickets_dtos::TicketDetailDto>,
            ApiResponse<tickets_models::TicketSummary>,
            ApiResponse<Vec<tickets_dtos::QueueAssignmentDto>>,
            ApiResponse<tickets_dtos::TicketResponseDto>,
            ApiResponse<tickets_dtos::CanAddPatientDto>,
        )
    ),
    tags(
        (name = "queues", description = "Queue sets, queues and their outcomes"),
        (name = "tickets", description = "Patient tickets and their queue history"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Patient Ticketing API",
        version = "0.1.0",
        description = "API documentation for patient ticketing",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
