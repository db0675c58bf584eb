/// Conversation handlers
use actix_web::{web, HttpResponse};
use error_types::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageQuery;
use crate::error::AppError;
use crate::middleware::{JwtAuthMiddleware, UserId};
use crate::models::ConversationSummary;
use crate::services::{self, ConversationService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub other_user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct StartConversationResponse {
    pub conversation_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
    pub has_more: bool,
}

/// Find or create the direct conversation with another user
///
/// POST /api/v1/conversations
/// 201 when this call created the conversation, 200 when it already existed
pub async fn start_conversation(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<StartConversationRequest>,
) -> Result<HttpResponse, AppError> {
    let other = body
        .other_user_id
        .ok_or_else(|| AppError::BadRequest("other_user_id is required".into()))?;

    let (conversation_id, created) =
        ConversationService::start_direct_conversation(&state.db, user.0, other).await?;

    let response = ApiResponse::ok(StartConversationResponse { conversation_id });
    if created {
        Ok(HttpResponse::Created().json(response))
    } else {
        Ok(HttpResponse::Ok().json(response))
    }
}

/// List the caller's conversations, most recently active first
///
/// GET /api/v1/conversations?page=&limit=
pub async fn list_conversations(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let (_page, limit, offset) = services::page_params(query.page, query.limit, 20);

    let (conversations, has_more) =
        ConversationService::list_conversations(&state.db, user.0, limit, offset).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ConversationListResponse {
        conversations,
        has_more,
    })))
}

/// Register routes
///
/// All conversation-scoped paths live in one scope so routing never
/// splits between siblings with the same prefix.
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/conversations")
            .wrap(JwtAuthMiddleware)
            .route("", web::post().to(start_conversation))
            .route("", web::get().to(list_conversations))
            .route(
                "/{id}/messages",
                web::post().to(super::messages::send_message),
            )
            .route(
                "/{id}/messages",
                web::get().to(super::messages::get_conversation_messages),
            ),
    );
}
