/// Message handlers
use actix_web::{web, HttpResponse};
use error_types::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageQuery;
use crate::error::AppError;
use crate::middleware::{JwtAuthMiddleware, UserId};
use crate::models::Message;
use crate::services::{self, ConversationService, MessageService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// Send a message into a conversation
///
/// POST /api/v1/conversations/{id}/messages
pub async fn send_message(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let conversation_id = path.into_inner();
    let content = body
        .content
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("content is required".into()))?;

    let message =
        MessageService::send_message(&state.db, conversation_id, user.0, content).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(message)))
}

/// Page through a conversation's messages in send order; marks messages
/// addressed to the caller as read
///
/// GET /api/v1/conversations/{id}/messages?page=&limit=
pub async fn get_conversation_messages(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let conversation_id = path.into_inner();
    let (_page, limit, offset) = services::page_params(query.page, query.limit, 50);

    let (messages, has_more) =
        MessageService::list_messages(&state.db, conversation_id, user.0, limit, offset).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(MessageListResponse { messages, has_more })))
}

/// Total unread messages addressed to the caller across all conversations
///
/// GET /api/v1/messages/unread-count
pub async fn get_unread_count(
    state: web::Data<AppState>,
    user: UserId,
) -> Result<HttpResponse, AppError> {
    let unread_count = ConversationService::unread_message_count(&state.db, user.0).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UnreadCountResponse { unread_count })))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/messages")
            .wrap(JwtAuthMiddleware)
            .route("/unread-count", web::get().to(get_unread_count)),
    );
}
