use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use super::conversation_service::ConversationService;
use crate::error::AppError;
use crate::models::{Message, MessageWithSender};

pub struct MessageService;

impl MessageService {
    /// Send a message into a conversation.
    ///
    /// The insert and the advance of conversations.last_message_at share one
    /// transaction and one timestamp, so the conversation list reorders in
    /// step with the message it previews.
    pub async fn send_message(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<MessageWithSender, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("message content cannot be empty".into()));
        }

        // Covers the nonexistent conversation as well: absent rows have no
        // participants, so the caller gets the same Forbidden either way.
        if !ConversationService::is_participant(db, conversation_id, sender_id).await? {
            return Err(AppError::Forbidden);
        }

        let id = Uuid::new_v4();
        let mut tx = db.begin().await?;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO messages (id, conversation_id, sender_id, content, is_read) \
             VALUES ($1, $2, $3, $4, FALSE) RETURNING created_at",
        )
        .bind(id)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET last_message_at = $2 WHERE id = $1")
            .bind(conversation_id)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let row = sqlx::query(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.content, m.is_read, m.created_at,
                   u.display_name AS sender_name, u.avatar_url AS sender_avatar_url
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(MessageWithSender {
            id: row.get("id"),
            conversation_id: row.get("conversation_id"),
            sender_id: row.get("sender_id"),
            sender_name: row.get("sender_name"),
            sender_avatar_url: row.get("sender_avatar_url"),
            content: row.get("content"),
            is_read: row.get("is_read"),
            created_at: row.get("created_at"),
        })
    }

    /// Page through a conversation's messages in send order.
    ///
    /// Side effect: every message in the conversation not sent by the caller
    /// is marked read. The rows returned reflect the read state visible at
    /// query time.
    pub async fn list_messages(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        caller: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Message>, bool), AppError> {
        if !ConversationService::is_participant(db, conversation_id, caller).await? {
            return Err(AppError::Forbidden);
        }

        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, sender_id, content, is_read, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, seq ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let has_more = rows.len() as i64 == limit;

        let messages = rows
            .into_iter()
            .map(|row| Message {
                id: row.get("id"),
                conversation_id: row.get("conversation_id"),
                sender_id: row.get("sender_id"),
                content: row.get("content"),
                is_read: row.get("is_read"),
                created_at: row.get("created_at"),
            })
            .collect();

        ConversationService::mark_conversation_read(db, conversation_id, caller).await?;

        Ok((messages, has_more))
    }
}
