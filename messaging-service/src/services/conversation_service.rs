use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ConversationSummary, LastMessage, ParticipantProfile};

pub struct ConversationService;

impl ConversationService {
    /// Canonical lookup key for the unordered pair {a, b}.
    /// The UNIQUE constraint on conversations.direct_key makes concurrent
    /// starts for the same pair converge on a single row.
    pub fn direct_key(a: Uuid, b: Uuid) -> String {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        format!("{lo}:{hi}")
    }

    /// Find or create the direct conversation between `caller` and `other`.
    /// Returns the conversation id and whether this call created it.
    pub async fn start_direct_conversation(
        db: &Pool<Postgres>,
        caller: Uuid,
        other: Uuid,
    ) -> Result<(Uuid, bool), AppError> {
        if caller == other {
            return Err(AppError::BadRequest(
                "cannot start a conversation with yourself".into(),
            ));
        }

        let key = Self::direct_key(caller, other);

        // Fast path: the pair already has a conversation.
        if let Some(row) = sqlx::query("SELECT id FROM conversations WHERE direct_key = $1")
            .bind(&key)
            .fetch_optional(db)
            .await?
        {
            return Ok((row.get("id"), false));
        }

        let candidate = Uuid::new_v4();
        let mut tx = db.begin().await?;

        // A concurrent start for the same pair may win the insert; the
        // conflict target makes this a no-op and the re-select below
        // observes the winner's row either way.
        sqlx::query(
            "INSERT INTO conversations (id, direct_key) VALUES ($1, $2) \
             ON CONFLICT (direct_key) DO NOTHING",
        )
        .bind(candidate)
        .bind(&key)
        .execute(&mut *tx)
        .await?;

        let id: Uuid = sqlx::query_scalar("SELECT id FROM conversations WHERE direct_key = $1")
            .bind(&key)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO conversation_participants (conversation_id, user_id) \
             VALUES ($1, $2), ($1, $3) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(caller)
        .bind(other)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((id, id == candidate))
    }

    pub async fn is_participant(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let rec = sqlx::query(
            "SELECT 1 FROM conversation_participants \
             WHERE conversation_id = $1 AND user_id = $2 LIMIT 1",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(rec.is_some())
    }

    /// List the caller's conversations as summaries, most recent first.
    ///
    /// The latest-message preview and unread count are computed per request
    /// via correlated subqueries; participants are fetched in one batched
    /// query over the page of conversation ids.
    pub async fn list_conversations(
        db: &Pool<Postgres>,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ConversationSummary>, bool), AppError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.created_at, c.last_message_at,
              (
                SELECT m.content FROM messages m
                WHERE m.conversation_id = c.id
                ORDER BY m.created_at DESC, m.seq DESC LIMIT 1
              ) AS last_message_content,
              (
                SELECT m.created_at FROM messages m
                WHERE m.conversation_id = c.id
                ORDER BY m.created_at DESC, m.seq DESC LIMIT 1
              ) AS last_message_created_at,
              (
                SELECT COUNT(*)::bigint FROM messages m
                WHERE m.conversation_id = c.id
                  AND m.sender_id <> $1 AND m.is_read = FALSE
              ) AS unread_count
            FROM conversations c
            JOIN conversation_participants cp ON c.id = cp.conversation_id
            WHERE cp.user_id = $1
            ORDER BY c.last_message_at DESC, c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let has_more = rows.len() as i64 == limit;

        if rows.is_empty() {
            return Ok((vec![], false));
        }

        let conversation_ids: Vec<Uuid> = rows.iter().map(|r| r.get("id")).collect();

        let participant_rows = sqlx::query(
            r#"
            SELECT cp.conversation_id, u.id AS user_id, u.display_name, u.email, u.avatar_url
            FROM conversation_participants cp
            JOIN users u ON u.id = cp.user_id
            WHERE cp.conversation_id = ANY($1)
            ORDER BY cp.joined_at ASC
            "#,
        )
        .bind(&conversation_ids)
        .fetch_all(db)
        .await?;

        let mut participants_map: HashMap<Uuid, Vec<ParticipantProfile>> = HashMap::new();
        for row in participant_rows {
            let conversation_id: Uuid = row.get("conversation_id");
            participants_map
                .entry(conversation_id)
                .or_default()
                .push(ParticipantProfile {
                    user_id: row.get("user_id"),
                    display_name: row.get("display_name"),
                    email: row.get("email"),
                    avatar_url: row.get("avatar_url"),
                });
        }

        let summaries = rows
            .into_iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                let last_message_content: Option<String> = row.get("last_message_content");
                let last_message_created_at: Option<DateTime<Utc>> =
                    row.get("last_message_created_at");
                let last_message = match (last_message_content, last_message_created_at) {
                    (Some(content), Some(created_at)) => Some(LastMessage {
                        content,
                        created_at,
                    }),
                    _ => None,
                };

                ConversationSummary {
                    id,
                    created_at: row.get("created_at"),
                    last_message_at: row.get("last_message_at"),
                    last_message,
                    unread_count: row.get("unread_count"),
                    participants: participants_map.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok((summaries, has_more))
    }

    /// Mark every message in the conversation not sent by `user_id` as read.
    /// Idempotent: already-read rows are untouched, so the transition is
    /// strictly false -> true.
    pub async fn mark_conversation_read(
        db: &Pool<Postgres>,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE \
             WHERE conversation_id = $1 AND sender_id <> $2 AND is_read = FALSE",
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Total unread messages addressed to `user_id` across all conversations
    pub async fn unread_message_count(
        db: &Pool<Postgres>,
        user_id: Uuid,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)::bigint
            FROM messages m
            JOIN conversation_participants cp
              ON cp.conversation_id = m.conversation_id AND cp.user_id = $1
            WHERE m.sender_id <> $1 AND m.is_read = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(
            ConversationService::direct_key(a, b),
            ConversationService::direct_key(b, a)
        );
    }

    #[test]
    fn direct_key_sorts_the_pair() {
        let a = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
        assert_eq!(
            ConversationService::direct_key(b, a),
            format!("{a}:{b}")
        );
    }

    #[test]
    fn direct_keys_differ_for_different_pairs() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_ne!(
            ConversationService::direct_key(a, b),
            ConversationService::direct_key(a, c)
        );
    }
}
