use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display fields of a conversation participant, joined from the user mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Preview of the most recent message, computed per request rather than
/// stored on the conversation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One entry in the caller's conversation list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub last_message: Option<LastMessage>,
    /// Messages in this conversation not sent by the caller and still unread
    pub unread_count: i64,
    /// Every participant of the conversation, the caller included
    pub participants: Vec<ParticipantProfile>,
}
