pub mod conversation_service;
pub mod message_service;

pub use conversation_service::ConversationService;
pub use message_service::MessageService;

const MAX_PAGE_SIZE: i64 = 100;

/// Clamp raw pagination parameters and derive the row offset.
/// Returns (page, limit, offset) with page >= 1 and 1 <= limit <= 100.
pub fn page_params(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}
