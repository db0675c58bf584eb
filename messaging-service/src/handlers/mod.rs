pub mod conversations;
pub mod messages;

use serde::Deserialize;

/// Common `?page=&limit=` query shape
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
