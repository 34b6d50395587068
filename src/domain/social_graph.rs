use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Directed follow edge: `from_id` follows `to_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Social {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub from_id: i64,
    pub to_id: i64,
}
