use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A broadcast recipient. One row per Telegram identity that has ever sent
/// the bot any input; rows are upserted on every message and never deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_interaction: DateTime<Utc>,
}
