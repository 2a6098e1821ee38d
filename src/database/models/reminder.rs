use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scheduled broadcast. `due_at` and `created_at` are stored in UTC;
/// presentation in the configured civil offset happens at the edges.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub owner_id: i64,
    pub text: String,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_sent: bool,
}

impl Reminder {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.is_sent && self.due_at <= now
    }

    /// Status line shown in listings. Delivered reminders are normally
    /// deleted, but the sent state still renders if one is ever observed.
    pub fn status_label(&self) -> &'static str {
        if self.is_sent {
            "✅ Sent"
        } else {
            "⏳ Pending"
        }
    }
}
