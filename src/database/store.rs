use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tracing::{debug, error, info, warn};

use super::models::{Reminder, User};
use crate::utils::validation;

/// The single persistence component. All SQL lives here, together with the
/// failure policy: reminder creation propagates storage errors, while the
/// read/update/delete paths log and degrade (empty result or `false`) so
/// the scheduler loop and the conversation flow stay alive.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens the database, creating the file first if it does not exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", database_url);
            Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Records an identity as a broadcast recipient, refreshing its display
    /// metadata and interaction timestamp. Tracking is best-effort: storage
    /// failures are logged and reported as `false`, never propagated.
    pub async fn upsert_user(
        &self,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> bool {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT OR REPLACE INTO users (user_id, username, first_name, last_name, last_interaction) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to upsert user {}: {}", user_id, e);
                false
            }
        }
    }

    pub async fn get_user(&self, user_id: i64) -> Option<User> {
        let result = sqlx::query_as::<_, User>(
            "SELECT user_id, username, first_name, last_name, last_interaction \
             FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to fetch user {}: {}", user_id, e);
                None
            }
        }
    }

    /// Every known recipient id. A storage failure yields an empty list so
    /// delivery degrades instead of crashing the scheduler; the caller must
    /// treat "no recipients" as "do not discard the reminder yet".
    pub async fn list_user_ids(&self) -> Vec<i64> {
        let result = sqlx::query_scalar::<_, i64>("SELECT user_id FROM users")
            .fetch_all(&self.pool)
            .await;

        match result {
            Ok(ids) => ids,
            Err(e) => {
                error!("Failed to load broadcast recipients: {}", e);
                Vec::new()
            }
        }
    }

    /// Inserts a new reminder and returns its assigned id. Unlike the read
    /// paths this propagates storage errors: silently dropping a reminder
    /// the admin just typed is worse than showing an error.
    pub async fn create_reminder(
        &self,
        owner_id: i64,
        text: &str,
        due_at: DateTime<Utc>,
    ) -> Result<i64> {
        validation::validate_reminder_text(text)?;

        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO reminders (owner_id, text, due_at, created_at, is_sent) \
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(owner_id)
        .bind(text)
        .bind(due_at)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("failed to insert reminder")?;

        Ok(result.last_insert_rowid())
    }

    /// All unsent reminders with `due_at <= now`, soonest first.
    pub async fn due_reminders(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        let result = sqlx::query_as::<_, Reminder>(
            "SELECT id, owner_id, text, due_at, created_at, is_sent \
             FROM reminders WHERE is_sent = 0 AND due_at <= ? ORDER BY due_at",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(reminders) => reminders,
            Err(e) => {
                error!("Failed to fetch due reminders: {}", e);
                Vec::new()
            }
        }
    }

    /// Partial update of an unsent reminder; at least one field must be
    /// given. Returns `true` only when a row was actually changed, so an
    /// edit against a vanished reminder surfaces as a recoverable error.
    pub async fn update_reminder(
        &self,
        id: i64,
        text: Option<&str>,
        due_at: Option<DateTime<Utc>>,
    ) -> bool {
        if let Some(text) = text {
            if let Err(e) = validation::validate_reminder_text(text) {
                warn!("Rejected update of reminder {}: {}", id, e);
                return false;
            }
        }

        let result = match (text, due_at) {
            (Some(text), Some(due_at)) => {
                sqlx::query(
                    "UPDATE reminders SET text = ?, due_at = ? WHERE id = ? AND is_sent = 0",
                )
                .bind(text)
                .bind(due_at)
                .bind(id)
                .execute(&self.pool)
                .await
            }
            (Some(text), None) => {
                sqlx::query("UPDATE reminders SET text = ? WHERE id = ? AND is_sent = 0")
                    .bind(text)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
            (None, Some(due_at)) => {
                sqlx::query("UPDATE reminders SET due_at = ? WHERE id = ? AND is_sent = 0")
                    .bind(due_at)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
            (None, None) => {
                debug!("update_reminder {} called without fields", id);
                return false;
            }
        };

        match result {
            Ok(done) => done.rows_affected() > 0,
            Err(e) => {
                error!("Failed to update reminder {}: {}", id, e);
                false
            }
        }
    }

    /// Removes a reminder. `false` means nothing was removed, either
    /// because the row was already gone (success-equivalent for callers:
    /// the end state is the same) or because storage failed.
    pub async fn delete_reminder(&self, id: i64) -> bool {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => done.rows_affected() > 0,
            Err(e) => {
                error!("Failed to delete reminder {}: {}", id, e);
                false
            }
        }
    }

    /// The owner's reminders for listing, due soonest first; unsent rows
    /// sort before sent ones at equal times.
    pub async fn list_reminders_for(&self, owner_id: i64) -> Vec<Reminder> {
        let result = sqlx::query_as::<_, Reminder>(
            "SELECT id, owner_id, text, due_at, created_at, is_sent \
             FROM reminders WHERE owner_id = ? ORDER BY due_at ASC, is_sent ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(reminders) => reminders,
            Err(e) => {
                error!("Failed to list reminders for {}: {}", owner_id, e);
                Vec::new()
            }
        }
    }

    pub async fn pending_reminder_count(&self) -> i64 {
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reminders WHERE is_sent = 0")
                .fetch_one(&self.pool)
                .await;

        match result {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to count pending reminders: {}", e);
                0
            }
        }
    }
}
