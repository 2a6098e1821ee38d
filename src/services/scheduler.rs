use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::database::Store;
use crate::services::broadcast::Broadcaster;

/// How often due reminders are looked for.
const POLL_INTERVAL: Duration = Duration::from_secs(60);

pub struct ReminderScheduler {
    store: Store,
    broadcaster: Broadcaster,
    scheduler: JobScheduler,
}

impl ReminderScheduler {
    pub async fn new(store: Store, broadcaster: Broadcaster) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            store,
            broadcaster,
            scheduler,
        })
    }

    /// Runs one catch-up pass for reminders that came due while the
    /// process was down, then starts the polling job.
    pub async fn start(&mut self) -> Result<()> {
        deliver_due_reminders(&self.store, &self.broadcaster, true).await;

        let store = self.store.clone();
        let broadcaster = self.broadcaster.clone();

        let poll_job = Job::new_repeated_async(POLL_INTERVAL, move |_uuid, _l| {
            let store = store.clone();
            let broadcaster = broadcaster.clone();
            Box::pin(async move {
                deliver_due_reminders(&store, &broadcaster, false).await;
            })
        })?;

        self.scheduler.add(poll_job).await?;
        self.scheduler.start().await?;

        info!(
            "Reminder scheduler started, polling every {} seconds",
            POLL_INTERVAL.as_secs()
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

/// One delivery pass. Every failure is absorbed and logged; nothing here
/// can take the polling loop down. A reminder is removed only after its
/// broadcast saw a non-empty recipient set, so a degraded registry read
/// postpones delivery instead of silently losing it. Duplicate deliveries
/// are possible if a removal fails; losing a reminder is not.
pub async fn deliver_due_reminders(store: &Store, broadcaster: &Broadcaster, missed: bool) {
    let now = Utc::now();
    let due = store.due_reminders(now).await;

    if due.is_empty() {
        return;
    }

    info!("{} reminder(s) due", due.len());

    for reminder in due {
        let text = broadcast_text(&reminder.text, missed);
        let outcome = broadcaster.broadcast(&text).await;

        if outcome.nobody_known() {
            warn!(
                "Keeping reminder {} until recipients are known",
                reminder.id
            );
            continue;
        }

        info!(
            "Reminder {} broadcast to {}/{} users",
            reminder.id, outcome.delivered, outcome.recipients
        );

        if !store.delete_reminder(reminder.id).await {
            error!(
                "Could not remove delivered reminder {}; it will be rebroadcast next tick",
                reminder.id
            );
        }
    }
}

/// The text every recipient receives. The catch-up pass marks deliveries
/// that are later than promised.
pub fn broadcast_text(reminder_text: &str, missed: bool) -> String {
    if missed {
        format!("🔔 Missed reminder!\n\n{reminder_text}")
    } else {
        format!("🔔 Reminder!\n\n{reminder_text}")
    }
}
