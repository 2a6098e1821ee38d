use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::database::Store;

/// Upper bound on one delivery attempt, so a hung send cannot stall the
/// rest of the batch.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// The single outbound operation the core needs from the chat transport.
/// The scheduler and broadcaster only ever talk to this trait, so tests
/// can swap in a recording implementation.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, user_id: i64, text: &str) -> anyhow::Result<()>;
}

/// Production transport over the Telegram Bot API.
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, user_id: i64, text: &str) -> anyhow::Result<()> {
        self.bot.send_message(ChatId(user_id), text).await?;
        Ok(())
    }
}

/// What one broadcast did: how many recipients were known and how many
/// sends went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub recipients: usize,
    pub delivered: usize,
}

impl BroadcastOutcome {
    /// True when the recipient registry came back empty, which usually
    /// means a fresh or unreachable store rather than "deliver to no one".
    pub fn nobody_known(&self) -> bool {
        self.recipients == 0
    }
}

/// Best-effort fan-out of one message to every known user. Each send gets
/// its own bounded attempt; failures are logged per recipient and never
/// abort the batch.
#[derive(Clone)]
pub struct Broadcaster {
    store: Store,
    messenger: Arc<dyn Messenger>,
}

impl Broadcaster {
    pub fn new(store: Store, messenger: Arc<dyn Messenger>) -> Self {
        Self { store, messenger }
    }

    pub async fn broadcast(&self, text: &str) -> BroadcastOutcome {
        let user_ids = self.store.list_user_ids().await;
        let recipients = user_ids.len();

        if recipients == 0 {
            warn!("No recipients known; nothing to broadcast");
            return BroadcastOutcome {
                recipients: 0,
                delivered: 0,
            };
        }

        let mut delivered = 0;
        for user_id in user_ids {
            let attempt = self.messenger.send_text(user_id, text);
            match tokio::time::timeout(SEND_TIMEOUT, attempt).await {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => error!("Failed to deliver to user {}: {}", user_id, e),
                Err(_) => error!("Delivery to user {} timed out", user_id),
            }
        }

        info!("Broadcast delivered to {}/{} users", delivered, recipients);

        BroadcastOutcome {
            recipients,
            delivered,
        }
    }
}
