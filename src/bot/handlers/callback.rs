use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{info, warn};

use super::HandlerResult;
use crate::bot::dialogue::{ChatState, ConversationSession};
use crate::bot::keyboards::{self, EDIT_CALLBACK_PREFIX};
use crate::bot::AppContext;

/// Handles the inline "✏️ Edit" buttons (`edit_<id>`): arms the edit flow
/// for the admin. Anyone else gets an explicit refusal instead of silence,
/// since a callback press expects an acknowledgement.
pub async fn callback_handler(bot: Bot, q: CallbackQuery, ctx: Arc<AppContext>) -> HandlerResult {
    let user_id = q.from.id.0 as i64;

    if !ctx.is_admin(user_id) {
        bot.answer_callback_query(q.id)
            .text("You are not allowed to manage reminders")
            .await?;
        return Ok(());
    }

    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    info!("Callback '{}' from admin {}", data, user_id);

    let Some(reminder_id) = data
        .strip_prefix(EDIT_CALLBACK_PREFIX)
        .and_then(|raw| raw.parse::<i64>().ok())
    else {
        warn!("Unrecognized callback data '{}'", data);
        bot.answer_callback_query(q.id)
            .text("Something went wrong")
            .await?;
        return Ok(());
    };

    // An explicit edit tap overrides any in-flight flow
    ctx.sessions.set(
        user_id,
        ConversationSession {
            state: ChatState::AwaitingEditChoice,
            pending_text: None,
            editing_reminder_id: Some(reminder_id),
        },
    );

    if let Some(message) = q.message.as_ref() {
        bot.send_message(
            message.chat.id,
            format!("What do you want to change in reminder #{reminder_id}?"),
        )
        .reply_markup(keyboards::edit_menu())
        .await?;
    }

    bot.answer_callback_query(q.id).await?;

    Ok(())
}
