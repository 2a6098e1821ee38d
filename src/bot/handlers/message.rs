use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::User;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use super::HandlerResult;
use crate::bot::commands::Command;
use crate::bot::dialogue::{self, ChatState, ConversationSession, Step};
use crate::bot::keyboards;
use crate::bot::AppContext;
use crate::utils::datetime;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<AppContext>,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    track_user(&ctx, user).await;

    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            let user_id = user.id.0 as i64;
            if ctx.is_admin(user_id) {
                bot.send_message(
                    msg.chat.id,
                    "🔔 Hello! I broadcast your reminders to everyone who has talked to me.\n\n\
                     Use the menu below to create and manage them.",
                )
                .reply_markup(keyboards::main_menu())
                .await?;
            } else {
                bot.send_message(
                    msg.chat.id,
                    "🔔 Hello! I am a reminder bot. You will receive every reminder \
                     the administrator schedules.",
                )
                .await?;
            }
            info!("User {} started the bot", user_id);
        }
    }

    Ok(())
}

/// Menu and free-text input. Everything funnels through the dialogue
/// transition table; this function only executes the resulting step.
pub async fn message_handler(bot: Bot, msg: Message, ctx: Arc<AppContext>) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    track_user(&ctx, user).await;

    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = user.id.0 as i64;
    if !ctx.is_admin(user_id) {
        // Non-admin traffic only feeds the recipient registry
        debug!("Ignoring message from non-admin {}", user_id);
        return Ok(());
    }

    let intent = dialogue::intent_of(text);
    let session = ctx.sessions.get(user_id);
    let step = dialogue::next_step(&session, &intent, Utc::now(), ctx.config.tz_offset);
    debug!("Admin input in {:?} resolved to {:?}", session.state, step);

    run_step(&bot, &msg, &ctx, user_id, session, step).await
}

/// Registers the sender as a broadcast recipient. Runs before any
/// authorization check so every identity that ever wrote is known.
async fn track_user(ctx: &AppContext, user: &User) {
    ctx.store
        .upsert_user(
            user.id.0 as i64,
            user.username.as_deref(),
            Some(user.first_name.as_str()),
            user.last_name.as_deref(),
        )
        .await;
}

async fn run_step(
    bot: &Bot,
    msg: &Message,
    ctx: &AppContext,
    user_id: i64,
    mut session: ConversationSession,
    step: Step,
) -> HandlerResult {
    match step {
        Step::StartCreate => {
            ctx.sessions.set(
                user_id,
                ConversationSession {
                    state: ChatState::AwaitingText,
                    pending_text: None,
                    editing_reminder_id: None,
                },
            );
            bot.send_message(msg.chat.id, "Send me the reminder text.")
                .reply_markup(keyboards::cancel_menu())
                .await?;
        }
        Step::ShowList => {
            send_reminder_list(bot, msg, ctx, user_id).await?;
        }
        Step::CancelFlow => {
            ctx.sessions.reset(user_id);
            bot.send_message(msg.chat.id, "Cancelled.")
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Step::GoHome => {
            ctx.sessions.reset(user_id);
            bot.send_message(msg.chat.id, "Main menu.")
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Step::CaptureText(text) => {
            session.state = ChatState::AwaitingTime;
            session.pending_text = Some(text);
            ctx.sessions.set(user_id, session);
            let example = datetime::format_datetime(Utc::now(), ctx.config.tz_offset);
            bot.send_message(
                msg.chat.id,
                format!(
                    "Got it. Now send the date and time as day.month.year hour:minute.\n\n\
                     For example: {example}"
                ),
            )
            .reply_markup(keyboards::cancel_menu())
            .await?;
        }
        Step::Create { text, due_at } => {
            match ctx.store.create_reminder(user_id, &text, due_at).await {
                Ok(id) => {
                    ctx.sessions.reset(user_id);
                    let when = datetime::format_datetime(due_at, ctx.config.tz_offset);
                    info!("Created reminder {} due at {}", id, when);
                    bot.send_message(
                        msg.chat.id,
                        format!("✅ Reminder #{id} created!\n\n📝 Text: {text}\n⏰ Time: {when}"),
                    )
                    .reply_markup(keyboards::main_menu())
                    .await?;
                }
                Err(e) => {
                    // Session stays at the time step so the admin can retry
                    error!("Failed to create reminder: {}", e);
                    bot.send_message(
                        msg.chat.id,
                        "Something went wrong while saving the reminder. \
                         Send the time again, or press Cancel.",
                    )
                    .reply_markup(keyboards::cancel_menu())
                    .await?;
                }
            }
        }
        Step::RejectPastTime => {
            bot.send_message(
                msg.chat.id,
                "That time is already in the past. Send a future time:",
            )
            .reply_markup(keyboards::cancel_menu())
            .await?;
        }
        Step::RejectBadTime => {
            let example = datetime::format_datetime(Utc::now(), ctx.config.tz_offset);
            bot.send_message(
                msg.chat.id,
                format!(
                    "I could not read that as day.month.year hour:minute.\n\n\
                     For example: {example}"
                ),
            )
            .reply_markup(keyboards::cancel_menu())
            .await?;
        }
        Step::ChooseEditText => {
            session.state = ChatState::AwaitingEditText;
            ctx.sessions.set(user_id, session);
            bot.send_message(msg.chat.id, "Send the new reminder text.")
                .reply_markup(keyboards::home_menu())
                .await?;
        }
        Step::ChooseEditTime => {
            session.state = ChatState::AwaitingEditTime;
            ctx.sessions.set(user_id, session);
            let example = datetime::format_datetime(Utc::now(), ctx.config.tz_offset);
            bot.send_message(
                msg.chat.id,
                format!(
                    "Send the new date and time as day.month.year hour:minute.\n\n\
                     For example: {example}"
                ),
            )
            .reply_markup(keyboards::home_menu())
            .await?;
        }
        Step::Delete(id) => {
            ctx.sessions.reset(user_id);
            if !ctx.store.delete_reminder(id).await {
                // A row that was already gone is the same end state
                warn!("Delete of reminder {} removed nothing", id);
            }
            bot.send_message(msg.chat.id, "🗑 Reminder deleted.")
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Step::UpdateText { id, text } => {
            ctx.sessions.reset(user_id);
            if ctx.store.update_reminder(id, Some(&text), None).await {
                bot.send_message(msg.chat.id, "✅ Reminder text updated.")
                    .reply_markup(keyboards::main_menu())
                    .await?;
            } else {
                bot.send_message(
                    msg.chat.id,
                    "Could not update that reminder. It may have been sent or deleted already.",
                )
                .reply_markup(keyboards::main_menu())
                .await?;
            }
        }
        Step::UpdateTime { id, due_at } => {
            ctx.sessions.reset(user_id);
            let when = datetime::format_datetime(due_at, ctx.config.tz_offset);
            if ctx.store.update_reminder(id, None, Some(due_at)).await {
                bot.send_message(msg.chat.id, format!("✅ Reminder time updated to {when}."))
                    .reply_markup(keyboards::main_menu())
                    .await?;
            } else {
                bot.send_message(
                    msg.chat.id,
                    "Could not update that reminder. It may have been sent or deleted already.",
                )
                .reply_markup(keyboards::main_menu())
                .await?;
            }
        }
        Step::Desync => {
            ctx.sessions.reset(user_id);
            warn!("Session for {} lost its target; resetting", user_id);
            bot.send_message(
                msg.chat.id,
                "I lost track of that conversation. Back to the main menu.",
            )
            .reply_markup(keyboards::main_menu())
            .await?;
        }
        Step::Ignore => {}
    }

    Ok(())
}

async fn send_reminder_list(
    bot: &Bot,
    msg: &Message,
    ctx: &AppContext,
    owner_id: i64,
) -> HandlerResult {
    let reminders = ctx.store.list_reminders_for(owner_id).await;

    if reminders.is_empty() {
        bot.send_message(msg.chat.id, "You have no reminders yet.")
            .reply_markup(keyboards::main_menu())
            .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "📋 Your reminders:")
        .reply_markup(keyboards::main_menu())
        .await?;

    for reminder in reminders {
        let when = datetime::format_datetime(reminder.due_at, ctx.config.tz_offset);
        let card = format!(
            "📌 Reminder #{}\n📝 Text: {}\n⏰ Time: {}\n📬 Status: {}",
            reminder.id,
            reminder.text,
            when,
            reminder.status_label(),
        );

        let mut request = bot.send_message(msg.chat.id, card);
        if !reminder.is_sent {
            request = request.reply_markup(keyboards::edit_button(reminder.id));
        }
        request.await?;
    }

    Ok(())
}
