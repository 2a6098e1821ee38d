use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, FixedOffset, Utc};

use crate::bot::keyboards;
use crate::utils::datetime;

/// Where a conversation stands. One flow at a time per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Idle,
    AwaitingText,
    AwaitingTime,
    AwaitingEditChoice,
    AwaitingEditText,
    AwaitingEditTime,
}

/// Volatile dialog state for one identity. Reminders themselves are
/// durable; losing this on restart only abandons a half-finished flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationSession {
    pub state: ChatState,
    pub pending_text: Option<String>,
    pub editing_reminder_id: Option<i64>,
}

/// Session storage keyed by Telegram user id. An explicit map rather than
/// one shared slot, so concurrent identities can never clobber each other.
#[derive(Clone, Default)]
pub struct SessionMap {
    inner: Arc<Mutex<HashMap<i64, ConversationSession>>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, ConversationSession>> {
        // A poisoned lock only means a handler panicked between two plain
        // writes; the map itself is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current session for an identity, defaulting to idle.
    pub fn get(&self, user_id: i64) -> ConversationSession {
        self.lock().get(&user_id).cloned().unwrap_or_default()
    }

    pub fn set(&self, user_id: i64, session: ConversationSession) {
        self.lock().insert(user_id, session);
    }

    /// Drops the identity's session, returning it to idle.
    pub fn reset(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }
}

/// What an inbound admin message means, resolved exactly once before
/// dispatch. Menu labels become tagged intents; everything else is free
/// text carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateReminder,
    ListReminders,
    Cancel,
    Home,
    EditText,
    EditTime,
    Delete,
    Text(String),
}

pub fn intent_of(text: &str) -> Intent {
    match text.trim() {
        keyboards::BTN_CREATE => Intent::CreateReminder,
        keyboards::BTN_LIST => Intent::ListReminders,
        keyboards::BTN_CANCEL => Intent::Cancel,
        keyboards::BTN_HOME => Intent::Home,
        keyboards::BTN_EDIT_TEXT => Intent::EditText,
        keyboards::BTN_EDIT_TIME => Intent::EditTime,
        keyboards::BTN_DELETE => Intent::Delete,
        _ => Intent::Text(text.to_string()),
    }
}

/// The effect of one transition, decided by [`next_step`] and executed by
/// the message handler (store writes, replies, session updates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Prompt for reminder text; move to AwaitingText.
    StartCreate,
    /// Render the reminder list; state unchanged.
    ShowList,
    /// Abort the create flow and return to the main menu.
    CancelFlow,
    /// Return to the main menu (also a benign reset from idle).
    GoHome,
    /// Remember the reminder text and prompt for the time.
    CaptureText(String),
    /// Insert the finished reminder.
    Create {
        text: String,
        due_at: DateTime<Utc>,
    },
    /// Entered time is already in the past; re-prompt, state unchanged.
    RejectPastTime,
    /// Entered time does not parse; re-prompt, state unchanged.
    RejectBadTime,
    /// Prompt for replacement text of the reminder under edit.
    ChooseEditText,
    /// Prompt for a replacement time of the reminder under edit.
    ChooseEditTime,
    /// Remove the reminder under edit.
    Delete(i64),
    /// Apply a text edit.
    UpdateText { id: i64, text: String },
    /// Apply a time edit.
    UpdateTime { id: i64, due_at: DateTime<Utc> },
    /// Edit action with no target reminder on file; report and reset.
    Desync,
    /// Input with no meaning in this state.
    Ignore,
}

/// The (state, intent) transition table. Pure: reads the session, writes
/// nothing, and touches no storage, so every row is directly testable.
pub fn next_step(
    session: &ConversationSession,
    intent: &Intent,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Step {
    match (session.state, intent) {
        (ChatState::Idle, Intent::CreateReminder) => Step::StartCreate,
        (ChatState::Idle, Intent::ListReminders) => Step::ShowList,
        (ChatState::Idle, Intent::Cancel | Intent::Home) => Step::GoHome,
        // Stale edit keyboard, e.g. from before a restart
        (ChatState::Idle, Intent::EditText | Intent::EditTime | Intent::Delete) => Step::Desync,
        (ChatState::Idle, Intent::Text(_)) => Step::Ignore,

        (ChatState::AwaitingText, Intent::Cancel) => Step::CancelFlow,
        // Any other input is the reminder text, menu labels included
        (ChatState::AwaitingText, intent) => Step::CaptureText(raw_text(intent)),

        (ChatState::AwaitingTime, Intent::Cancel) => Step::CancelFlow,
        (ChatState::AwaitingTime, intent) => {
            match (
                &session.pending_text,
                datetime::parse_user_datetime(&raw_text(intent), tz),
            ) {
                (None, _) => Step::Desync,
                (Some(_), Err(_)) => Step::RejectBadTime,
                (Some(_), Ok(due_at)) if due_at < now => Step::RejectPastTime,
                (Some(text), Ok(due_at)) => Step::Create {
                    text: text.clone(),
                    due_at,
                },
            }
        }

        (ChatState::AwaitingEditChoice, Intent::Cancel | Intent::Home) => Step::GoHome,
        (ChatState::AwaitingEditChoice, Intent::EditText) => {
            match session.editing_reminder_id {
                Some(_) => Step::ChooseEditText,
                None => Step::Desync,
            }
        }
        (ChatState::AwaitingEditChoice, Intent::EditTime) => {
            match session.editing_reminder_id {
                Some(_) => Step::ChooseEditTime,
                None => Step::Desync,
            }
        }
        (ChatState::AwaitingEditChoice, Intent::Delete) => {
            match session.editing_reminder_id {
                Some(id) => Step::Delete(id),
                None => Step::Desync,
            }
        }
        (ChatState::AwaitingEditChoice, _) => Step::Ignore,

        (ChatState::AwaitingEditText, Intent::Home) => Step::GoHome,
        (ChatState::AwaitingEditText, intent) => match session.editing_reminder_id {
            Some(id) => Step::UpdateText {
                id,
                text: raw_text(intent),
            },
            None => Step::Desync,
        },

        (ChatState::AwaitingEditTime, Intent::Home) => Step::GoHome,
        (ChatState::AwaitingEditTime, intent) => {
            match (
                session.editing_reminder_id,
                datetime::parse_user_datetime(&raw_text(intent), tz),
            ) {
                (None, _) => Step::Desync,
                (Some(_), Err(_)) => Step::RejectBadTime,
                (Some(_), Ok(due_at)) if due_at < now => Step::RejectPastTime,
                (Some(id), Ok(due_at)) => Step::UpdateTime { id, due_at },
            }
        }
    }
}

/// The literal message behind an intent, for states that consume input as
/// raw text (a tapped menu label is still just text there).
fn raw_text(intent: &Intent) -> String {
    match intent {
        Intent::Text(text) => text.clone(),
        Intent::CreateReminder => keyboards::BTN_CREATE.to_string(),
        Intent::ListReminders => keyboards::BTN_LIST.to_string(),
        Intent::Cancel => keyboards::BTN_CANCEL.to_string(),
        Intent::Home => keyboards::BTN_HOME.to_string(),
        Intent::EditText => keyboards::BTN_EDIT_TEXT.to_string(),
        Intent::EditTime => keyboards::BTN_EDIT_TIME.to_string(),
        Intent::Delete => keyboards::BTN_DELETE.to_string(),
    }
}
