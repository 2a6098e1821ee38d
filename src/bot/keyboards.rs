use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

// Reply-keyboard labels. These double as the admin's menu vocabulary, so
// intent resolution matches against them verbatim.
pub const BTN_CREATE: &str = "Create reminder";
pub const BTN_LIST: &str = "My reminders";
pub const BTN_CANCEL: &str = "Cancel";
pub const BTN_HOME: &str = "Back to menu";
pub const BTN_EDIT_TEXT: &str = "📝 Edit text";
pub const BTN_EDIT_TIME: &str = "🕒 Edit time";
pub const BTN_DELETE: &str = "🗑 Delete reminder";

/// Prefix of the per-reminder edit callback, followed by the reminder id.
pub const EDIT_CALLBACK_PREFIX: &str = "edit_";

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_CREATE)],
        vec![KeyboardButton::new(BTN_LIST)],
    ])
    .resize_keyboard(true)
}

pub fn cancel_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BTN_CANCEL)]]).resize_keyboard(true)
}

pub fn edit_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_EDIT_TEXT)],
        vec![KeyboardButton::new(BTN_EDIT_TIME)],
        vec![KeyboardButton::new(BTN_DELETE)],
        vec![KeyboardButton::new(BTN_HOME)],
    ])
    .resize_keyboard(true)
}

pub fn home_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BTN_HOME)]]).resize_keyboard(true)
}

/// Inline "edit" button attached to unsent reminders in the listing.
pub fn edit_button(reminder_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "✏️ Edit",
        format!("{EDIT_CALLBACK_PREFIX}{reminder_id}"),
    )]])
}
