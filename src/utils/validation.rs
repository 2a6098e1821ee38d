use anyhow::{anyhow, Result};

pub fn validate_reminder_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(anyhow!("Reminder text cannot be empty"));
    }

    Ok(())
}

pub fn validate_admin_id(user_id: i64) -> Result<()> {
    // Telegram user ids are positive; zero or negative means a
    // misconfigured group/channel id
    if user_id <= 0 {
        return Err(anyhow!("Admin id must be a positive Telegram user id"));
    }

    Ok(())
}
