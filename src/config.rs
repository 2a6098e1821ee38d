use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use std::env;

use crate::utils::validation;

const SECONDS_PER_HOUR: i32 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub admin_id: i64,
    pub database_url: String,
    pub http_port: u16,
    pub tz_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let admin_str = env::var("ADMIN_ID")
            .map_err(|_| anyhow!("ADMIN_ID must be set"))?;
        let admin_id: i64 = admin_str.trim()
            .parse()
            .map_err(|_| anyhow!("ADMIN_ID must be a numeric Telegram user id"))?;
        validation::validate_admin_id(admin_id).context("Invalid ADMIN_ID")?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/reminders.db".to_string());
        let database_url = if database_url.trim().is_empty() {
            "sqlite:./data/reminders.db".to_string()
        } else {
            database_url
        };

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        // All wall-clock times the admin enters are civil time in this
        // single fixed offset (UTC+3 unless overridden).
        let offset_str = env::var("TZ_OFFSET_HOURS")
            .unwrap_or_else(|_| "3".to_string());
        let offset_hours: i32 = offset_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid TZ_OFFSET_HOURS"))?;
        let tz_offset = offset_hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("TZ_OFFSET_HOURS out of range"))?;

        Ok(Config {
            telegram_bot_token: token,
            admin_id,
            database_url,
            http_port,
            tz_offset,
        })
    }
}
