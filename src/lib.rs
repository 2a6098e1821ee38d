//! # Reminder Broadcast Bot
//!
//! A single-admin Telegram bot for broadcast reminders. The administrator
//! creates timestamped notes through a conversational menu; when a note
//! comes due, its text is sent to every user who has ever talked to the
//! bot, and the note is discarded.
//!
//! ## Features
//! - Menu-driven create / list / edit / delete flows for the admin
//! - 60-second delivery loop with a catch-up pass for missed reminders
//! - Best-effort broadcast to the full recipient registry
//! - Persistent storage with SQLite
//! - Health endpoints for deployment probes

/// Bot command handlers, keyboards, and the conversation state machine
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// The persistence store and its row models
pub mod database;
/// Background services: delivery scheduler, broadcaster, health server
pub mod services;
/// Utility functions for datetime parsing and validation
pub mod utils;
