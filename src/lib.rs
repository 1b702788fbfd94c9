//! # Daily Poll Bot
//!
//! A Telegram bot that runs one timed poll in a group chat and then exits.
//!
//! ## Features
//! - Post a non-anonymous single-choice poll, optionally with an image
//! - Send a reminder shortly before the poll closes
//! - Close the poll, tally the votes and announce the winner or a tie
//! - Record every vote as it arrives, keyed by voter and poll
//! - Persistent storage with SQLite, degrading to no persistence when unavailable

/// Telegram client, update handlers and the vote listener
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Error taxonomy shared by every module
pub mod error;
/// The poll lifecycle: stages, timing, tally and messages
pub mod poll;
/// Vote recording, shutdown coordination, health checks
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
