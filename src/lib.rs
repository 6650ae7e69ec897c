//! # Wolt Checker Bot
//!
//! A Telegram bot that checks whether a Wolt restaurant is open and, if it
//! is closed, notifies you once it reopens.
//!
//! ## Features
//! - Search the Wolt directory by restaurant name (English or Hebrew)
//! - Check a restaurant's current status and get an order link when open
//! - Register for a one-time reopening notification
//! - Review and remove registrations with /show
//! - Background notifier polling registered restaurants
//! - Persistent storage with SQLite

/// Bot commands, conversation engine and Telegram plumbing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Restaurant directory API client
pub mod directory;
/// Error types for each external collaborator
pub mod errors;
/// Background services: notifier and health checks
pub mod services;
/// Utility functions for timestamps, validation, and formatting
pub mod utils;
