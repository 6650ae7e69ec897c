//! Shared fixtures: a temporary database plus in-memory chat and directory fakes.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;

use wolt_checker_bot::bot::gateway::{ChatGateway, OutgoingMessage};
use wolt_checker_bot::database::connection::DatabaseManager;
use wolt_checker_bot::directory::{DirectoryClient, LocalizedName, VenueStatus, VenueSummary};
use wolt_checker_bot::errors::{DirectoryError, GatewayError};

/// Helper function to create a migrated test database
pub async fn create_test_db() -> (DatabaseManager, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let db = DatabaseManager::new(&db_url)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    (db, temp_dir)
}

/// Everything a gateway was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { chat_id: i64, message: OutgoingMessage },
    Edit { chat_id: i64, message_id: i32, message: OutgoingMessage },
    Typing { chat_id: i64 },
    Ack { callback_id: String },
}

#[derive(Default)]
pub struct FakeGateway {
    sent: Mutex<Vec<Sent>>,
    unreachable: Mutex<HashSet<i64>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sends to this chat fail from now on.
    pub fn block(&self, chat_id: i64) {
        self.unreachable.lock().unwrap().insert(chat_id);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text and edited messages only, without typing indicators and acks.
    pub fn messages(&self) -> Vec<OutgoingMessage> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { message, .. } | Sent::Edit { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn last_message(&self) -> OutgoingMessage {
        self.messages().pop().expect("no message was sent")
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn check(&self, chat_id: i64) -> Result<(), GatewayError> {
        if self.unreachable.lock().unwrap().contains(&chat_id) {
            return Err(GatewayError::Transport(format!("chat {chat_id} blocked the bot")));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn send_message(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), GatewayError> {
        self.check(chat_id)?;
        self.sent.lock().unwrap().push(Sent::Message { chat_id, message });
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i32,
        message: OutgoingMessage,
    ) -> Result<(), GatewayError> {
        self.check(chat_id)?;
        self.sent.lock().unwrap().push(Sent::Edit {
            chat_id,
            message_id,
            message,
        });
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push(Sent::Typing { chat_id });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push(Sent::Ack {
            callback_id: callback_id.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    results: Mutex<HashMap<String, Vec<VenueSummary>>>,
    statuses: Mutex<HashMap<String, VenueStatus>>,
    broken: Mutex<HashSet<String>>,
    search_down: Mutex<bool>,
    gate: Mutex<Option<Arc<Notify>>>,
    status_calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_results(&self, query: &str, venues: Vec<VenueSummary>) {
        self.results.lock().unwrap().insert(query.to_string(), venues);
    }

    pub fn with_venue(&self, slug: &str, name: &str, online: bool) {
        self.statuses.lock().unwrap().insert(
            slug.to_string(),
            VenueStatus {
                online,
                names: vec![LocalizedName::new("en", name)],
                public_url: format!("https://wolt.com/en/isr/tel-aviv/restaurant/{slug}"),
            },
        );
    }

    /// Status lookups for this slug fail from now on.
    pub fn break_venue(&self, slug: &str) {
        self.broken.lock().unwrap().insert(slug.to_string());
    }

    pub fn take_search_down(&self) {
        *self.search_down.lock().unwrap() = true;
    }

    /// Status lookups wait until the returned handle is notified.
    pub fn hold_lookups(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

pub fn venue(slug: &str, name: &str) -> VenueSummary {
    VenueSummary {
        slug: slug.to_string(),
        names: vec![LocalizedName::new("en", name)],
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn search(&self, query: &str) -> Result<Vec<VenueSummary>, DirectoryError> {
        if *self.search_down.lock().unwrap() {
            return Err(DirectoryError::Status(503));
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_status(&self, slug: &str) -> Result<VenueStatus, DirectoryError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.broken.lock().unwrap().contains(slug) {
            return Err(DirectoryError::Status(500));
        }
        self.statuses
            .lock()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(slug.to_string()))
    }
}
