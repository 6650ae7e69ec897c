//! # Polling Notifier
//!
//! One pass reads every active registration, checks each distinct restaurant
//! once, and when it is open tells every waiting user and retires their
//! registration with [`RemovalReason::Notified`]. Restaurant checks and user
//! notifications run as independent tasks; one failure never aborts the pass.
//!
//! Passes are single-flight: a tick that fires while a pass is still running
//! is skipped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::bot::gateway::{ChatGateway, OutgoingMessage};
use crate::bot::messages;
use crate::database::connection::DatabaseManager;
use crate::database::models::{Registration, RemovalReason};
use crate::directory::{DirectoryClient, LanguagePreference};
use crate::errors::StoreError;
use crate::utils::logging::log_system_event;

/// Counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Active registrations read at the start of the pass
    pub registrations: usize,
    /// Distinct restaurants looked up
    pub restaurants_checked: usize,
    /// Restaurants found open
    pub restaurants_open: usize,
    /// Users who were sent the reopening message
    pub users_notified: usize,
    /// Restaurant lookups that failed
    pub lookup_failures: usize,
    /// Users whose message could not be delivered
    pub delivery_failures: usize,
    /// Users notified but left active because retiring failed
    pub store_failures: usize,
}

impl PassReport {
    fn merge(&mut self, other: PassReport) {
        self.registrations += other.registrations;
        self.restaurants_checked += other.restaurants_checked;
        self.restaurants_open += other.restaurants_open;
        self.users_notified += other.users_notified;
        self.lookup_failures += other.lookup_failures;
        self.delivery_failures += other.delivery_failures;
        self.store_failures += other.store_failures;
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} registrations, {} restaurants checked, {} open, {} users notified, \
             {} lookup failures, {} delivery failures, {} store failures",
            self.registrations,
            self.restaurants_checked,
            self.restaurants_open,
            self.users_notified,
            self.lookup_failures,
            self.delivery_failures,
            self.store_failures
        )
    }
}

/// The most recent completed pass.
#[derive(Debug, Clone, Serialize)]
pub struct LastPass {
    pub finished_at: DateTime<Utc>,
    pub report: PassReport,
}

enum Delivery {
    Retired,
    SendFailed,
    RetireFailed,
}

/// Resets the in-flight flag however the pass ends.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn ChatGateway>,
    directory: Arc<dyn DirectoryClient>,
    db: DatabaseManager,
    languages: LanguagePreference,
    in_flight: Arc<AtomicBool>,
    last_pass: Arc<Mutex<Option<LastPass>>>,
}

impl Notifier {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        directory: Arc<dyn DirectoryClient>,
        db: DatabaseManager,
        languages: LanguagePreference,
    ) -> Self {
        Self {
            gateway,
            directory,
            db,
            languages,
            in_flight: Arc::new(AtomicBool::new(false)),
            last_pass: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs a pass unless one is already in progress (`Ok(None)`).
    pub async fn try_run_pass(&self) -> Result<Option<PassReport>, StoreError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(None);
        }
        let _guard = InFlight(self.in_flight.clone());

        let report = self.run_pass().await?;
        *self.last_pass.lock().unwrap_or_else(|e| e.into_inner()) = Some(LastPass {
            finished_at: Utc::now(),
            report: report.clone(),
        });
        Ok(Some(report))
    }

    /// Outcome of the latest guarded pass, if one has finished.
    pub fn last_pass(&self) -> Option<LastPass> {
        self.last_pass
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// One full pass. Only failing to read the registrations is an error.
    pub async fn run_pass(&self) -> Result<PassReport, StoreError> {
        let active = Registration::list_all_active(&self.db.pool).await?;

        let mut report = PassReport {
            registrations: active.len(),
            ..PassReport::default()
        };

        if active.is_empty() {
            tracing::debug!("No active notifications to check");
            return Ok(report);
        }

        let mut by_slug: BTreeMap<String, BTreeSet<i64>> = BTreeMap::new();
        for registration in active {
            by_slug
                .entry(registration.slug)
                .or_default()
                .insert(registration.user_id);
        }

        tracing::debug!(
            "Checking {} restaurants for {} active notifications",
            by_slug.len(),
            report.registrations
        );

        let mut checks = JoinSet::new();
        for (slug, users) in by_slug {
            let notifier = self.clone();
            checks.spawn(async move { notifier.check_restaurant(slug, users).await });
        }

        while let Some(joined) = checks.join_next().await {
            match joined {
                Ok(partial) => report.merge(partial),
                Err(e) => {
                    tracing::error!("Restaurant check task failed: {}", e);
                    report.lookup_failures += 1;
                }
            }
        }

        Ok(report)
    }

    async fn check_restaurant(&self, slug: String, users: BTreeSet<i64>) -> PassReport {
        let mut report = PassReport {
            restaurants_checked: 1,
            ..PassReport::default()
        };

        let status = match self.directory.get_status(&slug).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Error checking restaurant {}: {}", slug, e);
                report.lookup_failures = 1;
                return report;
            }
        };

        if !status.online {
            return report;
        }
        report.restaurants_open = 1;

        let name = self.languages.resolve(&status.names);
        let text = messages::now_online(&name, &status.public_url);

        let mut deliveries = JoinSet::new();
        for user_id in users {
            let notifier = self.clone();
            let slug = slug.clone();
            let text = text.clone();
            deliveries.spawn(async move { notifier.notify_user(user_id, &slug, text).await });
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok(Delivery::Retired) => report.users_notified += 1,
                Ok(Delivery::RetireFailed) => {
                    report.users_notified += 1;
                    report.store_failures += 1;
                }
                Ok(Delivery::SendFailed) => report.delivery_failures += 1,
                Err(e) => {
                    tracing::error!("Notification task for {} failed: {}", slug, e);
                    report.delivery_failures += 1;
                }
            }
        }

        tracing::info!(
            "Restaurant {} is now online. Notified {} users.",
            name,
            report.users_notified
        );
        report
    }

    /// Sends first; the registration is retired only after a successful send.
    async fn notify_user(&self, user_id: i64, slug: &str, text: String) -> Delivery {
        if let Err(e) = self
            .gateway
            .send_message(user_id, OutgoingMessage::html(text))
            .await
        {
            tracing::error!("Error sending notification to user {}: {}", user_id, e);
            return Delivery::SendFailed;
        }

        match Registration::remove(&self.db.pool, user_id, slug, RemovalReason::Notified).await {
            Ok(_) => {
                tracing::info!("Notification sent to user {} for restaurant {}", user_id, slug);
                Delivery::Retired
            }
            Err(e) => {
                tracing::error!(
                    "User {} notified for {} but registration stays active: {}",
                    user_id,
                    slug,
                    e
                );
                Delivery::RetireFailed
            }
        }
    }

    /// Scheduler entry point: guarded pass plus logging.
    pub async fn tick(&self) {
        match self.try_run_pass().await {
            Ok(Some(report)) if report.registrations > 0 => {
                tracing::info!("Restaurant check completed: {}", report)
            }
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!("Previous restaurant check still running, skipping this tick"),
            Err(e) => tracing::error!("Error in notification pass: {}", e),
        }
    }
}

/// Runs [`Notifier::tick`] at start and then on a fixed interval.
pub struct NotifierService {
    notifier: Notifier,
    scheduler: JobScheduler,
    interval: Duration,
}

impl NotifierService {
    pub async fn new(
        notifier: Notifier,
        interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            notifier,
            scheduler,
            interval,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let first = self.notifier.clone();
        tokio::spawn(async move { first.tick().await });

        let notifier = self.notifier.clone();
        let job = Job::new_repeated_async(self.interval, move |_uuid, _l| {
            let notifier = notifier.clone();
            Box::pin(async move {
                notifier.tick().await;
            })
        })?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;

        log_system_event(
            "notifier_started",
            Some(&format!("checking restaurants every {}s", self.interval.as_secs())),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        log_system_event("notifier_stopped", None);
        Ok(())
    }

    // Manual trigger for testing
    pub async fn check_now(&self) -> Result<Option<PassReport>, StoreError> {
        self.notifier.try_run_pass().await
    }
}
