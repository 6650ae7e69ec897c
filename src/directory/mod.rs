//! Read-only access to the restaurant directory.

pub mod names;
pub mod wolt;

use async_trait::async_trait;

use crate::errors::DirectoryError;

pub use names::{LanguagePreference, LocalizedName, UNKNOWN_RESTAURANT};
pub use wolt::WoltDirectory;

/// A search candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueSummary {
    pub slug: String,
    pub names: Vec<LocalizedName>,
}

/// Current state of a single venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueStatus {
    pub online: bool,
    pub names: Vec<LocalizedName>,
    pub public_url: String,
}

/// Restaurant search and status lookup. Implementations do not retry.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Candidates for a free-text query, most relevant first.
    async fn search(&self, query: &str) -> Result<Vec<VenueSummary>, DirectoryError>;

    /// Whether the venue is open right now, with its names and public link.
    async fn get_status(&self, slug: &str) -> Result<VenueStatus, DirectoryError>;
}
