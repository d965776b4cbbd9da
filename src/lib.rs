//! Focusd - headless service for tracking focus/break working sessions
//!
//! This crate provides the core functionality for Focusd:
//! - Session lifecycle (start/end with at most one open session per owner)
//! - Time-bucketed usage stats (last 7 days by day, last 24 hours by hour)
//! - SQLite storage behind a store seam
//! - HTTP API for clients
//!
//! # Usage
//!
//! As a library (embedded in another process):
//! ```ignore
//! use focusd::{Config, Core};
//!
//! let config = Config::from_file("~/.focusd/config.toml").unwrap();
//! let core = Core::new(config).unwrap();
//! // core.start_api_server().await.unwrap();
//! ```
//!
//! As a standalone server (CLI):
//! ```text
//! focusd --config ~/.focusd/config.toml
//! ```

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod session;

// Re-export main types for convenience
pub use config::Config;
pub use db::Database;
pub use error::{CoreError, Result};

use std::sync::Arc;

use clock::{Clock, SystemClock};
use db::store::SqliteStore;
use session::lifecycle::SessionService;
use session::stats::StatsService;
use session::SessionStore;

/// Core service that wires configuration, storage, lifecycle and stats
pub struct Core {
    /// Configuration
    pub config: Config,

    /// Database connection
    pub db: Arc<Database>,

    sessions: Arc<SessionService>,
    stats: Arc<StatsService>,
}

impl Core {
    /// Create a new Core instance with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.data_dir().join("focusd.db");
        let db = Arc::new(Database::new(db_path)?);
        Ok(Self::wire(config, db))
    }

    /// Create a Core instance with an existing database (for embedding)
    pub fn with_database(config: Config, db: Arc<Database>) -> Self {
        Self::wire(config, db)
    }

    fn wire(config: Config, db: Arc<Database>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store: Arc<dyn SessionStore> = Arc::new(SqliteStore::new(db.clone()));
        let sessions = Arc::new(SessionService::new(store.clone(), clock.clone()));
        let stats = Arc::new(StatsService::new(store, clock, config.stats.timezone));

        Core {
            config,
            db,
            sessions,
            stats,
        }
    }

    /// Start the HTTP API server (blocks until shutdown)
    pub async fn start_api_server(&self) -> Result<()> {
        let addr = self.config.server_addr();
        tracing::info!("Starting API server on {}", addr);
        api::serve(addr, self.sessions.clone(), self.stats.clone(), &self.config).await
    }

    /// Get the session lifecycle manager
    pub fn sessions(&self) -> &Arc<SessionService> {
        &self.sessions
    }

    /// Get the stats aggregator
    pub fn stats(&self) -> &Arc<StatsService> {
        &self.stats
    }

    /// Get a reference to the database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}
