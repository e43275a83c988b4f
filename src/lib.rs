pub mod api;
pub mod config;
pub mod db;
pub mod session;
pub mod urgency;

pub use db::DbPool;

use config::Config;
use session::{InMemorySessionStore, SessionStore};
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::new(config.auth.revoked_cache_limit));
        Self {
            config,
            db,
            sessions,
        }
    }

    /// Swap the revocation store, e.g. for a shared backing store when
    /// running multiple instances.
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }
}
