use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::Repositories;

use crate::locks::KeyedLocks;

/// Shared state handed to every router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repositories: Repositories,
    pub booking_locks: Arc<KeyedLocks>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let repositories = Repositories::from_config(&config);
        Self::with_repositories(config, repositories)
    }

    pub fn with_repositories(config: AppConfig, repositories: Repositories) -> Self {
        Self {
            config: Arc::new(config),
            repositories,
            booking_locks: Arc::new(KeyedLocks::new()),
        }
    }
}
