pub mod commands;
pub mod dialogue;
pub mod handlers;
pub mod keyboards;

use crate::config::Config;
use crate::database::Store;
use dialogue::SessionMap;

/// Shared handler state, passed through the dispatcher's dependency map
/// instead of living in module globals.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub store: Store,
    pub sessions: SessionMap,
}

impl AppContext {
    pub fn new(config: Config, store: Store) -> Self {
        Self {
            config,
            store,
            sessions: SessionMap::new(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.config.admin_id
    }
}
