//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::{AccountStore, ChatLog};
use crate::gateway::AiGateway;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything inside is fixed at startup;
/// configuration is consumed while building the parts and not kept here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    gateway: AiGateway,
    chat_log: Arc<dyn ChatLog>,
    accounts: Arc<dyn AccountStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        gateway: AiGateway,
        chat_log: Arc<dyn ChatLog>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                gateway,
                chat_log,
                accounts,
            }),
        }
    }

    /// AI gateway.
    #[must_use]
    pub fn gateway(&self) -> &AiGateway {
        &self.inner.gateway
    }

    /// Chat log store.
    #[must_use]
    pub fn chat_log(&self) -> &dyn ChatLog {
        self.inner.chat_log.as_ref()
    }

    /// Account store.
    #[must_use]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.inner.accounts.as_ref()
    }
}
