//! Shared application state for the API server.

use std::sync::Arc;

use pilot_ledger_core::{LogService, Store};

use crate::auth::IdentityProvider;

/// State shared by every handler.
///
/// Generic over the store so the same router serves the `PostgreSQL`
/// backend in production and [`pilot_ledger_core::MemoryStore`] in tests.
pub struct AppState<S> {
    /// Log mutations, replay and direct store access.
    pub service: LogService<S>,
    /// Bearer token resolution.
    pub identity: Arc<dyn IdentityProvider>,
}

impl<S: Store> AppState<S> {
    /// Build state around a store and an identity provider.
    pub fn new(store: S, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            service: LogService::new(store),
            identity,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        self.service.store()
    }
}
