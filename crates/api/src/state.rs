use std::sync::Arc;

use dairy_cms_core::auth::AuthProvider;
use dairy_cms_core::form::FormController;
use dairy_cms_core::notify::ToastBus;
use dairy_cms_core::schema::EntityKind;
use dairy_cms_core::storage::ObjectStorage;
use dairy_cms_core::store::CollectionStore;

use crate::config::AppConfig;
use crate::session::SessionKeys;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: Arc<dyn CollectionStore>,
    storage: Arc<dyn ObjectStorage>,
    auth: Arc<dyn AuthProvider>,
    config: AppConfig,
    keys: SessionKeys,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        storage: Arc<dyn ObjectStorage>,
        auth: Arc<dyn AuthProvider>,
        config: AppConfig,
    ) -> Self {
        let keys = SessionKeys::new(&config.jwt_secret);
        Self {
            inner: Arc::new(InnerState {
                store,
                storage,
                auth,
                config,
                keys,
            }),
        }
    }

    pub fn store(&self) -> &dyn CollectionStore {
        self.inner.store.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.inner.keys
    }

    /// A fresh toast channel for one request.
    pub fn toast_bus(&self) -> ToastBus {
        ToastBus::new(self.inner.config.event_bus_capacity)
    }

    /// Form controller for `kind` reporting to `bus`.
    pub fn form(&self, kind: EntityKind, bus: &ToastBus) -> FormController {
        FormController::new(
            kind,
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.storage),
            Arc::new(bus.clone()),
        )
    }
}
