use std::sync::Arc;

use crate::{
    catalog::{PackageRepository, StaticCatalog},
    config::FlowConfig,
    navigation::{Destination, Navigator},
    notify::{Notification, Notifier},
    storage::{InMemorySessionStorage, SessionContext, SessionStorage},
};

/// Collaborators handed to every page: the session flag, the notification and
/// navigation boundaries, and the package source.
#[derive(Clone)]
pub struct AppContext {
    pub session: SessionContext,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub catalog: Arc<dyn PackageRepository>,
    pub config: FlowConfig,
}

impl AppContext {
    pub fn new(
        config: FlowConfig,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session: SessionContext::new(storage, config.session_key.clone()),
            notifier,
            navigator,
            catalog: Arc::new(StaticCatalog::new()),
            config,
        }
    }

    /// Context with in-memory storage and default settings.
    pub fn in_memory(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(
            FlowConfig::default(),
            Arc::new(InMemorySessionStorage::new()),
            notifier,
            navigator,
        )
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn PackageRepository>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    pub fn navigate(&self, destination: Destination) {
        self.navigator.navigate(destination);
    }
}
