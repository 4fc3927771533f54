use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Logical pages the flows can send the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    Home,
    Auth,
    Dashboard,
    Catalog,
    Terms,
}

impl Destination {
    /// Route name a host can map to its own URL scheme.
    pub fn route(&self) -> &'static str {
        match self {
            Destination::Home => "/",
            Destination::Auth => "/login",
            Destination::Dashboard => "/dashboard",
            Destination::Catalog => "/pacotes",
            Destination::Terms => "/termos",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

/// Navigator that records where the user was sent.
#[derive(Clone, Default)]
pub struct NavigationLog {
    history: Arc<Mutex<Vec<Destination>>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Destination> {
        self.history.lock().unwrap().clone()
    }

    pub fn current(&self) -> Option<Destination> {
        self.history.lock().unwrap().last().copied()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, destination: Destination) {
        self.history.lock().unwrap().push(destination);
    }
}
