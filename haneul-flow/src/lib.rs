pub mod auth;
pub mod catalog;
pub mod catalog_flow;
pub mod config;
pub mod context;
pub mod error;
pub mod legacy_booking;
pub mod navigation;
pub mod notify;
pub mod outcome;
pub mod redirect;
pub mod storage;

// Re-export commonly used types
pub use auth::{AuthAction, AuthForm, AuthMode, AuthPage, PersonType, RegistrationField};
pub use catalog::{JsonCatalog, PackageCard, PackageRepository, StaticCatalog, TravelPackage};
pub use catalog_flow::{CatalogPage, CatalogPhase};
pub use config::FlowConfig;
pub use context::AppContext;
pub use error::{FlowError, Result, ValidationError};
pub use legacy_booking::{BookingAction, BookingConfirmation, BookingForm, CustomerType, ServiceKind};
pub use navigation::{Destination, NavigationLog, Navigator};
pub use notify::{Notification, NotificationLog, Notifier, Severity};
pub use outcome::SubmitOutcome;
pub use redirect::ScheduledRedirect;
pub use storage::{FileSessionStorage, InMemorySessionStorage, SessionContext, SessionStorage};
