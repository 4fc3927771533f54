use haneul_flow::{Destination, Navigator, Notification, Notifier, Severity};
use tracing::info;

/// Prints toasts to stdout.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let tag = match notification.severity {
            Severity::Neutral => "info",
            Severity::Success => "ok",
            Severity::Error => "erro",
        };
        match &notification.description {
            Some(description) => println!("[{tag}] {}: {description}", notification.title),
            None => println!("[{tag}] {}", notification.title),
        }
    }
}

/// Prints the route of every page change.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, destination: Destination) {
        info!(route = destination.route(), "Navigating");
        println!("-> {}", destination.route());
    }
}
