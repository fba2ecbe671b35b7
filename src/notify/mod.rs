//! Notification boundary. The core produces structured events; how they
//! reach the user (desktop daemon, terminal, nothing) is a delivery concern
//! that lives behind the `Notifier` trait.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notification {
    pub(crate) title: String,
    pub(crate) body: String,
}

impl Notification {
    pub(crate) fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

pub(crate) trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Prints notifications to stdout. Stands in for the desktop delivery
/// collaborator when running from a terminal.
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        println!("[{}] {}", notification.title, notification.body);
    }
}

/// Collects notifications instead of delivering them.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) sent: std::cell::RefCell<Vec<Notification>>,
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.sent.borrow_mut().push(notification.clone());
    }
}
