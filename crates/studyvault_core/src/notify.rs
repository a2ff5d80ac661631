//! User-facing notification hook.
//!
//! The vault reports events such as "folder created" through a `Notifier`;
//! delivery is the host's concern and is never awaited or checked.

use log::info;

/// Receiver of `(title, message)` notifications.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Writes notifications to the core log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, _message: &str) {
        // Message text can contain user item names; only the title is logged.
        info!("event=notify module=notify status=ok title={title}");
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _message: &str) {}
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, title: &str, message: &str) {
        (**self).notify(title, message);
    }
}
