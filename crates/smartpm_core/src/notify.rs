//! User-feedback seam.
//!
//! The core reports batch outcomes through [`Notifier`]; presentation
//! (toasts, banners, terminal output) lives behind implementations.

use log::{info, warn};

/// Feedback severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
}

impl NotifyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Fire-and-forget feedback sink.
pub trait Notifier {
    fn notify(&self, kind: NotifyKind, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, kind: NotifyKind, message: &str) {
        (**self).notify(kind, message)
    }
}

/// Notifier that only writes `event=notify` log lines.
///
/// Messages produced by the core never embed user-authored text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Success => info!(
                "event=notify module=notify status=ok kind={} message={}",
                kind.as_str(),
                message
            ),
            NotifyKind::Error => warn!(
                "event=notify module=notify status=error kind={} message={}",
                kind.as_str(),
                message
            ),
        }
    }
}
