//! User-visible warning surface.

/// Fire-and-forget warnings shown to the user.
pub trait Notifier {
    fn warn(&mut self, message: &str);
}

/// Sends warnings to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn warn(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Queues warnings until the host drains them, e.g. into toasts.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    pending: Vec<String>,
}

impl QueuedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

impl Notifier for QueuedNotifier {
    fn warn(&mut self, message: &str) {
        self.pending.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains() {
        let mut notifier = QueuedNotifier::new();
        notifier.warn("one");
        notifier.warn("two");
        assert_eq!(notifier.pending().len(), 2);
        assert_eq!(notifier.drain(), vec!["one".to_string(), "two".to_string()]);
        assert!(notifier.pending().is_empty());
    }
}
