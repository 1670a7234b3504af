//! Notifier that writes messages to the log instead of a chat service.

use log::info;

use crate::app::ports::{Notifier, NotifyError};

/// Logs every message and keeps a copy of what was sent.
#[derive(Debug, Default)]
pub struct LogNotifier {
    sent: Vec<(String, String)>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(destination, message)` pairs in send order.
    pub fn sent(&self) -> &[(String, String)] {
        &self.sent
    }
}

impl Notifier for LogNotifier {
    fn send(&mut self, message: &str, destination: &str) -> Result<(), NotifyError> {
        info!("NOTIFY | to={}\n{}", destination, message);
        self.sent.push((destination.to_owned(), message.to_owned()));
        Ok(())
    }
}
