use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Delays search evaluation until the input has been quiet for `delay`.
///
/// Every call to `input` cancels the pending evaluation and schedules a new one, so only the last
/// value of a burst is ever delivered. Must be used from within a tokio runtime.
pub struct SearchDebouncer {
  delay: Duration,
  sender: UnboundedSender<String>,
  pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
  #[must_use]
  pub fn new(delay: Duration, sender: UnboundedSender<String>) -> Self {
    Self {
      delay,
      sender,
      pending: None,
    }
  }

  /// Schedules `text` for evaluation, replacing anything still waiting.
  pub fn input(&mut self, text: String) {
    self.cancel();
    let delay = self.delay;
    let sender = self.sender.clone();
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      if sender.send(text).is_err() {
        log::debug!("Search receiver dropped, discarding debounced input");
      }
    }));
  }

  /// Drops the pending evaluation, if any.
  pub fn cancel(&mut self) {
    if let Some(pending) = self.pending.take() {
      pending.abort();
    }
  }

  /// Waits for the pending evaluation to run and deliver its value, without the delay being cut
  /// short. Returns at once when nothing is pending.
  pub async fn flush(&mut self) {
    let Some(pending) = self.pending.take() else {
      return;
    };
    if let Some(e) = pending.await.err().filter(|e| !e.is_cancelled()) {
      log::warn!("Debounced search failed: {e}");
    }
  }

  #[cfg(test)]
  fn is_pending(&self) -> bool {
    self.pending.as_ref().is_some_and(|p| !p.is_finished())
  }
}

impl Drop for SearchDebouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}
