//! The dispatch engine: one provider attempt per task, bounded fan-out,
//! per-task failure isolation.
//!
//! Each task moves Pending → InFlight → {Succeeded | Failed} exactly once:
//! a task is pending until it acquires a semaphore permit, in flight while
//! its spawned attempt holds the permit, and terminal once its outcome lands
//! on the aggregation channel. Terminal states are absorbing; there are no
//! retries and no skips.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

use super::DispatchConfig;
use crate::delivery::{DeliveryError, EmailSender, html_to_text};
use crate::models::{DispatchFailure, DispatchResult, SendTask};

/// Execute a batch of send tasks with bounded concurrency.
///
/// Guarantees, for every input including the empty batch:
/// - at most `config.max_in_flight` attempts are in flight at once;
/// - every task is attempted exactly once, and one task's failure never
///   aborts or delays its siblings;
/// - the result is returned only after every task has resolved, with
///   `sent + failed.len()` equal to the number of submitted tasks;
/// - `failed` reflects completion order, not submission order.
pub async fn dispatch_batch(
    sender: Arc<dyn EmailSender>,
    tasks: Vec<SendTask>,
    config: &DispatchConfig,
) -> DispatchResult {
    if tasks.is_empty() {
        return DispatchResult::default();
    }

    let total = tasks.len();
    let semaphore = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

    for task in tasks {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("dispatch semaphore is never closed");
        let sender = Arc::clone(&sender);
        let outcome_tx = outcome_tx.clone();

        tokio::spawn(async move {
            let outcome = attempt_send(sender.as_ref(), &task).await;
            drop(permit);
            let _ = outcome_tx.send((task.recipient, outcome));
        });
    }

    // Receiving ends once the last clone held by a worker is dropped.
    drop(outcome_tx);

    let mut sent = 0;
    let mut failed = Vec::new();

    while let Some((recipient, outcome)) = outcome_rx.recv().await {
        match outcome {
            Ok(()) => sent += 1,
            Err(error) => failed.push(DispatchFailure {
                recipient,
                error: error.to_string(),
            }),
        }
    }

    debug_assert_eq!(sent + failed.len(), total);

    log::info!(
        "dispatch complete: {} sent, {} failed of {} tasks",
        sent,
        failed.len(),
        total
    );

    DispatchResult { sent, failed }
}

/// One provider attempt for one task, with the plain-text fallback derived
/// from the HTML body.
async fn attempt_send(sender: &dyn EmailSender, task: &SendTask) -> Result<(), DeliveryError> {
    let html = &task.email_payload.html_content;
    let text = html_to_text(html);

    sender
        .send(
            task.recipient.trim(),
            &task.subject,
            Some(html.as_str()),
            Some(text.as_str()),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailPayload;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Sender that records in-flight concurrency and fails configured
    /// recipients.
    struct RecordingSender {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
        sent_to: Mutex<Vec<String>>,
        failing: Vec<String>,
    }

    impl RecordingSender {
        fn new(failing: &[&str]) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                sent_to: Mutex::new(Vec::new()),
                failing: failing.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[rocket::async_trait]
    impl EmailSender for RecordingSender {
        async fn send(
            &self,
            to: &str,
            _subject: &str,
            _html: Option<&str>,
            _text: Option<&str>,
        ) -> Result<(), DeliveryError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(10)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.sent_to.lock().push(to.to_string());

            if self.failing.iter().any(|recipient| recipient == to) {
                Err(DeliveryError::Provider(format!("rejected {to}")))
            } else {
                Ok(())
            }
        }
    }

    fn task(recipient: &str) -> SendTask {
        SendTask {
            email_payload: EmailPayload {
                subject: "Hello".to_string(),
                html_content: "<p>Hello</p>".to_string(),
            },
            recipient: recipient.to_string(),
            subject: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_batch_resolves_immediately_without_sends() {
        let sender = Arc::new(RecordingSender::new(&[]));
        let result =
            dispatch_batch(sender.clone(), Vec::new(), &DispatchConfig::default()).await;

        assert_eq!(result.sent, 0);
        assert!(result.failed.is_empty());
        assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sent_plus_failed_equals_task_count() {
        for size in [1usize, 4, 17] {
            let sender = Arc::new(RecordingSender::new(&["user3@x.se"]));
            let tasks: Vec<SendTask> =
                (0..size).map(|i| task(&format!("user{i}@x.se"))).collect();

            let result =
                dispatch_batch(sender.clone(), tasks, &DispatchConfig::default()).await;

            assert_eq!(result.sent + result.failed.len(), size);
            assert_eq!(sender.calls.load(Ordering::SeqCst), size);
        }
    }

    #[tokio::test]
    async fn in_flight_count_never_exceeds_ceiling() {
        let sender = Arc::new(RecordingSender::new(&[]));
        let tasks: Vec<SendTask> = (0..23).map(|i| task(&format!("user{i}@x.se"))).collect();

        let result = dispatch_batch(
            sender.clone(),
            tasks,
            &DispatchConfig { max_in_flight: 5 },
        )
        .await;

        assert_eq!(result.sent, 23);
        assert!(sender.max_in_flight.load(Ordering::SeqCst) <= 5);
    }

    #[tokio::test]
    async fn failures_identify_exactly_the_bad_recipients() {
        let sender = Arc::new(RecordingSender::new(&["user1@x.se", "user3@x.se"]));
        let tasks: Vec<SendTask> = (0..4).map(|i| task(&format!("user{i}@x.se"))).collect();

        let result = dispatch_batch(sender, tasks, &DispatchConfig::default()).await;

        assert_eq!(result.sent, 2);
        assert_eq!(result.failed.len(), 2);

        let mut failed: Vec<&str> = result
            .failed
            .iter()
            .map(|failure| failure.recipient.as_str())
            .collect();
        failed.sort();
        assert_eq!(failed, vec!["user1@x.se", "user3@x.se"]);

        for failure in &result.failed {
            assert!(failure.error.contains("rejected"));
        }
    }

    #[tokio::test]
    async fn every_task_is_attempted_exactly_once() {
        let sender = Arc::new(RecordingSender::new(&[]));
        let tasks: Vec<SendTask> = (0..12).map(|i| task(&format!("user{i}@x.se"))).collect();

        dispatch_batch(sender.clone(), tasks, &DispatchConfig::default()).await;

        let mut attempted = sender.sent_to.lock().clone();
        attempted.sort();
        let mut expected: Vec<String> = (0..12).map(|i| format!("user{i}@x.se")).collect();
        expected.sort();
        assert_eq!(attempted, expected);
    }
}
