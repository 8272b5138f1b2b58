//! Best-effort outbound side effects.
//!
//! Notifications and scans are queued as [`OutboundTask`]s and handled by a
//! single worker task, separate from the admin action that produced them.
//! A failed delivery is retried with exponential backoff, then logged and
//! dropped. It never reaches the admin.
//!
//! Notifications are delivered one at a time, in enqueue order. Each scan
//! runs as its own task so a slow scan does not hold up email.

use std::sync::Arc;
use std::time::Duration;

use syllabusdb_core::SyllabusId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

use crate::messages::Notification;
use crate::notifier::Notifier;
use crate::scanner::{ScanCache, ScanResult, Scanner};

/// Retry policy for notification delivery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// A side effect to run after an admin action.
#[derive(Debug, Clone)]
pub enum OutboundTask {
    /// Email a user.
    Notify {
        /// Task id for log correlation.
        id: Uuid,
        /// What to send.
        notification: Notification,
    },
    /// Scan a syllabus PDF and cache the result.
    Scan {
        /// Task id for log correlation.
        id: Uuid,
        /// Cache key for the result.
        syllabus_id: SyllabusId,
        /// Public URL of the file.
        pdf_url: String,
    },
}

impl OutboundTask {
    /// A notification task with a fresh id.
    #[must_use]
    pub fn notify(notification: Notification) -> Self {
        Self::Notify {
            id: Uuid::new_v4(),
            notification,
        }
    }

    /// A scan task with a fresh id.
    #[must_use]
    pub fn scan(syllabus_id: SyllabusId, pdf_url: impl Into<String>) -> Self {
        Self::Scan {
            id: Uuid::new_v4(),
            syllabus_id,
            pdf_url: pdf_url.into(),
        }
    }
}

enum Command {
    Run(OutboundTask),
    Flush(oneshot::Sender<()>),
}

/// Handle for queueing outbound tasks. Cheap to clone.
#[derive(Clone)]
pub struct OutboundQueue {
    tx: mpsc::UnboundedSender<Command>,
    scans: Arc<ScanCache>,
}

impl OutboundQueue {
    /// Start the worker on the current tokio runtime.
    ///
    /// The worker stops once every queue handle is dropped and the backlog
    /// is drained.
    pub fn spawn(
        notifier: Arc<dyn Notifier>,
        scanner: Arc<dyn Scanner>,
        retry: RetryPolicy,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scans = Arc::new(ScanCache::new());

        let worker = Worker {
            notifier,
            scanner,
            retry,
            scans: Arc::clone(&scans),
        };
        let handle = tokio::spawn(worker.run(rx));

        (Self { tx, scans }, handle)
    }

    /// Queue a task. Returns immediately.
    pub fn enqueue(&self, task: OutboundTask) {
        if let OutboundTask::Scan { syllabus_id, .. } = &task {
            self.scans.insert(syllabus_id.clone(), ScanResult::Pending);
        }
        if self.tx.send(Command::Run(task)).is_err() {
            tracing::warn!("Outbound worker stopped, task dropped");
        }
    }

    /// Wait until every task queued before this call has settled.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Results of scans run by this queue.
    #[must_use]
    pub fn scan_cache(&self) -> &Arc<ScanCache> {
        &self.scans
    }
}

impl std::fmt::Debug for OutboundQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundQueue").finish_non_exhaustive()
    }
}

struct Worker {
    notifier: Arc<dyn Notifier>,
    scanner: Arc<dyn Scanner>,
    retry: RetryPolicy,
    scans: Arc<ScanCache>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        let mut running = JoinSet::new();

        while let Some(command) = rx.recv().await {
            // Reap finished scans so the set does not grow unbounded.
            while running.try_join_next().is_some() {}

            match command {
                Command::Run(OutboundTask::Notify { id, notification }) => {
                    self.deliver(id, &notification).await;
                }
                Command::Run(OutboundTask::Scan {
                    id,
                    syllabus_id,
                    pdf_url,
                }) => {
                    let scanner = Arc::clone(&self.scanner);
                    let scans = Arc::clone(&self.scans);
                    running.spawn(async move {
                        let result = match scanner.scan(&pdf_url).await {
                            Ok(verdict) => {
                                tracing::info!(
                                    task_id = %id,
                                    syllabus_id = %syllabus_id,
                                    malicious = verdict.malicious,
                                    suspicious = verdict.suspicious,
                                    "Scan complete"
                                );
                                ScanResult::Complete { verdict }
                            }
                            Err(e) => {
                                tracing::warn!(
                                    task_id = %id,
                                    syllabus_id = %syllabus_id,
                                    error = %e,
                                    "Scan failed"
                                );
                                ScanResult::Failed {
                                    error: e.to_string(),
                                }
                            }
                        };
                        scans.insert(syllabus_id, result);
                    });
                }
                Command::Flush(done) => {
                    while running.join_next().await.is_some() {}
                    let _ = done.send(());
                }
            }
        }

        while running.join_next().await.is_some() {}
        tracing::debug!("Outbound worker stopped");
    }

    async fn deliver(&self, id: Uuid, notification: &Notification) {
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.notifier.send(notification).await {
                Ok(()) => {
                    tracing::info!(task_id = %id, attempt, "Notification delivered");
                    return;
                }
                Err(e) if attempt < max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    tracing::debug!(
                        task_id = %id,
                        attempt,
                        error = %e,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Notification attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::warn!(
                        task_id = %id,
                        attempts = max_attempts,
                        error = %e,
                        "Giving up on notification"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ControlError, Result};
    use crate::scanner::{NoopScanner, ScanVerdict};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` sends, then records successes.
    #[derive(Default)]
    struct FlakyNotifier {
        failures: u32,
        attempts: AtomicU32,
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn send(&self, notification: &Notification) -> Result<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.failures {
                return Err(ControlError::Outbound("unavailable".to_string()));
            }
            self.sent.lock().push(notification.clone());
            Ok(())
        }
    }

    struct FixedScanner;

    #[async_trait]
    impl Scanner for FixedScanner {
        async fn scan(&self, _pdf_url: &str) -> Result<ScanVerdict> {
            Ok(ScanVerdict {
                harmless: 70,
                ..ScanVerdict::default()
            })
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        }
    }

    fn notification(n: u32) -> Notification {
        Notification {
            email: format!("u{n}@example.com"),
            subject: format!("subject {n}"),
            message: String::new(),
        }
    }

    #[test]
    fn backoff_grows_exponentially_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn delivers_in_order() {
        let notifier = Arc::new(FlakyNotifier::default());
        let (queue, _worker) =
            OutboundQueue::spawn(notifier.clone(), Arc::new(NoopScanner), fast_retry(3));

        for n in 0..5 {
            queue.enqueue(OutboundTask::notify(notification(n)));
        }
        queue.flush().await;

        let subjects: Vec<_> = notifier
            .sent
            .lock()
            .iter()
            .map(|n| n.subject.clone())
            .collect();
        assert_eq!(
            subjects,
            vec!["subject 0", "subject 1", "subject 2", "subject 3", "subject 4"]
        );
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let notifier = Arc::new(FlakyNotifier {
            failures: 2,
            ..FlakyNotifier::default()
        });
        let (queue, _worker) =
            OutboundQueue::spawn(notifier.clone(), Arc::new(NoopScanner), fast_retry(3));

        queue.enqueue(OutboundTask::notify(notification(1)));
        queue.flush().await;

        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(notifier.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let notifier = Arc::new(FlakyNotifier {
            failures: u32::MAX,
            ..FlakyNotifier::default()
        });
        let (queue, _worker) =
            OutboundQueue::spawn(notifier.clone(), Arc::new(NoopScanner), fast_retry(3));

        queue.enqueue(OutboundTask::notify(notification(1)));
        queue.flush().await;

        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 3);
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn scans_fill_the_cache() {
        let (queue, _worker) = OutboundQueue::spawn(
            Arc::new(FlakyNotifier::default()),
            Arc::new(FixedScanner),
            fast_retry(1),
        );
        let ok = SyllabusId::new("s1").unwrap();

        queue.enqueue(OutboundTask::scan(ok.clone(), "https://files/s1.pdf"));
        assert_eq!(queue.scan_cache().get(&ok), Some(ScanResult::Pending));

        queue.flush().await;
        assert!(matches!(
            queue.scan_cache().get(&ok),
            Some(ScanResult::Complete { verdict }) if verdict.harmless == 70
        ));
    }

    #[tokio::test]
    async fn failed_scan_is_cached_as_failure() {
        let (queue, _worker) = OutboundQueue::spawn(
            Arc::new(FlakyNotifier::default()),
            Arc::new(NoopScanner),
            fast_retry(1),
        );
        let id = SyllabusId::new("s1").unwrap();

        queue.enqueue(OutboundTask::scan(id.clone(), "https://files/s1.pdf"));
        queue.flush().await;

        assert!(matches!(
            queue.scan_cache().get(&id),
            Some(ScanResult::Failed { .. })
        ));
    }
}
