//! Eventual-consistency confirmation engine
//!
//! A freshly created or mutated ledger resource is not immediately visible
//! to third parties; the service commits it in the background. Every client
//! operation that needs to observe the committed state funnels through one
//! polling loop:
//!
//! 1. Read the current representation of the resource
//! 2. Apply the terminal-state predicate; a terminal snapshot is returned
//! 3. Otherwise check the elapsed-time budget, giving up with a typed error
//!    once it is exhausted
//! 4. Sleep per the exponential backoff schedule and go again
//!
//! The per-resource differences live in [`Transition`]: which give-up error
//! is raised and whether a "not found" read means "not yet" (upload
//! confirmation) or is a real failure (everything else). The budget ceiling
//! is re-read on every check, so a client can lengthen or shorten a poll
//! that is already in flight.

pub mod backoff;
pub mod budget;

pub use backoff::BackoffPolicy;
pub use budget::BudgetSource;

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// The lifecycle transition a poll is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// An asset or subject becoming durably committed.
    Confirmation,
    /// An SBOM upload becoming readable at all.
    Upload,
    /// An SBOM gaining a publication date.
    Publication,
    /// An SBOM gaining a withdrawal date.
    Withdrawal,
}

impl Transition {
    /// Human-readable name, used in logs.
    pub fn describe(self) -> &'static str {
        match self {
            Transition::Confirmation => "confirmation",
            Transition::Upload => "upload",
            Transition::Publication => "publication",
            Transition::Withdrawal => "withdrawal",
        }
    }

    /// Upload confirmation reads a record that does not exist until the
    /// ingest completes, so "not found" means "not yet" there only.
    fn tolerates_not_found(self) -> bool {
        matches!(self, Transition::Upload)
    }

    fn give_up(self, identity: &str, elapsed: Duration) -> Error {
        let identity = identity.to_owned();
        match self {
            Transition::Confirmation => Error::ConfirmationTimeout { identity, elapsed },
            Transition::Upload => Error::UploadTimeout { identity, elapsed },
            Transition::Publication => Error::PublicationTimeout { identity, elapsed },
            Transition::Withdrawal => Error::WithdrawalTimeout { identity, elapsed },
        }
    }
}

/// Polls a remote resource until a caller-defined terminal state.
///
/// The engine owns no cross-poll state: every `poll` call keeps its own
/// start time and attempt counter. Concurrent polls of the same identity
/// proceed independently.
#[derive(Debug, Clone)]
pub struct ConfirmationEngine {
    backoff: BackoffPolicy,
    budget: BudgetSource,
    label: String,
}

impl ConfirmationEngine {
    /// Creates an engine from a backoff schedule, a time budget, and a
    /// descriptive label for the calling client (logs only).
    pub fn new(backoff: BackoffPolicy, budget: BudgetSource, label: impl Into<String>) -> Self {
        Self {
            backoff,
            budget,
            label: label.into(),
        }
    }

    /// Re-reads `identity` via `read` until `predicate` accepts a snapshot,
    /// which is then returned. Reads are strictly sequential.
    ///
    /// Reader errors terminate the poll unchanged, except a "not found"
    /// under [`Transition::Upload`], which counts as "not yet". Once the
    /// elapsed time reaches the budget ceiling the transition's timeout
    /// error is raised carrying the identity and the elapsed time. A
    /// cancellation signalled before a read or during a wait aborts with
    /// [`Error::Cancelled`] instead.
    pub async fn poll<T, R, Fut, P>(
        &self,
        identity: &str,
        transition: Transition,
        mut read: R,
        predicate: P,
        cancel: Option<&CancellationToken>,
    ) -> Result<T>
    where
        R: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&T) -> bool,
    {
        let started_at = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(Error::Cancelled {
                        identity: identity.to_owned(),
                    });
                }
            }

            match read().await {
                Ok(snapshot) if predicate(&snapshot) => return Ok(snapshot),
                Ok(_) => {}
                Err(e) if transition.tolerates_not_found() && e.is_not_found() => {}
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if !self.budget.has_capacity(started_at, now) {
                return Err(transition.give_up(identity, now.duration_since(started_at)));
            }

            let wait = self.backoff.next_wait(attempt);
            tracing::debug!(
                wait_secs = wait.as_secs_f64(),
                attempt,
                identity,
                caller = %self.label,
                "waiting for {}",
                transition.describe()
            );

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => {
                            return Err(Error::Cancelled {
                                identity: identity.to_owned(),
                            });
                        }
                        _ = time::sleep(wait) => {}
                    }
                }
                None => time::sleep(wait).await,
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Snapshot {
        state: &'static str,
    }

    fn engine(ceiling: Duration) -> ConfirmationEngine {
        let backoff =
            BackoffPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(10)).unwrap();
        ConfirmationEngine::new(backoff, BudgetSource::new(ceiling), "tests")
    }

    fn counting_reader(
        reads: &Arc<AtomicUsize>,
        mut outcome: impl FnMut(usize) -> Result<Snapshot>,
    ) -> impl FnMut() -> std::future::Ready<Result<Snapshot>> {
        let reads = Arc::clone(reads);
        move || {
            let n = reads.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(outcome(n))
        }
    }

    fn not_found() -> Error {
        Error::Api {
            status: 404,
            message: "no such record".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_snapshot_on_first_read_issues_no_waits() {
        let reads = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let snap = engine(Duration::from_secs(60))
            .poll(
                "sboms/0001",
                Transition::Publication,
                counting_reader(&reads, |_| Ok(Snapshot { state: "published" })),
                |s: &Snapshot| s.state == "published",
                None,
            )
            .await
            .unwrap();

        assert_eq!(snap.state, "published");
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_the_predicate_turns_terminal() {
        let reads = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let snap = engine(Duration::from_secs(60))
            .poll(
                "assets/0002",
                Transition::Confirmation,
                counting_reader(&reads, |n| {
                    Ok(Snapshot {
                        state: if n >= 3 { "confirmed" } else { "pending" },
                    })
                }),
                |s: &Snapshot| s.state == "confirmed",
                None,
            )
            .await
            .unwrap();

        assert_eq!(snap.state, "confirmed");
        assert_eq!(reads.load(Ordering::SeqCst), 3);
        // Two waits: 1s then 2s.
        assert_eq!(Instant::now().duration_since(start), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn budget_exhaustion_raises_the_transition_specific_error() {
        let reads = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let err = engine(Duration::from_secs(2))
            .poll(
                "assets/0003",
                Transition::Confirmation,
                counting_reader(&reads, |_| Ok(Snapshot { state: "pending" })),
                |s: &Snapshot| s.state == "confirmed",
                None,
            )
            .await
            .unwrap_err();

        // Reads at t=0, 1, 3; the capacity check fails at t=3.
        assert_eq!(reads.load(Ordering::SeqCst), 3);
        match err {
            Error::ConfirmationTimeout { identity, elapsed } => {
                assert_eq!(identity, "assets/0003");
                assert!(elapsed >= Duration::from_secs(2));
                assert_eq!(elapsed, Instant::now().duration_since(start));
            }
            other => panic!("expected confirmation timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn upload_tolerates_not_found_until_the_record_appears() {
        let reads = Arc::new(AtomicUsize::new(0));

        let snap = engine(Duration::from_secs(60))
            .poll(
                "sboms/0004",
                Transition::Upload,
                counting_reader(&reads, |n| {
                    if n <= 2 {
                        Err(not_found())
                    } else {
                        Ok(Snapshot { state: "uploaded" })
                    }
                }),
                |_| true,
                None,
            )
            .await
            .unwrap();

        assert_eq!(snap.state, "uploaded");
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_propagates_for_every_other_transition() {
        let reads = Arc::new(AtomicUsize::new(0));

        let err = engine(Duration::from_secs(60))
            .poll(
                "sboms/0005",
                Transition::Withdrawal,
                counting_reader(&reads, |_| Err(not_found())),
                |_: &Snapshot| true,
                None,
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_are_never_retried() {
        let reads = Arc::new(AtomicUsize::new(0));

        let err = engine(Duration::from_secs(60))
            .poll(
                "sboms/0006",
                Transition::Upload,
                counting_reader(&reads, |_| {
                    Err(Error::Api {
                        status: 500,
                        message: "backend unavailable".into(),
                    })
                }),
                |_: &Snapshot| true,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api { status: 500, .. }));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_a_wait_aborts_without_give_up() {
        let reads = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let reads = Arc::clone(&reads);
            let token = token.clone();
            async move {
                engine(Duration::from_secs(60))
                    .poll(
                        "assets/0007",
                        Transition::Confirmation,
                        counting_reader(&reads, |_| Ok(Snapshot { state: "pending" })),
                        |s: &Snapshot| s.state == "confirmed",
                        Some(&token),
                    )
                    .await
            }
        });

        // Cancel mid-way through the first 1s wait.
        time::sleep(Duration::from_millis(500)).await;
        token.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(Error::Cancelled { .. })));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn extending_the_ceiling_mid_poll_keeps_it_alive() {
        let reads = Arc::new(AtomicUsize::new(0));
        let budget = BudgetSource::new(Duration::from_secs(2));
        let backoff =
            BackoffPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(10)).unwrap();
        let engine = ConfirmationEngine::new(backoff, budget.clone(), "tests");

        let handle = tokio::spawn({
            let reads = Arc::clone(&reads);
            async move {
                engine
                    .poll(
                        "assets/0008",
                        Transition::Confirmation,
                        counting_reader(&reads, |n| {
                            Ok(Snapshot {
                                state: if n >= 4 { "confirmed" } else { "pending" },
                            })
                        }),
                        |s: &Snapshot| s.state == "confirmed",
                        None,
                    )
                    .await
            }
        });

        // The 2s ceiling would exhaust at the t=3 check; raise it first.
        time::sleep(Duration::from_millis(1_500)).await;
        budget.set_ceiling(Duration::from_secs(60));

        let snap = handle.await.unwrap().unwrap();
        assert_eq!(snap.state, "confirmed");
        assert_eq!(reads.load(Ordering::SeqCst), 4);
    }
}
