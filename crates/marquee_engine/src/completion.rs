//! Single-shot completion signal for one step activation.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

struct Inner {
    step: String,
    activation: u64,
    sender: Mutex<Option<oneshot::Sender<()>>>,
    duplicates: Arc<AtomicU64>,
}

/// Handle a step uses to tell the scheduler it is finished.
///
/// Clones share one underlying signal. The first [`Completion::proceed`]
/// wakes the scheduler; later calls for the same activation are ignored
/// and counted as duplicates.
#[derive(Clone)]
pub struct Completion {
    inner: Arc<Inner>,
}

impl Completion {
    pub(crate) fn channel(
        step: impl Into<String>,
        activation: u64,
        duplicates: Arc<AtomicU64>,
    ) -> (Self, oneshot::Receiver<()>) {
        let (sender, receiver) = oneshot::channel();
        let completion = Self {
            inner: Arc::new(Inner {
                step: step.into(),
                activation,
                sender: Mutex::new(Some(sender)),
                duplicates,
            }),
        };
        (completion, receiver)
    }

    /// Signal that the activation is finished.
    ///
    /// Returns `true` if this call completed the activation and `false` if
    /// it had already been completed.
    pub fn proceed(&self) -> bool {
        let sender = self.inner.sender.lock().take();
        match sender {
            Some(sender) => {
                tracing::debug!(
                    step = %self.inner.step,
                    activation = self.inner.activation,
                    "Step signaled completion"
                );
                // The scheduler never drops its receiver before the signal.
                let _ = sender.send(());
                true
            }
            None => {
                self.inner.duplicates.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    step = %self.inner.step,
                    activation = self.inner.activation,
                    "Duplicate completion signal ignored"
                );
                false
            }
        }
    }

    /// Complete on behalf of a step that failed, without counting a duplicate.
    pub(crate) fn complete_implicitly(&self) -> bool {
        match self.inner.sender.lock().take() {
            Some(sender) => sender.send(()).is_ok(),
            None => false,
        }
    }

    /// Whether the activation has been completed.
    pub fn is_completed(&self) -> bool {
        self.inner.sender.lock().is_none()
    }

    /// Sequence number of the activation this handle belongs to.
    pub fn activation(&self) -> u64 {
        self.inner.activation
    }

    /// Name of the step this handle belongs to.
    pub fn step(&self) -> &str {
        &self.inner.step
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("step", &self.inner.step)
            .field("activation", &self.inner.activation)
            .field("completed", &self.is_completed())
            .finish()
    }
}
