//! Cancellation of in-flight ceremonies.
//!
//! Platforms reject overlapping WebAuthn calls, so ceremonies are serialized: starting one aborts
//! the one before it. [`CeremonyAbort`] holds the controller of the current ceremony and hands out
//! a fresh [`AbortSignal`] for every new one.
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::platform::{ErrorName, PlatformError};


/// Why a ceremony was aborted. Both reasons are reported under the name
/// [`ErrorName::AbortError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AbortReason {
    /// A new ceremony was started while this one was pending.
    #[error("Cancelling existing WebAuthn operation for new one")]
    Superseded,
    /// The ceremony was cancelled through [`CeremonyAbort::cancel_ceremony`].
    #[error("Manually cancelling existing WebAuthn operation")]
    Cancelled,
}

impl AbortReason {
    /// The error name the reason is reported under.
    pub fn name(&self) -> ErrorName {
        ErrorName::AbortError
    }
}

impl From<AbortReason> for PlatformError {
    fn from(reason: AbortReason) -> Self {
        PlatformError::new(reason.name(), reason.to_string())
    }
}

/// The sending half of a one-shot abort flag.
#[derive(Debug)]
pub struct AbortController {
    sender: watch::Sender<Option<AbortReason>>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    /// Create a controller that has not been aborted.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// A signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Abort with the given reason. Only the first call has an effect, returns whether this one
    /// did.
    pub fn abort(&self, reason: AbortReason) -> bool {
        self.sender.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    /// Whether [`Self::abort`] was called.
    pub fn is_aborted(&self) -> bool {
        self.sender.borrow().is_some()
    }
}

/// The observing half of an [`AbortController`]. Cheap to clone, every clone sees the same
/// flag.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    receiver: watch::Receiver<Option<AbortReason>>,
}

impl AbortSignal {
    /// Whether the controller was aborted.
    pub fn is_aborted(&self) -> bool {
        self.reason().is_some()
    }

    /// The reason the controller was aborted with, if it was.
    pub fn reason(&self) -> Option<AbortReason> {
        *self.receiver.borrow()
    }

    /// Wait until the controller is aborted.
    ///
    /// Never resolves if the controller is dropped without being aborted.
    pub async fn aborted(&self) -> AbortReason {
        if let Some(reason) = self.reason() {
            return reason;
        }
        let mut receiver = self.receiver.clone();
        let reason = match receiver.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        match reason {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }
}

/// The single slot holding the controller of the current ceremony.
///
/// A [`Client`](crate::Client) owns one, and clients that must not run ceremonies concurrently
/// can share one through an `Arc`.
#[derive(Debug, Default)]
pub struct CeremonyAbort {
    active: Mutex<Option<AbortController>>,
}

impl CeremonyAbort {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the ceremony currently holding the slot, if any, with
    /// [`AbortReason::Superseded`] and return the signal of a new controller taking its place.
    ///
    /// Call this before starting a new ceremony.
    pub fn create_abort_signal(&self) -> AbortSignal {
        let mut active = self.lock();
        if let Some(previous) = active.take() {
            if previous.abort(AbortReason::Superseded) {
                log::debug!("Superseding pending WebAuthn ceremony");
            }
        }
        let controller = AbortController::new();
        let signal = controller.signal();
        *active = Some(controller);
        signal
    }

    /// Abort the ceremony currently holding the slot with [`AbortReason::Cancelled`] and empty
    /// the slot. Does nothing when the slot is empty.
    pub fn cancel_ceremony(&self) {
        if let Some(controller) = self.lock().take() {
            if controller.abort(AbortReason::Cancelled) {
                log::debug!("Cancelled pending WebAuthn ceremony");
            }
        }
    }

    /// Whether the slot holds a controller. The controller of a ceremony stays in the slot after
    /// the ceremony completes, until it is replaced or cancelled.
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<AbortController>> {
        // A poisoned slot still holds a complete controller.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
