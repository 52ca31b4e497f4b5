//! Controller lock
//!
//! The controller only accepts state-changing commands from the session that
//! holds its lock. The local flag mirrors the remote state: it is set only on
//! an acknowledged `lock`, and always cleared by `unlock` whatever the
//! controller answers, so it can never stay stuck on.

use futures::future::BoxFuture;
use futures::FutureExt;
use lightpack_core::{verbs, Command};
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use crate::channel::CommandChannel;
use crate::error::{ClientError, Result};
use crate::session::Session;

/// Tracks whether this session holds the controller lock
#[derive(Debug, Default)]
pub struct LockManager {
    locked: bool,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Take the lock. No-op if already held.
    ///
    /// Returns the resulting lock state. A refusal phrased as a payload
    /// (`lock:busy`) yields `Ok(false)`; a bare error token is returned as
    /// the matching protocol error.
    pub async fn acquire(&mut self, channel: &mut CommandChannel) -> Result<bool> {
        if self.locked {
            return Ok(true);
        }

        let response = channel.execute(&Command::new(verbs::LOCK)).await?;
        self.locked = response.is_acknowledgement();

        if self.locked {
            debug!("Lock acquired");
        } else {
            debug!("Lock refused: {}", response);
        }

        Ok(self.locked)
    }

    /// Give the lock back. Returns `Ok(false)` without I/O if not held.
    ///
    /// The local flag is cleared before the outcome is inspected. Returns
    /// whether the controller acknowledged the unlock; controller error
    /// tokens are logged and reported as `Ok(false)`.
    pub async fn release(&mut self, channel: &mut CommandChannel) -> Result<bool> {
        if !self.locked {
            return Ok(false);
        }

        let result = channel.execute(&Command::new(verbs::UNLOCK)).await;
        self.locked = false;

        match result {
            Ok(response) if response.is_acknowledgement() => {
                debug!("Lock released");
                Ok(true)
            }
            Ok(response) => {
                warn!("Unlock not acknowledged: {}", response);
                Ok(false)
            }
            Err(ClientError::Protocol(e)) if e.is_rejection() => {
                warn!("Unlock rejected: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Forget the lock without talking to the controller
    pub(crate) fn reset(&mut self) {
        self.locked = false;
    }
}

impl Session {
    /// Acquire the controller lock
    pub async fn lock(&mut self) -> Result<bool> {
        let (lock, channel) = self.lock_parts()?;
        let result = lock.acquire(channel).await;
        self.observe(result)
    }

    /// Release the controller lock
    pub async fn unlock(&mut self) -> Result<bool> {
        if !self.is_locked() {
            return Ok(false);
        }
        let (lock, channel) = self.lock_parts()?;
        let result = lock.release(channel).await;
        self.observe(result)
    }

    /// Run `action` while holding the lock
    ///
    /// If the lock is already held the action runs as is and the lock is
    /// left alone. Otherwise the lock is taken first and released after the
    /// action finishes, whether it returned `Ok`, `Err`, or panicked. If the
    /// controller refuses the lock the action still runs, so callers see the
    /// controller's own answer to it (usually `not locked`), and nothing is
    /// released afterwards.
    ///
    /// Release cannot happen if the returned future is dropped before it
    /// completes, or if the process dies; the controller then keeps the lock
    /// until the connection closes.
    ///
    /// ```ignore
    /// session
    ///     .with_lock(|s| Box::pin(async move { s.execute(&cmd).await }))
    ///     .await?;
    /// ```
    pub async fn with_lock<T, F>(&mut self, action: F) -> Result<T>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T>>,
    {
        if self.is_locked() {
            return action(self).await;
        }

        if !self.lock().await? {
            debug!("Running action without the lock");
            return action(self).await;
        }

        let outcome = AssertUnwindSafe(action(self)).catch_unwind().await;

        if let Err(e) = self.unlock().await {
            warn!("Failed to release lock: {}", e);
        }

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
