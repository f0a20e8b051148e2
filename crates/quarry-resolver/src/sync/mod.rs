//! Sync-context abstraction: scoped shared/exclusive locking keyed by
//! artifact identity.
//!
//! This module provides:
//!
//! - [`SyncContext`]: a scoped acquisition over a set of artifact keys
//! - [`SyncContextFactory`]: trait for producing contexts per session
//! - [`memory::InMemorySyncContextFactory`]: in-process implementation
//!
//! ## Protocol
//!
//! A resolve call opens at most one context at a time: *shared* during
//! planning, and — only when downloads are required — *exclusive* for the
//! second pass. Escalation is close-then-reopen, never an upgrade: the
//! shared context is fully released before the exclusive one is acquired,
//! which guarantees no holder is ever inside the exclusive critical
//! section with state observed under a stale shared acquisition.
//!
//! Implementations must release all held keys when the context is dropped,
//! whatever exit path dropped it.

pub mod memory;

use async_trait::async_trait;

use quarry_core::session::Session;

/// Whether a context admits concurrent holders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Many concurrent holders, read-mostly work.
    Shared,
    /// One holder, cache-mutating work.
    Exclusive,
}

/// Raised when a context cannot acquire its keys.
#[derive(Debug, Clone, thiserror::Error)]
#[error("sync context error: {message}")]
pub struct SyncError {
    /// Description of the failure.
    pub message: String,
}

impl SyncError {
    /// Creates a sync error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A scoped shared or exclusive acquisition over artifact keys.
#[async_trait]
pub trait SyncContext: Send {
    /// Acquires the given keys in this context's mode, blocking until all
    /// are held.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] when acquisition fails; this is an
    /// infrastructure fault and aborts the resolve call.
    async fn acquire(&mut self, keys: &[String]) -> Result<(), SyncError>;

    /// Releases every held key. Also happens on drop; calling `close`
    /// first makes the release point explicit.
    fn close(&mut self);
}

/// Produces sync contexts coordinating resolvers against the same local
/// repository.
pub trait SyncContextFactory: Send + Sync {
    /// Creates a context in the given mode. No keys are held until
    /// [`SyncContext::acquire`] is called.
    fn new_context(&self, session: &Session, mode: AccessMode) -> Box<dyn SyncContext>;
}
