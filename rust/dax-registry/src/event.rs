//! Events emitted by committed mutations.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{Address, Timestamp};

/// A notification that a subject's grant changed.
///
/// These are the only signals external indexers get; URI changes are not
/// announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// A grant was written, including re-grants over an existing window.
    AccessGranted {
        /// Subject that received the grant.
        subject: Address,
        /// Start of the granted window.
        start: Timestamp,
        /// End of the granted window.
        end: Timestamp,
    },

    /// A grant was reset.
    AccessRevoked {
        /// Subject whose grant was reset.
        subject: Address,
    },
}

impl RegistryEvent {
    /// The subject the event is about.
    pub fn subject(&self) -> &Address {
        match self {
            Self::AccessGranted { subject, .. } | Self::AccessRevoked { subject } => subject,
        }
    }
}

/// Receives events, in commit order, after each committed mutation.
///
/// [`AuthorizationRegistry`](crate::AuthorizationRegistry) calls [`emit`]
/// while it still holds its writer lock. A sink must not call back into
/// the registry's mutating methods from `emit`; that deadlocks.
///
/// [`emit`]: EventSink::emit
pub trait EventSink: Send + Sync {
    /// Handle one event.
    fn emit(&self, event: &RegistryEvent);
}

impl EventSink for () {
    fn emit(&self, _event: &RegistryEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: &RegistryEvent) {
        (**self).emit(event)
    }
}

/// Publishes to live subscribers. Having no subscribers is fine.
impl EventSink for broadcast::Sender<RegistryEvent> {
    fn emit(&self, event: &RegistryEvent) {
        if self.send(event.clone()).is_err() {
            tracing::trace!("No subscribers for registry event");
        }
    }
}

/// An in-memory, append-only journal of events.
#[derive(Debug, Default)]
pub struct EventLog(Mutex<Vec<RegistryEvent>>);

impl EventLog {
    /// Copies every event recorded so far.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.0.lock().clone()
    }

    /// Removes and returns every event recorded so far.
    pub fn drain(&self) -> Vec<RegistryEvent> {
        std::mem::take(&mut *self.0.lock())
    }

    /// Number of events recorded and not yet drained.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &RegistryEvent) {
        self.0.lock().push(event.clone());
    }
}
