//! The shareable form of the registry.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::{
    Address, Clock, EventSink, RegistryError, RegistryEvent, RegistryState, SystemClock, Timestamp,
};

/// A registry that can be shared between threads.
///
/// Mutations are serialized by a single writer lock. Each one is applied
/// to a private copy of the current state, and only a successful mutation
/// publishes that copy as the new snapshot. Readers take the current
/// snapshot and evaluate against it, so they never see a half-applied
/// update and never wait on one.
///
/// The current time comes from `C`, and events from committed mutations go
/// to `E` after the snapshot that produced them is visible.
#[derive(Debug)]
pub struct AuthorizationRegistry<C = SystemClock, E = ()> {
    snapshot: RwLock<Arc<RegistryState>>,
    writer: Mutex<()>,
    clock: C,
    events: E,
}

impl AuthorizationRegistry {
    /// A registry on the wall clock that discards its events.
    pub fn with_state(state: RegistryState) -> Self {
        Self::new(state, SystemClock, ())
    }
}

impl<C, E> AuthorizationRegistry<C, E>
where
    C: Clock,
    E: EventSink,
{
    /// Wraps `state`, reading time from `clock` and sending events to
    /// `events`.
    pub fn new(state: RegistryState, clock: C, events: E) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(state)),
            writer: Mutex::new(()),
            clock,
            events,
        }
    }

    /// The most recently committed state.
    pub fn snapshot(&self) -> Arc<RegistryState> {
        self.snapshot.read().clone()
    }

    /// The clock authorization is evaluated against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The sink committed events go to.
    pub fn events(&self) -> &E {
        &self.events
    }

    /// The owner.
    pub fn data_owner(&self) -> Address {
        self.snapshot().data_owner()
    }

    /// Returns `true` if `subject` is authorized now.
    pub fn is_user_authorized(&self, subject: &Address) -> bool {
        self.snapshot().is_user_authorized(subject, self.clock.now())
    }

    /// The current metadata URI.
    pub fn metadata_uri(&self) -> String {
        self.snapshot().metadata_uri().to_owned()
    }

    /// The current download URI.
    pub fn download_uri(&self) -> String {
        self.snapshot().download_uri().to_owned()
    }

    /// See [`RegistryState::grant_access`].
    pub fn grant_access(
        &self,
        caller: Address,
        subject: Address,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<(), RegistryError> {
        self.commit(|state| state.grant_access(caller, subject, start, end).map(Some))
    }

    /// See [`RegistryState::revoke_access`].
    pub fn revoke_access(&self, caller: Address, subject: Address) -> Result<(), RegistryError> {
        self.commit(|state| state.revoke_access(caller, subject).map(Some))
    }

    /// See [`RegistryState::set_metadata_uri`].
    pub fn set_metadata_uri(
        &self,
        caller: Address,
        uri: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.commit(|state| state.set_metadata_uri(caller, uri).map(|_| None))
    }

    /// See [`RegistryState::set_download_uri`].
    pub fn set_download_uri(
        &self,
        caller: Address,
        uri: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.commit(|state| state.set_download_uri(caller, uri).map(|_| None))
    }

    fn commit<F>(&self, mutate: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut RegistryState) -> Result<Option<RegistryEvent>, RegistryError>,
    {
        let _writer = self.writer.lock();

        let mut next = RegistryState::clone(&self.snapshot());
        let event = mutate(&mut next)?;

        *self.snapshot.write() = Arc::new(next);
        tracing::debug!("Published registry snapshot");

        if let Some(event) = event {
            self.events.emit(&event);
        }
        Ok(())
    }
}
