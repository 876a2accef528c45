use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AccessGrant, AccessWindow, Address, RegistryError, RegistryEvent, Timestamp};

/// The registry's state machine.
///
/// Holds the owner, every subject's [`AccessGrant`] and the two asset URIs.
/// Mutations name their caller and fail with
/// [`RegistryError::Unauthorized`] unless the caller is the owner. Reads
/// name the instant they are evaluated at.
///
/// This type does no locking. For shared use see
/// [`AuthorizationRegistry`](crate::AuthorizationRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    owner: Address,
    metadata_uri: String,
    download_uri: String,
    #[serde(default)]
    grants: BTreeMap<Address, AccessGrant>,
}

impl RegistryState {
    /// Creates a registry owned by `owner` with no grants.
    pub fn new(
        owner: Address,
        metadata_uri: impl Into<String>,
        download_uri: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            metadata_uri: metadata_uri.into(),
            download_uri: download_uri.into(),
            grants: BTreeMap::new(),
        }
    }

    /// The owner.
    pub fn data_owner(&self) -> Address {
        self.owner
    }

    /// Where the asset's metadata document lives.
    pub fn metadata_uri(&self) -> &str {
        &self.metadata_uri
    }

    /// Where the asset's data can be fetched.
    pub fn download_uri(&self) -> &str {
        &self.download_uri
    }

    /// The subject's current record, which is the default record for
    /// subjects that were never granted.
    pub fn grant_of(&self, subject: &Address) -> AccessGrant {
        self.grants.get(subject).copied().unwrap_or_default()
    }

    /// Every subject that has been granted or revoked, in address order.
    pub fn grants(&self) -> impl Iterator<Item = (&Address, &AccessGrant)> {
        self.grants.iter()
    }

    /// Returns `true` if `subject` is authorized at `at`.
    pub fn is_user_authorized(&self, subject: &Address, at: Timestamp) -> bool {
        let authorized = self.grant_of(subject).is_active_at(at);
        tracing::debug!(%subject, %at, authorized, "Checked authorization");
        authorized
    }

    /// Overwrites `subject`'s grant with one active from `start` to `end`.
    ///
    /// The previous window, if any, is discarded rather than merged. The
    /// window is not checked for `start <= end`; an inverted window is
    /// stored as given and never authorizes the subject.
    pub fn grant_access(
        &mut self,
        caller: Address,
        subject: Address,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<RegistryEvent, RegistryError> {
        self.ensure_owner(caller, "grant access")?;

        let window = AccessWindow::new(start, end);
        if window.is_inverted() {
            tracing::warn!(%subject, %start, %end, "Granted window ends before it starts");
        }

        self.grants.insert(subject, AccessGrant::granted(window));
        tracing::info!(%subject, %start, %end, "Access granted");

        Ok(RegistryEvent::AccessGranted {
            subject,
            start,
            end,
        })
    }

    /// Resets `subject`'s grant to the default record.
    ///
    /// The subject keeps its (reset) entry; nothing is removed from the key
    /// space.
    pub fn revoke_access(
        &mut self,
        caller: Address,
        subject: Address,
    ) -> Result<RegistryEvent, RegistryError> {
        self.ensure_owner(caller, "revoke access")?;

        self.grants.insert(subject, AccessGrant::REVOKED);
        tracing::info!(%subject, "Access revoked");

        Ok(RegistryEvent::AccessRevoked { subject })
    }

    /// Replaces the metadata URI. Any string is accepted.
    pub fn set_metadata_uri(
        &mut self,
        caller: Address,
        uri: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller, "set the metadata URI")?;
        self.metadata_uri = uri.into();
        tracing::info!(uri = %self.metadata_uri, "Metadata URI updated");
        Ok(())
    }

    /// Replaces the download URI. Any string is accepted.
    pub fn set_download_uri(
        &mut self,
        caller: Address,
        uri: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller, "set the download URI")?;
        self.download_uri = uri.into();
        tracing::info!(uri = %self.download_uri, "Download URI updated");
        Ok(())
    }

    fn ensure_owner(&self, caller: Address, operation: &str) -> Result<(), RegistryError> {
        if caller == self.owner {
            return Ok(());
        }
        tracing::warn!(%caller, owner = %self.owner, operation, "Rejected mutation from non-owner");
        Err(RegistryError::Unauthorized {
            caller,
            owner: self.owner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OWNER: Address = Address::new([0xaa; 20]);
    const READER: Address = Address::new([0xbb; 20]);
    const STRANGER: Address = Address::new([0xcc; 20]);

    fn at(seconds: u64) -> Timestamp {
        Timestamp::from_unix(seconds)
    }

    fn registry() -> RegistryState {
        RegistryState::new(OWNER, "ipfs://meta", "ipfs://data")
    }

    #[test]
    fn it_starts_with_nobody_authorized() {
        let registry = registry();
        assert_eq!(registry.data_owner(), OWNER);
        assert_eq!(registry.grants().count(), 0);
        assert!(!registry.is_user_authorized(&READER, at(0)));
        assert!(!registry.is_user_authorized(&OWNER, at(1_000)));
    }

    #[test]
    fn it_returns_the_event_it_should_emit() {
        let mut registry = registry();

        let granted = registry.grant_access(OWNER, READER, at(5), at(6)).unwrap();
        assert_eq!(
            granted,
            RegistryEvent::AccessGranted {
                subject: READER,
                start: at(5),
                end: at(6)
            }
        );

        let revoked = registry.revoke_access(OWNER, READER).unwrap();
        assert_eq!(revoked, RegistryEvent::AccessRevoked { subject: READER });
    }

    #[test]
    fn it_resets_all_fields_on_revoke() {
        let mut registry = registry();
        registry.grant_access(OWNER, READER, at(5), at(6)).unwrap();
        registry.revoke_access(OWNER, READER).unwrap();

        assert_eq!(registry.grant_of(&READER), AccessGrant::REVOKED);
        // The reset entry stays in the key space.
        assert_eq!(registry.grants().count(), 1);
    }

    #[test]
    fn it_revokes_subjects_that_were_never_granted() {
        let mut registry = registry();
        assert!(registry.revoke_access(OWNER, READER).is_ok());
        assert!(!registry.is_user_authorized(&READER, at(1)));
    }

    #[test]
    fn it_stores_inverted_windows_as_given() {
        let mut registry = registry();
        registry.grant_access(OWNER, READER, at(300), at(200)).unwrap();

        let grant = registry.grant_of(&READER);
        assert!(grant.authorized);
        assert!(grant.window.is_inverted());
        assert!(!registry.is_user_authorized(&READER, at(250)));
    }

    #[test]
    fn it_rejects_every_mutation_from_non_owners() {
        let mut registry = registry();
        registry.grant_access(OWNER, READER, at(0), at(0)).unwrap();
        let before = registry.clone();

        let expected = RegistryError::Unauthorized {
            caller: STRANGER,
            owner: OWNER,
        };
        assert_eq!(
            registry.grant_access(STRANGER, STRANGER, at(0), at(0)),
            Err(expected.clone())
        );
        assert_eq!(registry.revoke_access(STRANGER, READER), Err(expected.clone()));
        assert_eq!(registry.set_metadata_uri(STRANGER, "x"), Err(expected.clone()));
        assert_eq!(registry.set_download_uri(STRANGER, "y"), Err(expected));

        assert_eq!(registry, before);
    }

    #[test]
    fn it_accepts_any_uri_string() {
        let mut registry = registry();
        registry.set_metadata_uri(OWNER, "").unwrap();
        registry.set_download_uri(OWNER, "not a uri at all").unwrap();

        assert_eq!(registry.metadata_uri(), "");
        assert_eq!(registry.download_uri(), "not a uri at all");
    }

    #[test]
    fn it_round_trips_through_json() {
        let mut registry = registry();
        registry.grant_access(OWNER, READER, at(10), at(20)).unwrap();

        let json = serde_json::to_string(&registry).unwrap();
        let decoded: RegistryState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, registry);
    }
}
