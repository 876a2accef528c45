use thiserror::Error;

use crate::Address;

/// Errors returned by registry mutations.
///
/// A rejected mutation leaves the registry exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The caller is not the owner.
    #[error("Not authorized: caller '{caller}' is not the data owner '{owner}'")]
    Unauthorized {
        /// Identity that attempted the mutation.
        caller: Address,
        /// The registry's owner.
        owner: Address,
    },
}
