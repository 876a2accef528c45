//! Time-bounded, owner-managed access authorization for off-chain data
//! assets.
//!
//! A single owner grants or revokes time-windowed access to subject
//! [`Address`]es, and anyone may ask whether a subject is authorized right
//! now. Two global URIs point at the asset's metadata document and at the
//! endpoint that serves its files.
//!
//! # Quick Example
//!
//! ```rust
//! use dax_registry::{Address, AuthorizationRegistry, EventLog, ManualClock, RegistryState, Timestamp};
//!
//! let owner: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
//! let reader: Address = "0x00000000000000000000000000000000000000bb".parse().unwrap();
//!
//! let registry = AuthorizationRegistry::new(
//!     RegistryState::new(owner, "ipfs://meta", "ipfs://data"),
//!     ManualClock::new(Timestamp::from_unix(1_500)),
//!     EventLog::default(),
//! );
//!
//! registry
//!     .grant_access(owner, reader, Timestamp::from_unix(1_000), Timestamp::from_unix(2_000))
//!     .unwrap();
//! assert!(registry.is_user_authorized(&reader));
//!
//! registry.revoke_access(owner, reader).unwrap();
//! assert!(!registry.is_user_authorized(&reader));
//! ```
//!
//! # Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`RegistryState`] | The state machine. Callers and evaluation times are explicit. |
//! | [`AuthorizationRegistry`] | Serializes writers, serves reads from immutable snapshots, reads time from a [`Clock`] and reports to an [`EventSink`]. |
//!
//! # Windows
//!
//! A grant carries an [`AccessWindow`]. A side set to zero is unbounded,
//! so `grant_access(owner, subject, 0, 0)` authorizes the subject forever.
//! No ordering is enforced between the two sides: an inverted window is
//! accepted and never admits any time.

mod address;
pub use address::*;

mod time;
pub use time::*;

mod window;
pub use window::*;

mod grant;
pub use grant::*;

mod error;
pub use error::*;

mod event;
pub use event::*;

mod state;
pub use state::*;

mod service;
pub use service::*;

mod config;
pub use config::*;
