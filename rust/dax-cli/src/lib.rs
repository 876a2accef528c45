//! # dax
//!
//! Operates a data access registry kept in a local ledger file, for
//! deployments without a ledger host. The ledger holds the registry state
//! and the journal of every grant and revoke event.
//!
//! ```bash
//! dax init --owner 0x00000000000000000000000000000000000000aa \
//!     --metadata-uri ipfs://meta --download-uri ipfs://data
//! dax grant --caller 0x00000000000000000000000000000000000000aa \
//!     0x00000000000000000000000000000000000000bb --start 1000 --end 2000
//! dax check 0x00000000000000000000000000000000000000bb --at 1500
//! ```
//!
//! Command output goes to stdout; logs go to stderr and follow `RUST_LOG`
//! or the `-v` flags.

mod cli;
pub use cli::*;

mod ledger;
pub use ledger::*;

mod command;
pub use command::*;
