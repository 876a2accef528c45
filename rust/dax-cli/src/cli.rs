use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dax_registry::Address;

#[derive(Debug, Parser)]
#[command(name = "dax")]
#[command(bin_name = "dax")]
#[command(about = "Grant, revoke and check time-windowed access to a data asset", long_about = None)]
pub struct DaxCli {
    /// Ledger file holding the registry state and its event journal.
    #[arg(long, global = true, env = "DAX_STATE", default_value = "dax-state.json")]
    pub state: PathBuf,

    /// Raise the log level (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new ledger.
    Init {
        /// The owner. Overrides the config file.
        #[arg(long)]
        owner: Option<Address>,

        /// Overrides the config file.
        #[arg(long)]
        metadata_uri: Option<String>,

        /// Overrides the config file.
        #[arg(long)]
        download_uri: Option<String>,

        /// JSON registry config to start from.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Replace an existing ledger.
        #[arg(long)]
        force: bool,
    },

    /// Print the owner.
    Owner,

    /// Print whether a subject is authorized.
    Check {
        subject: Address,

        /// Unix seconds to evaluate at, instead of now.
        #[arg(long)]
        at: Option<u64>,
    },

    /// Print a subject's grant record.
    Show { subject: Address },

    /// Print every subject record.
    List,

    /// Grant a subject access. Zero leaves a side of the window open.
    Grant {
        #[arg(long)]
        caller: Address,

        subject: Address,

        #[arg(long, default_value_t = 0)]
        start: u64,

        #[arg(long, default_value_t = 0)]
        end: u64,
    },

    /// Revoke a subject's access.
    Revoke {
        #[arg(long)]
        caller: Address,

        subject: Address,
    },

    /// Replace the metadata URI.
    SetMetadataUri {
        #[arg(long)]
        caller: Address,

        uri: String,
    },

    /// Replace the download URI.
    SetDownloadUri {
        #[arg(long)]
        caller: Address,

        uri: String,
    },

    /// Print the metadata URI.
    MetadataUri,

    /// Print the download URI.
    DownloadUri,

    /// Print the event journal as JSON lines.
    Events,

    /// Check a metadata document against the ledger.
    InspectMetadata { document: PathBuf },
}

impl DaxCli {
    /// The default log filter implied by `-v` flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
