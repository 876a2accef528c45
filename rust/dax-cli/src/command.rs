use std::fmt::Write;

use anyhow::{Context, Result, bail};
use dax_metadata::AssetMetadata;
use dax_registry::{
    AuthorizationRegistry, Clock, EventLog, RegistryConfig, RegistryError, RegistryState,
    SystemClock, Timestamp,
};

use crate::{Command, DaxCli, LOCK_WAIT, Ledger, LedgerLock};

/// The registry a mutating command runs against.
type Session = AuthorizationRegistry<SystemClock, EventLog>;

/// Runs one command against the ledger named by `cli` and returns what it
/// prints.
///
/// Mutating commands hold the ledger lock from load to save and save the
/// ledger only when they succeed; a rejected command leaves the file as it
/// was.
pub fn run(cli: &DaxCli) -> Result<String> {
    let path = cli.state.as_path();

    match &cli.command {
        Command::Init {
            owner,
            metadata_uri,
            download_uri,
            config,
            force,
        } => {
            let mut config = match (config, owner) {
                (Some(config), _) => RegistryConfig::load(config)?,
                (None, Some(owner)) => RegistryConfig {
                    owner: *owner,
                    metadata_uri: String::new(),
                    download_uri: String::new(),
                },
                (None, None) => bail!("Either --owner or --config is required"),
            };
            if let Some(owner) = owner {
                config.owner = *owner;
            }
            if let Some(uri) = metadata_uri {
                config.metadata_uri = uri.clone();
            }
            if let Some(uri) = download_uri {
                config.download_uri = uri.clone();
            }

            let owner = config.owner;
            Ledger::new(config.into_state()).create(path, *force)?;
            tracing::info!(%owner, path = %path.display(), "Created ledger");
            Ok(format!("Created ledger owned by {owner}"))
        }

        Command::Owner => Ok(Ledger::load(path)?.registry.data_owner().to_string()),

        Command::Check { subject, at } => {
            let registry = Ledger::load(path)?.registry;
            let at = match at {
                Some(seconds) => Timestamp::from_unix(*seconds),
                None => SystemClock.now(),
            };
            Ok(registry.is_user_authorized(subject, at).to_string())
        }

        Command::Show { subject } => {
            let registry = Ledger::load(path)?.registry;
            Ok(serde_json::to_string_pretty(&registry.grant_of(subject))?)
        }

        Command::List => {
            let registry = Ledger::load(path)?.registry;
            let mut output = String::new();
            for (subject, grant) in registry.grants() {
                writeln!(
                    output,
                    "{subject} authorized={} window={}",
                    grant.authorized, grant.window
                )?;
            }
            Ok(output.trim_end().to_owned())
        }

        Command::Grant {
            caller,
            subject,
            start,
            end,
        } => {
            commit(cli, |session| {
                session.grant_access(
                    *caller,
                    *subject,
                    Timestamp::from_unix(*start),
                    Timestamp::from_unix(*end),
                )
            })?;
            Ok(format!("Granted {subject}"))
        }

        Command::Revoke { caller, subject } => {
            commit(cli, |session| session.revoke_access(*caller, *subject))?;
            Ok(format!("Revoked {subject}"))
        }

        Command::SetMetadataUri { caller, uri } => {
            commit(cli, |session| session.set_metadata_uri(*caller, uri.as_str()))?;
            Ok(format!("Metadata URI set to {uri}"))
        }

        Command::SetDownloadUri { caller, uri } => {
            commit(cli, |session| session.set_download_uri(*caller, uri.as_str()))?;
            Ok(format!("Download URI set to {uri}"))
        }

        Command::MetadataUri => Ok(Ledger::load(path)?.registry.metadata_uri().to_owned()),

        Command::DownloadUri => Ok(Ledger::load(path)?.registry.download_uri().to_owned()),

        Command::Events => {
            let ledger = Ledger::load(path)?;
            let mut output = String::new();
            for event in &ledger.events {
                writeln!(output, "{}", serde_json::to_string(event)?)?;
            }
            Ok(output.trim_end().to_owned())
        }

        Command::InspectMetadata { document } => {
            let registry = Ledger::load(path)?.registry;
            let bytes = std::fs::read(document)
                .with_context(|| format!("Failed to read '{}'", document.display()))?;
            let metadata = AssetMetadata::from_slice(&bytes)?;
            Ok(describe_conflicts(&metadata, &registry))
        }
    }
}

fn commit<F>(cli: &DaxCli, apply: F) -> Result<()>
where
    F: FnOnce(&Session) -> Result<(), RegistryError>,
{
    let path = cli.state.as_path();
    let _lock = LedgerLock::acquire(path, LOCK_WAIT)?;
    let Ledger {
        registry,
        mut events,
    } = Ledger::load(path)?;

    let session = Session::new(registry, SystemClock, EventLog::default());
    apply(&session)?;

    events.extend(session.events().drain());
    let ledger = Ledger {
        registry: RegistryState::clone(&session.snapshot()),
        events,
    };
    ledger.save(path)?;
    Ok(())
}

fn describe_conflicts(metadata: &AssetMetadata, registry: &RegistryState) -> String {
    let conflicts = metadata.conflicts_with_registry(registry);
    if conflicts.is_empty() {
        return format!("'{}' agrees with the registry", metadata.name);
    }

    let mut output = format!(
        "'{}' disagrees with the registry in {} way(s):",
        metadata.name,
        conflicts.len()
    );
    for conflict in conflicts {
        output.push_str("\n  - ");
        output.push_str(&conflict.to_string());
    }
    output
}
