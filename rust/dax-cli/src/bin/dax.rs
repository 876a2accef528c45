use anyhow::Result;
use clap::Parser;
use dax_cli::{DaxCli, run};
use tracing_subscriber::EnvFilter;

pub fn main() -> Result<()> {
    let cli = DaxCli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = run(&cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
