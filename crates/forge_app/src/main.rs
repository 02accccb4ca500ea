use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use forge_app::app::{Notice, NoticeSink};
use forge_app::commands::{execute, Cli, Services};
use forge_app::providers;
use kv_store::FileStore;
use prompt_forge::{init_logging, EnvConfig, ForgeError};

/// Prints notices to stderr, keeping stdout for command output.
struct StderrNotices;

impl NoticeSink for StderrNotices {
    fn notify(&mut self, notice: Notice) {
        if notice.is_error() {
            eprintln!("error: {}", notice.message);
        } else {
            eprintln!("{}", notice.message);
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging();

    let config = EnvConfig::from_env();
    let gateway = providers::gateway_from_env(&config).map_err(anyhow::Error::msg)?;
    let storage_root = config.storage_root();
    tracing::debug!(
        gateway = gateway.gateway_id(),
        storage = %storage_root.display(),
        "starting prompt-forge"
    );

    let services = Services {
        gateway,
        store: Arc::new(FileStore::new(storage_root)),
    };

    let mut stdout = io::stdout().lock();
    match execute(cli.command, &services, &mut stdout, &mut StderrNotices) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) if error.downcast_ref::<ForgeError>().is_some() => Ok(ExitCode::FAILURE),
        Err(error) => Err(error),
    }
}
