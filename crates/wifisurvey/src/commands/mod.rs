//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod parse;
pub mod scan;
pub mod server;
pub mod survey;

use wifisurvey_core::{ShellRunner, SystemWifi};

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Resolved};
use crate::error::CliError;

/// Dispatch a command that needs the OS tools or the filesystem.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Survey => survey::handle(global).await,
        Command::Scan(args) => scan::handle(&args, global).await,
        Command::Parse(args) => parse::handle(&args, global),
        Command::CheckServer(args) => server::handle(&args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}

/// The platform adapter for this OS, with the profile's locale dictionaries.
pub(crate) fn system_wifi(resolved: &Resolved) -> Result<SystemWifi<ShellRunner>, CliError> {
    let localization = config::localization(resolved.locales_dir.as_deref())?;
    Ok(SystemWifi::detect(ShellRunner, localization)?)
}
