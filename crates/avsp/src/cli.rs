use std::ffi::OsString;

use anyhow::Context;
use anyhow::Result;
use avsp_conf::Settings;
use camino::Utf8PathBuf;
use clap::Parser;

use crate::args::Args;
use crate::commands::AvspCommand;
use crate::commands::Command;
use crate::exit::Exit;
use crate::logging;

/// Inspect AviSynth scripts the way the editor sees them.
#[derive(Parser)]
#[command(name = "avsp")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: AvspCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments, load settings from the working directory and
/// execute the chosen command.
pub fn run<I, T>(args: I) -> Result<Exit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    let project_root = resolve_project_root()?;
    let settings = Settings::new(&project_root).context("Failed to load settings")?;

    let _guard = logging::init_tracing(cli.args.global.log_level(), settings.debug);
    tracing::debug!(root = %project_root, "settings loaded");

    cli.command.execute(&cli.args, &settings)
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}
