mod calltip;
mod complete;
mod functions;
mod lex;
mod preset;

use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use avsp_conf::Settings;
use avsp_ide::ScriptSession;
use camino::Utf8PathBuf;
use clap::Parser;
use clap::Subcommand;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args, settings: &Settings) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum AvspCommand {
    /// Print the syntax categories of a script
    Lex(self::lex::Lex),
    /// Show the calltip for the call at a byte offset
    Calltip(self::calltip::Calltip),
    /// List filter names and keywords starting with a prefix
    Complete(self::complete::Complete),
    /// Print the text inserted when a filter is picked from a list
    Preset(self::preset::Preset),
    /// List functions a script defines and modules it loads
    Functions(self::functions::Functions),
}

impl Command for AvspCommand {
    fn execute(&self, args: &Args, settings: &Settings) -> Result<Exit> {
        match self {
            Self::Lex(cmd) => cmd.execute(args, settings),
            Self::Calltip(cmd) => cmd.execute(args, settings),
            Self::Complete(cmd) => cmd.execute(args, settings),
            Self::Preset(cmd) => cmd.execute(args, settings),
            Self::Functions(cmd) => cmd.execute(args, settings),
        }
    }
}

/// A script read from a file, or from stdin when no path (or `-`) is given.
#[derive(Debug, Parser)]
pub struct ScriptInput {
    /// Script to read. Reads stdin when omitted or `-`.
    path: Option<Utf8PathBuf>,
}

impl ScriptInput {
    pub fn read(&self) -> Result<String> {
        match self.path.as_deref() {
            Some(path) if path.as_str() != "-" => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {path}")),
            _ => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("Failed to read stdin")?;
                Ok(source)
            }
        }
    }

    /// Read the script and open it in a session built from `settings`.
    pub fn open(&self, settings: &Settings) -> Result<ScriptSession> {
        let text = self.read()?;
        ScriptSession::from_settings(settings, text).context("Failed to load filter definitions")
    }
}
