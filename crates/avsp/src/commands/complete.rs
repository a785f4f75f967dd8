use anyhow::Context;
use anyhow::Result;
use avsp_conf::Settings;
use avsp_ide::ScriptSession;
use camino::Utf8PathBuf;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Complete {
    /// Case-insensitive name prefix. Lists everything when empty.
    #[arg(default_value = "")]
    prefix: String,

    /// Script whose function definitions are offered too.
    #[arg(long)]
    script: Option<Utf8PathBuf>,
}

impl Command for Complete {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let text = match &self.script {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {path}"))?,
            None => String::new(),
        };
        let session = ScriptSession::from_settings(settings, text)
            .context("Failed to load filter definitions")?;

        let candidates = session.completion_candidates(&self.prefix);
        if candidates.is_empty() {
            return Ok(Exit::error().with_message(format!("No names start with {:?}.", self.prefix)));
        }
        for candidate in candidates {
            println!("{candidate}");
        }
        Ok(Exit::success())
    }
}
