use anyhow::Context;
use anyhow::Result;
use avsp_conf::Settings;
use avsp_ide::ScriptSession;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Preset {
    /// Filter name, any case.
    name: String,
}

impl Command for Preset {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let session = ScriptSession::from_settings(settings, String::new())
            .context("Failed to load filter definitions")?;
        match session.default_invocation(&self.name) {
            Some(invocation) => Ok(Exit::success().with_message(invocation)),
            None => Ok(Exit::error().with_message(format!("Unknown filter {:?}.", self.name))),
        }
    }
}
