use anyhow::Result;
use avsp_conf::Settings;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::ScriptInput;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Functions {
    #[command(flatten)]
    input: ScriptInput,
}

impl Command for Functions {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let session = self.input.open(settings)?;

        for function in session.script_functions() {
            println!("function {}{}", function.name, function.signature);
        }
        for load in session.module_loads() {
            println!("{} {:?}", load.function, load.path);
        }

        Ok(Exit::success())
    }
}
