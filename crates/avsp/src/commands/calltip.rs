use anyhow::Result;
use avsp_conf::Settings;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::ScriptInput;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Calltip {
    #[command(flatten)]
    input: ScriptInput,

    /// Byte offset of the cursor. Defaults to the end of the script.
    #[arg(long)]
    offset: Option<usize>,

    /// Also list literal values for the argument being typed.
    #[arg(long)]
    values: bool,
}

impl Command for Calltip {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let session = self.input.open(settings)?;
        let cursor = self
            .offset
            .unwrap_or_else(|| session.document().text().trim_end_matches('\n').len());

        let Some(tip) = session.calltip_at(cursor) else {
            let position = session.document().line_index().to_line_col(cursor);
            return Ok(Exit::error().with_message(format!(
                "No known call at offset {cursor} (line {}, column {}).",
                position.line() + 1,
                position.column() + 1
            )));
        };

        println!("{}", tip.text);
        if let Some(range) = tip.highlight {
            println!("{}{}", " ".repeat(range.start), "^".repeat(range.len()));
        }

        if self.values {
            for value in session.value_suggestions_at(cursor) {
                println!("{value}");
            }
        }

        Ok(Exit::success())
    }
}
