use anyhow::Result;
use avsp_conf::Settings;
use avsp_lexer::SyntaxCategory;
use clap::Parser;
use serde::Serialize;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::ScriptInput;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Lex {
    #[command(flatten)]
    input: ScriptInput,

    /// Print tokens as a JSON array.
    #[arg(long, conflicts_with = "folds")]
    json: bool,

    /// Print the fold level of each line instead of tokens.
    #[arg(long)]
    folds: bool,
}

#[derive(Serialize)]
struct LexedToken<'a> {
    line: u32,
    column: u32,
    start: usize,
    end: usize,
    category: SyntaxCategory,
    text: &'a str,
}

impl Command for Lex {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let session = self.input.open(settings)?;
        let document = session.document();
        let text = document.text();

        if self.folds {
            for (line, lexed) in document.lines().iter().enumerate() {
                let fold = lexed.fold;
                let header = if fold.is_header { " header" } else { "" };
                let blank = if fold.is_whitespace_only { " blank" } else { "" };
                println!("{line:>4} level={}{header}{blank}", fold.level);
            }
            return Ok(Exit::success());
        }

        let index = document.line_index();
        let tokens: Vec<LexedToken> = document
            .tokens()
            .map(|token| {
                let position = index.to_line_col(token.start());
                LexedToken {
                    line: position.line(),
                    column: position.column(),
                    start: token.start(),
                    end: token.end(),
                    category: token.category,
                    text: token.lexeme(text),
                }
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        } else {
            for token in &tokens {
                println!(
                    "{:>4}:{:<3} {}..{} {:?} {:?}",
                    token.line, token.column, token.start, token.end, token.category, token.text
                );
            }
        }

        Ok(Exit::success())
    }
}
