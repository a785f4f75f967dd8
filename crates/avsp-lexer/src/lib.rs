//! Incremental syntax classification for AviSynth scripts.
//!
//! Every byte of a script is assigned a [`SyntaxCategory`] and every line a
//! [`FoldState`]. Lexing works line by line: each line records the
//! [`LineState`] it was entered with, so [`Document::edit`] can restart at
//! the edited line and stop as soon as the lexer state converges with the
//! state stored for the unchanged lines that follow.
//!
//! ## Example
//!
//! ```
//! use avsp_lexer::{Document, Lexer, LexerOptions, SyntaxCategory};
//! use avsp_signatures::{FilterCategory, FilterEntry, Registry};
//!
//! let mut registry = Registry::new();
//! registry.upsert(FilterEntry::new("Blur", "(clip, float amount)", FilterCategory::Core));
//!
//! let lexer = Lexer::new(&registry, LexerOptions::default());
//! let document = Document::new(&lexer, "#comment\nBlur(1.5)");
//! assert_eq!(document.category_at(9), SyntaxCategory::CoreFilter);
//! ```

mod category;
mod document;
mod keywords;
mod lexer;
mod state;
mod tokens;

pub use category::SyntaxCategory;
pub use document::Document;
pub use document::EditError;
pub use document::EditSummary;
pub use keywords::reserved_words;
pub use lexer::Lexer;
pub use lexer::LexerOptions;
pub use state::Carry;
pub use state::FoldState;
pub use state::LineState;
pub use tokens::LexedLine;
pub use tokens::ModuleLoad;
pub use tokens::Token;
