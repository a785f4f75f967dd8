use serde::Serialize;

/// The construct a line starts inside of, carried over from the line before.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Carry {
    #[default]
    None,
    /// `c_style` is a `/* */` comment; otherwise the comment was opened by
    /// `[*`. `nesting` counts open `[* *]` pairs.
    BlockComment { c_style: bool, nesting: u32 },
    TripleString,
    /// Past the end-of-script marker.
    EndOfFile,
}

/// Lexer state at a line boundary.
///
/// Lexing a line is a pure function of its text and its entry state, so any
/// line start is a valid restart point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LineState {
    pub carry: Carry,
    /// Open `(` not yet closed, across continued lines. Dropped at the start
    /// of a new statement.
    pub paren_depth: u32,
    /// Open braces and multi-line block comments.
    pub fold_depth: u32,
    /// A module-loading call whose quoted argument has not been seen yet.
    pub pending_module: Option<String>,
    /// The line's last code character is `\`, so the next line continues
    /// the same statement.
    pub continues: bool,
}

/// Folding information for one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FoldState {
    pub level: u32,
    pub is_header: bool,
    pub is_whitespace_only: bool,
}
