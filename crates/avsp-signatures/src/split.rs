/// Which bracket pairs nest when looking for top-level delimiters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Nesting {
    /// Parentheses and square brackets both nest.
    ParensAndBrackets,
    /// Only parentheses nest; square brackets are ordinary characters.
    ParensOnly,
}

/// Find positions of a delimiter character in `s` that sit outside any
/// double-quoted region and outside any nested bracket pair.
///
/// The callback receives the byte index of each top-level delimiter found.
/// Return `true` from the callback to stop early. Returns `false` when the
/// brackets in `s` do not balance.
pub(crate) fn for_each_top_level(
    s: &str,
    nesting: Nesting,
    delimiter: impl Fn(char) -> bool,
    mut cb: impl FnMut(usize) -> bool,
) -> bool {
    let mut in_quote = false;
    let mut depth: usize = 0;
    let mut balanced = true;

    for (idx, ch) in s.char_indices() {
        match ch {
            '"' => in_quote = !in_quote,
            _ if in_quote => {}
            '(' => depth += 1,
            '[' if nesting == Nesting::ParensAndBrackets => depth += 1,
            ')' => {
                if depth == 0 {
                    balanced = false;
                } else {
                    depth -= 1;
                }
            }
            ']' if nesting == Nesting::ParensAndBrackets => {
                if depth == 0 {
                    balanced = false;
                } else {
                    depth -= 1;
                }
            }
            _ if depth == 0 && delimiter(ch) => {
                if cb(idx) {
                    return balanced;
                }
            }
            _ => {}
        }
    }

    balanced && depth == 0 && !in_quote
}

/// Split `s` on top-level commas.
///
/// Bracketed sub-lists such as `[, ...]` are kept intact. If the brackets do
/// not balance, the split falls back to protecting parentheses only so a
/// stray `[` cannot swallow the rest of the text.
pub(crate) fn split_top_level_commas(s: &str) -> Vec<&str> {
    let split = |nesting| {
        let mut pieces = Vec::new();
        let mut start = 0;
        let balanced = for_each_top_level(
            s,
            nesting,
            |ch| ch == ',',
            |idx| {
                pieces.push(&s[start..idx]);
                start = idx + 1;
                false
            },
        );
        pieces.push(&s[start..]);
        (pieces, balanced)
    };

    let (pieces, balanced) = split(Nesting::ParensAndBrackets);
    if balanced {
        pieces
    } else {
        split(Nesting::ParensOnly).0
    }
}

/// Byte index of the first top-level `ch` in `s`.
pub(crate) fn find_top_level(s: &str, ch: char) -> Option<usize> {
    let mut found = None;
    for_each_top_level(
        s,
        Nesting::ParensAndBrackets,
        |c| c == ch,
        |idx| {
            found = Some(idx);
            true
        },
    );
    found
}
