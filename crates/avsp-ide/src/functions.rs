//! `function Name(params) { ... }` definitions found in a script.

use avsp_lexer::Document;
use avsp_lexer::SyntaxCategory;
use avsp_lexer::Token;
use avsp_source::Span;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScriptFunction {
    pub name: String,
    /// Parameter list in signature notation, e.g. `(clip c, float "amount")`.
    pub signature: String,
    pub name_span: Span,
}

/// Every function the document defines, in source order.
#[must_use]
pub fn script_functions(document: &Document) -> Vec<ScriptFunction> {
    let text = document.text();
    let tokens: Vec<&Token> = document
        .tokens()
        .filter(|token| !token.category.is_comment() && !token.lexeme(text).trim().is_empty())
        .collect();

    let mut functions = Vec::new();
    for (idx, window) in tokens.windows(3).enumerate() {
        let [keyword, name, open] = window else {
            continue;
        };
        let is_definition = keyword.category == SyntaxCategory::Keyword
            && keyword.lexeme(text).eq_ignore_ascii_case("function")
            && name.category == SyntaxCategory::ScriptFunction
            && open.lexeme(text) == "(";
        if !is_definition {
            continue;
        }

        let params = parameter_text(text, &tokens[idx + 3..]);
        functions.push(ScriptFunction {
            name: name.lexeme(text).to_string(),
            signature: format!("({params})"),
            name_span: name.span,
        });
    }

    tracing::debug!(count = functions.len(), "script functions extracted");
    functions
}

/// Text up to the parenthesis that closes the parameter list, with
/// continuation markers dropped and whitespace collapsed.
fn parameter_text(text: &str, tokens: &[&Token]) -> String {
    let mut depth = 0u32;
    let mut params = String::new();
    for token in tokens {
        let lexeme = token.lexeme(text);
        if token.category == SyntaxCategory::Operator {
            match lexeme {
                "(" => depth += 1,
                ")" if depth == 0 => break,
                ")" => depth -= 1,
                "\\" => continue,
                _ => {}
            }
        }
        params.push_str(lexeme);
        params.push(' ');
    }
    normalize_params(&params)
}

fn normalize_params(params: &str) -> String {
    let collapsed = params.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" ,", ",").replace("( ", "(").replace(" )", ")")
}
