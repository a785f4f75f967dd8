//! Human-facing text built from parsed signatures.

use std::ops::Range;

use serde::Serialize;

use crate::signature::ArgSpec;
use crate::signature::ArgType;

const PLACEHOLDER: &str = "?";
const VARIADIC_SUFFIX: &str = " [, ...]";

/// Calltip text plus the byte range of the slot to emphasize.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CalltipText {
    pub text: String,
    pub highlight: Option<Range<usize>>,
}

/// Build the text inserted when a filter is picked from a list, e.g.
/// `Blur(?, amount_v=?, MMX=true)`.
///
/// A leading unnamed clip slot is left out because the receiver is usually
/// supplied by `last` or a chained call.
#[must_use]
pub fn build_default_invocation(name: &str, specs: &[ArgSpec]) -> String {
    let args: Vec<String> = specs
        .iter()
        .enumerate()
        .filter(|(idx, spec)| !(*idx == 0 && spec.is_receiver_candidate()))
        .map(|(_, spec)| {
            let value = spec.default_value().unwrap_or(PLACEHOLDER);
            if spec.is_named && !spec.name.is_empty() {
                format!("{}={value}", spec.name)
            } else {
                value.to_string()
            }
        })
        .collect();

    format!("{name}({})", args.join(", "))
}

/// Render `(type1 name1, type2 name2=default, ...)`.
///
/// Defaults are shown on the active slot only, unless `show_all_defaults`.
/// The active slot's byte range is reported for emphasis except when
/// `out_of_order` is set, since named arguments ahead of the cursor make
/// positional emphasis unreliable.
#[must_use]
pub fn build_calltip_text(
    specs: &[ArgSpec],
    active: Option<usize>,
    out_of_order: bool,
    show_all_defaults: bool,
) -> CalltipText {
    let mut text = String::from("(");
    let mut highlight = None;

    for (idx, spec) in specs.iter().enumerate() {
        if idx > 0 {
            text.push_str(", ");
        }
        let is_active = active == Some(idx);
        let start = text.len();

        let mut slot = spec.display();
        if (is_active || show_all_defaults) && !spec.extra.is_empty() {
            if spec.default_value().is_some() {
                slot.push('=');
            } else {
                slot.push(' ');
            }
            slot.push_str(&spec.extra);
        }
        if spec.is_optional {
            slot = format!("[{slot}]");
        }
        if spec.is_variadic {
            slot.push_str(VARIADIC_SUFFIX);
        }
        text.push_str(&slot);

        if is_active && !out_of_order {
            highlight = Some(start..text.len());
        }
    }

    text.push(')');
    CalltipText { text, highlight }
}

/// Literal values worth offering for a slot.
///
/// Bools offer both truth values; ints and strings offer the choices listed
/// in a parenthesised, slash-separated annotation such as `(fast/slow)`.
#[must_use]
pub fn suggest_values(arg_type: ArgType, extra: &str) -> Vec<String> {
    match arg_type {
        ArgType::Bool => vec!["true".to_string(), "false".to_string()],
        ArgType::Int | ArgType::String => choice_list(extra),
        ArgType::Clip | ArgType::Float | ArgType::Unknown => Vec::new(),
    }
}

fn choice_list(extra: &str) -> Vec<String> {
    let Some(open) = extra.rfind('(') else {
        return Vec::new();
    };
    let Some(len) = extra[open + 1..].find(')') else {
        return Vec::new();
    };
    let inner = &extra[open + 1..open + 1 + len];
    if !inner.contains('/') {
        return Vec::new();
    }
    inner
        .split('/')
        .map(str::trim)
        .filter(|choice| !choice.is_empty())
        .map(ToString::to_string)
        .collect()
}
