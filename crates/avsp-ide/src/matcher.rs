//! Alignment of actual arguments with signature slots.

use avsp_signatures::ArgSpec;
use avsp_signatures::ArgType;
use serde::Serialize;

use crate::scanner::ActualArg;
use crate::scanner::ActualType;

/// One actual argument and the slot it was bound to, if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchedArg {
    pub slot_index: Option<usize>,
    pub slot_spec: Option<ArgSpec>,
    pub supplied_name: Option<String>,
    pub supplied_text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// One entry per actual argument, in call order.
    pub args: Vec<MatchedArg>,
    /// Slot the argument under the cursor binds to.
    pub active_slot: Option<usize>,
    /// A named argument appears before the cursor, so positional emphasis
    /// cannot be trusted.
    pub out_of_order: bool,
    /// 1 when the leading clip slot is supplied implicitly.
    pub clip_offset: usize,
}

/// Whether an argument of type `actual` can fill a slot declared `slot`.
#[must_use]
pub fn accepts(slot: ArgType, actual: ActualType) -> bool {
    match (slot, actual) {
        (ArgType::Unknown, _) | (_, ActualType::Var | ActualType::Empty) => true,
        (ArgType::Clip, ActualType::Clip)
        | (ArgType::Int, ActualType::Int | ActualType::Hex)
        | (ArgType::Float, ActualType::Float | ActualType::Int | ActualType::Hex)
        | (ArgType::Bool, ActualType::Bool)
        | (ArgType::String, ActualType::String) => true,
        _ => false,
    }
}

/// Bind every actual argument to a slot of `specs`.
///
/// `chained` is set for `clip.Name(...)` calls. `active_index` is the
/// argument under the cursor as reported by the scanner; it may equal
/// `actuals.len()` when the cursor sits on a new trailing argument.
#[must_use]
pub fn match_arguments(
    specs: &[ArgSpec],
    actuals: &[ActualArg],
    chained: bool,
    active_index: Option<usize>,
) -> MatchResult {
    let clip_offset = usize::from(receiver_is_implicit(specs, actuals, chained));
    let mut positions = PositionalBinder::new(specs, clip_offset);

    let mut args = Vec::with_capacity(actuals.len());
    let mut active_slot = None;
    for (idx, actual) in actuals.iter().enumerate() {
        let slot_index = match &actual.name {
            Some(name) => find_named_slot(specs, name),
            None => positions.bind(actual.inferred_type),
        }
        .filter(|&slot| slot < specs.len());

        if active_index == Some(idx) {
            active_slot = slot_index;
        }

        args.push(MatchedArg {
            slot_index,
            slot_spec: slot_index.and_then(|slot| specs.get(slot)).cloned(),
            supplied_name: actual.name.clone(),
            supplied_text: actual.text.clone(),
        });
    }

    // The cursor is on an argument that has not been typed yet.
    if active_index == Some(actuals.len()) {
        active_slot = positions
            .bind(ActualType::Empty)
            .filter(|&slot| slot < specs.len());
    }

    let out_of_order = active_index.is_some_and(|active| {
        actuals
            .iter()
            .take(active)
            .any(|actual| actual.name.is_some())
    });

    tracing::trace!(
        actuals = actuals.len(),
        clip_offset,
        ?active_slot,
        out_of_order,
        "matched arguments"
    );

    MatchResult {
        args,
        active_slot,
        out_of_order,
        clip_offset,
    }
}

/// A leading clip slot is filled implicitly when the call is chained, when
/// nothing was passed, or when the first argument cannot be a clip.
fn receiver_is_implicit(specs: &[ArgSpec], actuals: &[ActualArg], chained: bool) -> bool {
    let Some(first_slot) = specs.first() else {
        return false;
    };
    if first_slot.arg_type != ArgType::Clip {
        return false;
    }
    chained
        || actuals.first().is_none_or(|first| {
            !matches!(first.inferred_type, ActualType::Clip | ActualType::Var)
        })
}

fn find_named_slot(specs: &[ArgSpec], name: &str) -> Option<usize> {
    specs
        .iter()
        .position(|spec| !spec.name.is_empty() && spec.name.eq_ignore_ascii_case(name))
}

/// Assigns slots to unnamed arguments in order.
///
/// Arguments landing on the variadic slot stay there while their type fits
/// it. The first one that does not fit ends the repetition and takes the
/// slot after it.
#[derive(Clone, Debug)]
struct PositionalBinder<'s> {
    specs: &'s [ArgSpec],
    clip_offset: usize,
    variadic: Option<usize>,
    position: usize,
    /// Position of the first argument that ended the variadic run.
    absorption_ended_at: Option<usize>,
}

impl<'s> PositionalBinder<'s> {
    fn new(specs: &'s [ArgSpec], clip_offset: usize) -> Self {
        Self {
            specs,
            clip_offset,
            variadic: specs.iter().position(|spec| spec.is_variadic),
            position: 0,
            absorption_ended_at: None,
        }
    }

    /// Slot index for the next unnamed argument. May be past the end.
    fn bind(&mut self, actual: ActualType) -> Option<usize> {
        let position = self.position;
        self.position += 1;
        let index = position + self.clip_offset;

        let Some(variadic) = self.variadic else {
            return Some(index);
        };
        if index < variadic {
            return Some(index);
        }

        if let Some(ended_at) = self.absorption_ended_at {
            return Some(variadic + 1 + (position - ended_at));
        }
        if accepts(self.specs[variadic].arg_type, actual) {
            Some(variadic)
        } else {
            self.absorption_ended_at = Some(position);
            Some(variadic + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use avsp_signatures::parse_signature;
    use avsp_source::Span;

    use super::*;

    fn actual(text: &str, inferred_type: ActualType) -> ActualArg {
        ActualArg {
            text: text.to_string(),
            name: None,
            inferred_type,
            span: Span::default(),
        }
    }

    fn named(name: &str, text: &str, inferred_type: ActualType) -> ActualArg {
        ActualArg {
            name: Some(name.to_string()),
            ..actual(text, inferred_type)
        }
    }

    fn slots(result: &MatchResult) -> Vec<Option<usize>> {
        result.args.iter().map(|arg| arg.slot_index).collect()
    }

    mod positional {
        use super::*;

        #[test]
        fn explicit_receiver() {
            let specs = parse_signature(r#"(clip, int x, float "y"=1.5)"#);
            let actuals = [actual("myclip", ActualType::Var), actual("3", ActualType::Int)];

            let result = match_arguments(&specs, &actuals, false, None);

            assert_eq!(result.clip_offset, 0);
            assert_eq!(slots(&result), vec![Some(0), Some(1)]);
            assert_eq!(result.args[0].slot_spec.as_ref().unwrap().arg_type, ArgType::Clip);
            assert_eq!(result.args[1].slot_spec.as_ref().unwrap().name, "x");
            assert_eq!(result.args[1].supplied_text, "3");
            // `y` stays unbound and still has its default.
            assert_eq!(specs[2].default_value(), Some("1.5"));
        }

        #[test]
        fn chained_receiver() {
            let specs = parse_signature(r#"(clip, int x, float "y"=1.5)"#);
            let actuals = [
                actual("5", ActualType::Int),
                named("y", "2.0", ActualType::Float),
            ];

            let result = match_arguments(&specs, &actuals, true, None);

            assert_eq!(result.clip_offset, 1);
            assert_eq!(slots(&result), vec![Some(1), Some(2)]);
            assert_eq!(result.args[1].supplied_name.as_deref(), Some("y"));
        }

        #[test]
        fn receiver_is_implicit_when_first_argument_is_not_a_clip() {
            let specs = parse_signature("(clip, float amount)");

            let result = match_arguments(&specs, &[actual("1.5", ActualType::Float)], false, None);
            assert_eq!(result.clip_offset, 1);
            assert_eq!(slots(&result), vec![Some(1)]);

            let result = match_arguments(&specs, &[], false, Some(0));
            assert_eq!(result.clip_offset, 1);
            assert_eq!(result.active_slot, Some(1));

            let result = match_arguments(&specs, &[actual("last", ActualType::Clip)], false, None);
            assert_eq!(result.clip_offset, 0);
        }

        #[test]
        fn no_receiver_without_leading_clip_slot() {
            let specs = parse_signature(r#"(int "width"=640, int "height"=480)"#);
            let result = match_arguments(&specs, &[actual("320", ActualType::Int)], true, None);
            assert_eq!(result.clip_offset, 0);
            assert_eq!(slots(&result), vec![Some(0)]);
        }

        #[test]
        fn extra_arguments_are_kept_unbound() {
            let specs = parse_signature("(clip, int x)");
            let actuals = [
                actual("c", ActualType::Var),
                actual("1", ActualType::Int),
                actual("2", ActualType::Int),
            ];

            let result = match_arguments(&specs, &actuals, false, None);

            assert_eq!(slots(&result), vec![Some(0), Some(1), None]);
            assert_eq!(result.args[2].slot_spec, None);
            assert_eq!(result.args[2].supplied_text, "2");
        }
    }

    mod named {
        use super::*;

        #[test]
        fn names_match_case_insensitively() {
            let specs = parse_signature(r#"(clip, float amount, bool "MMX"=true)"#);
            let actuals = [named("mmx", "false", ActualType::Bool)];
            let result = match_arguments(&specs, &actuals, true, None);
            assert_eq!(slots(&result), vec![Some(2)]);
        }

        #[test]
        fn unknown_names_are_unbound() {
            let specs = parse_signature("(clip, float amount)");
            let actuals = [named("strength", "2", ActualType::Int)];
            let result = match_arguments(&specs, &actuals, true, None);
            assert_eq!(slots(&result), vec![None]);
            assert_eq!(result.args[0].supplied_name.as_deref(), Some("strength"));
        }

        #[test]
        fn named_arguments_do_not_consume_positions() {
            let specs = parse_signature(r#"(clip, int a, int b, int "c")"#);
            let actuals = [
                named("c", "1", ActualType::Int),
                actual("2", ActualType::Int),
                actual("3", ActualType::Int),
            ];
            let result = match_arguments(&specs, &actuals, true, None);
            assert_eq!(slots(&result), vec![Some(3), Some(1), Some(2)]);
        }

        #[test]
        fn named_argument_before_cursor_is_out_of_order() {
            let specs = parse_signature(r#"(clip, int a, int b, int "c")"#);
            let actuals = [
                named("c", "1", ActualType::Int),
                actual("2", ActualType::Int),
            ];

            let result = match_arguments(&specs, &actuals, true, Some(1));
            assert!(result.out_of_order);
            assert_eq!(result.active_slot, Some(1));

            let result = match_arguments(&specs, &actuals, true, Some(0));
            assert!(!result.out_of_order);
            assert_eq!(result.active_slot, Some(3));
        }
    }

    mod variadic {
        use super::*;

        #[test]
        fn trailing_clips_are_absorbed() {
            let specs = parse_signature("(clip1, clip2 [, ...])");
            let actuals = [
                actual("a", ActualType::Clip),
                actual("b", ActualType::Clip),
                actual("c", ActualType::Clip),
                actual("d", ActualType::Clip),
            ];

            let result = match_arguments(&specs, &actuals, false, None);

            assert_eq!(result.clip_offset, 0);
            assert_eq!(slots(&result), vec![Some(0), Some(1), Some(1), Some(1)]);
        }

        #[test]
        fn mismatched_type_ends_absorption() {
            let specs = parse_signature(r#"(clip clip1, clip clip2 [, ...], int overlap, float "fps"=24.0)"#);
            let actuals = [
                actual("a", ActualType::Var),
                actual("b", ActualType::Var),
                actual("c", ActualType::Var),
                actual("30", ActualType::Int),
                actual("25.0", ActualType::Float),
            ];

            let result = match_arguments(&specs, &actuals, false, None);

            assert_eq!(
                slots(&result),
                vec![Some(0), Some(1), Some(1), Some(2), Some(3)]
            );
        }

        #[test]
        fn float_variadic_accepts_ints_and_hex() {
            let specs = parse_signature("(clip, float values [, ...])");
            let actuals = [
                actual("1", ActualType::Int),
                actual("$10", ActualType::Hex),
                actual("1.5", ActualType::Float),
            ];
            let result = match_arguments(&specs, &actuals, true, None);
            assert_eq!(slots(&result), vec![Some(1), Some(1), Some(1)]);
        }

        #[test]
        fn new_argument_on_variadic_slot() {
            let specs = parse_signature("(string filename [, ...])");
            let actuals = [actual("\"a.avi\"", ActualType::String)];
            let result = match_arguments(&specs, &actuals, false, Some(1));
            assert_eq!(result.active_slot, Some(0));
        }
    }

    mod totality {
        use super::*;

        #[test]
        fn one_match_per_argument_for_any_input() {
            let signatures = [
                "",
                "int",
                "(clip)",
                "(clip1, clip2 [, ...])",
                r#"(clip, int x, float "y"=1.5)"#,
                "([, ...])",
                "(((",
            ];
            let argument_lists: Vec<Vec<ActualArg>> = vec![
                vec![],
                vec![actual("", ActualType::Empty)],
                (0..20).map(|_| actual("1", ActualType::Int)).collect(),
                vec![
                    named("x", "1", ActualType::Int),
                    named("zz", "2", ActualType::Int),
                    named("y", "3.0", ActualType::Float),
                ],
                vec![
                    actual("\"s\"", ActualType::String),
                    actual("a=b", ActualType::Named),
                    actual("$ff", ActualType::Hex),
                ],
            ];

            for signature in signatures {
                let specs = parse_signature(signature);
                for actuals in &argument_lists {
                    for chained in [false, true] {
                        for active in [None, Some(0), Some(actuals.len()), Some(99)] {
                            let result = match_arguments(&specs, actuals, chained, active);
                            assert_eq!(result.args.len(), actuals.len());
                            assert!(result
                                .args
                                .iter()
                                .all(|arg| arg.slot_index.is_none_or(|slot| slot < specs.len())));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn acceptance_table() {
        assert!(accepts(ArgType::Float, ActualType::Int));
        assert!(accepts(ArgType::Int, ActualType::Hex));
        assert!(accepts(ArgType::Clip, ActualType::Var));
        assert!(accepts(ArgType::Unknown, ActualType::String));
        assert!(!accepts(ArgType::Int, ActualType::Float));
        assert!(!accepts(ArgType::Clip, ActualType::Int));
        assert!(!accepts(ArgType::String, ActualType::Named));
    }
}
