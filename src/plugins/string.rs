use super::{integer_arg, string_operand};
use crate::answer::Answer;
use crate::error::EvalError;
use crate::plugin::{AtomDescriptor, ExtSourceProperties, InputKind, Plugin, PluginAtom};
use crate::query::Query;
use crate::store::SolverContext;

/// String manipulation atoms.
pub struct StringPlugin;

impl Plugin for StringPlugin {
    fn name(&self) -> &str {
        "StringPlugin"
    }

    fn create_atoms(&self) -> Vec<PluginAtom> {
        vec![
            PluginAtom::new(
                AtomDescriptor::new("concat", &[InputKind::Tuple], 1)
                    .with_properties(ExtSourceProperties::new().finite_output(0)),
                concat,
            ),
            PluginAtom::new(AtomDescriptor::new("strlen", &[InputKind::Constant], 1), strlen),
            PluginAtom::new(
                AtomDescriptor::new(
                    "substr",
                    &[InputKind::Constant, InputKind::Constant, InputKind::Constant],
                    1,
                ),
                substr,
            ),
        ]
    }
}

/// `&concat[a, b, ...](s)`: `s` is the string of all operands joined.
/// Quoted operands contribute their unquoted text.
fn concat(ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let mut joined = String::new();
    for &sym in query.input() {
        let (text, _) = string_operand(query.symbols(), sym)?;
        joined.push_str(&text);
    }
    let mut answer = Answer::new();
    answer.output([ctx.store_string(&joined)]);
    Ok(answer)
}

/// `&strlen[s](n)`: character count of the unquoted text.
fn strlen(ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let sym = query
        .arg(0)
        .ok_or_else(|| EvalError::plugin("strlen", "missing input"))?;
    let (text, _) = string_operand(query.symbols(), sym)?;
    let mut answer = Answer::new();
    answer.output([ctx.store_integer(text.chars().count() as i64)]);
    Ok(answer)
}

/// `&substr[s, start, len](t)`: up to `len` characters from `start`.
/// The result is quoted again if `s` was quoted.
fn substr(ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let sym = query
        .arg(0)
        .ok_or_else(|| EvalError::plugin("substr", "missing input"))?;
    let (text, quoted) = string_operand(query.symbols(), sym)?;
    let start = integer_arg(query, 1, "substr")?.max(0) as usize;
    let len = integer_arg(query, 2, "substr")?.max(0) as usize;
    let part: String = text.chars().skip(start).take(len).collect();

    let out = if quoted {
        ctx.store_string(&part)
    } else {
        ctx.store_constant(&part)
    };
    let mut answer = Answer::new();
    answer.output([out]);
    Ok(answer)
}

#[cfg(test)]
#[path = "../tests/plugins_string.rs"]
mod tests;
