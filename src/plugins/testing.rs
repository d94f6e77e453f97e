use super::{integer_arg, string_operand};
use crate::answer::Answer;
use crate::error::EvalError;
use crate::nogood::Nogood;
use crate::plugin::{AtomDescriptor, ExtSourceProperties, Plugin, PluginAtom};
use crate::query::Query;
use crate::store::SolverContext;
use crate::symbol::{Symbol, Truth, Tuple};
use rustc_hash::FxHashSet;

use crate::plugin::InputKind::{Constant, Predicate, Tuple as Rest};

/// Atoms used by the solver's regression programs.
pub struct TestPlugin;

impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        "TestPlugin"
    }

    fn create_atoms(&self) -> Vec<PluginAtom> {
        let partial = ExtSourceProperties::new().partial_answer(true);
        vec![
            PluginAtom::new(AtomDescriptor::new("testConcat", &[Rest], 1), test_concat),
            PluginAtom::new(
                AtomDescriptor::new("testSetMinus", &[Predicate, Predicate], 1)
                    .with_properties(ExtSourceProperties::new().monotonic(0).antimonotonic(1)),
                set_minus,
            ),
            PluginAtom::new(
                AtomDescriptor::new("testSetMinusTrueAtoms", &[Predicate, Predicate], 1),
                set_minus_true_atoms,
            ),
            PluginAtom::new(
                AtomDescriptor::new("testSetMinusLearn", &[Predicate, Predicate], 1)
                    .with_properties(ExtSourceProperties::new().input_output_learning(false)),
                set_minus_learn,
            ),
            PluginAtom::new(
                AtomDescriptor::new("id", &[Predicate], 1)
                    .with_properties(ExtSourceProperties::new().monotonic(0)),
                id,
            ),
            PluginAtom::new(AtomDescriptor::new("idc", &[Constant], 1), idc),
            PluginAtom::new(
                AtomDescriptor::new("testSmallerThan", &[Constant, Constant], 0),
                smaller_than,
            ),
            PluginAtom::new(
                AtomDescriptor::new("isEmpty", &[Predicate], 0).with_properties(partial.clone()),
                is_empty,
            ),
            PluginAtom::new(
                AtomDescriptor::new("numberOfBalls", &[Predicate, Constant, Constant], 0)
                    .with_properties(partial),
                number_of_balls,
            ),
        ]
    }
}

fn input_arg(query: &Query<'_>, index: usize, predicate: &str) -> Result<Symbol, EvalError> {
    query
        .arg(index)
        .ok_or_else(|| EvalError::plugin(predicate, format!("missing input {}", index)))
}

/// Like `concat`, but the result is only quoted if some operand was.
fn test_concat(ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let mut joined = String::new();
    let mut any_quoted = false;
    for &sym in query.input() {
        let (text, quoted) = string_operand(query.symbols(), sym)?;
        any_quoted |= quoted;
        joined.push_str(&text);
    }
    let out = if any_quoted {
        ctx.store_string(&joined)
    } else {
        ctx.store_constant(&joined)
    };
    let mut answer = Answer::new();
    answer.output([out]);
    Ok(answer)
}

/// Everything in the extension of `p` but not in that of `q`.
fn set_minus(_ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let p = input_arg(query, 0, "testSetMinus")?;
    let q = input_arg(query, 1, "testSetMinus")?;
    let qset = query.extension(q);
    let mut answer = Answer::new();
    for tuple in query.extension(p) {
        if !qset.contains(&tuple) {
            answer.output(tuple);
        }
    }
    Ok(answer)
}

/// Same relation as `testSetMinus`, computed from the raw true input atoms.
fn set_minus_true_atoms(
    _ctx: &mut dyn SolverContext,
    query: &Query<'_>,
) -> Result<Answer, EvalError> {
    let p = input_arg(query, 0, "testSetMinusTrueAtoms")?;
    let q = input_arg(query, 1, "testSetMinusTrueAtoms")?;
    let symbols = query.symbols();
    let mut pset: FxHashSet<Tuple> = FxHashSet::default();
    let mut qset: FxHashSet<Tuple> = FxHashSet::default();
    for atom in query.interpretation().true_atoms() {
        let head = symbols.head(atom);
        if head == Some(p) {
            pset.insert(symbols.arguments(atom));
        }
        if head == Some(q) {
            qset.insert(symbols.arguments(atom));
        }
    }
    let mut answer = Answer::new();
    for tuple in pset.difference(&qset) {
        answer.output(tuple.iter().copied());
    }
    Ok(answer)
}

/// `testSetMinus` that also learns, for every output `x`, that `p(x)`,
/// `not q(x)` and `not out(x)` cannot hold together.
fn set_minus_learn(ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let p = input_arg(query, 0, "testSetMinusLearn")?;
    let q = input_arg(query, 1, "testSetMinusLearn")?;
    let qset = query.extension(q);
    let mut answer = Answer::new();
    for tuple in query.extension(p) {
        if qset.contains(&tuple) {
            continue;
        }
        let mut p_atom: Tuple = Tuple::with_capacity(tuple.len() + 1);
        p_atom.push(p);
        p_atom.extend_from_slice(&tuple);
        let mut q_atom = p_atom.clone();
        q_atom[0] = q;

        let p_true = ctx.store_atom(&p_atom)?;
        let q_false = ctx.negate(ctx.store_atom(&q_atom)?)?;
        let out_false = ctx.negate(ctx.store_output_atom(&tuple)?)?;
        ctx.learn(Nogood::new([p_true, q_false, out_false]))?;
        answer.output(tuple);
    }
    Ok(answer)
}

/// Arguments of every true unary atom of `p`.
fn id(_ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let p = input_arg(query, 0, "id")?;
    let mut answer = Answer::new();
    for tuple in query.extension(p) {
        if tuple.len() != 1 {
            return Err(EvalError::plugin(
                "id",
                "only predicates of arity 1 are supported",
            ));
        }
        answer.output(tuple);
    }
    Ok(answer)
}

fn idc(_ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let c = input_arg(query, 0, "idc")?;
    let mut answer = Answer::new();
    answer.output([c]);
    Ok(answer)
}

fn smaller_than(_ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let a = integer_arg(query, 0, "testSmallerThan")?;
    let b = integer_arg(query, 1, "testSmallerThan")?;
    let mut answer = Answer::new();
    if a < b {
        answer.output([]);
    }
    Ok(answer)
}

/// Count input atoms of `p` that are true and undecided.
fn count_inputs(query: &Query<'_>, p: Symbol) -> (usize, usize) {
    let symbols = query.symbols();
    let mut true_count = 0;
    let mut unknown_count = 0;
    for (atom, truth) in query.interpretation().atoms() {
        if symbols.head(atom) != Some(p) {
            continue;
        }
        match truth {
            Truth::True => true_count += 1,
            Truth::Unknown => unknown_count += 1,
            Truth::False => {}
        }
    }
    (true_count, unknown_count)
}

/// True once `p` has a true atom, unknown while an undecided one may still
/// become true. This is the reading the regression programs are written
/// against, despite the name.
fn is_empty(_ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let p = input_arg(query, 0, "isEmpty")?;
    let (true_count, unknown_count) = count_inputs(query, p);
    let mut answer = Answer::new();
    if true_count > 0 {
        answer.output([]);
    } else if unknown_count > 0 {
        answer.output_unknown([]);
    }
    Ok(answer)
}

/// True if the number of true atoms of `p` is certainly within
/// `[min, max]`, unknown if it still may be.
fn number_of_balls(_ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let p = input_arg(query, 0, "numberOfBalls")?;
    let min = integer_arg(query, 1, "numberOfBalls")?;
    let max = integer_arg(query, 2, "numberOfBalls")?;
    let (true_count, unknown_count) = count_inputs(query, p);
    let low = true_count as i64;
    let high = (true_count + unknown_count) as i64;
    let mut answer = Answer::new();
    if low >= min && high <= max {
        answer.output([]);
    } else if high >= min && low <= max {
        answer.output_unknown([]);
    }
    Ok(answer)
}

#[cfg(test)]
#[path = "../tests/plugins_testing.rs"]
mod tests;
