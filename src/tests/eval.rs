use super::*;
use crate::interpretation::InterpretationBuilder;
use crate::test_utils::{atom, evaluator, interpretation, setup};

fn tuple(symbols: &SymbolTable, args: &[&str]) -> Tuple {
    args.iter().map(|a| symbols.constant(a)).collect()
}

fn output_atom(symbols: &SymbolTable, pred: &str, args: &[&str]) -> Symbol {
    let args: Vec<Symbol> = args.iter().map(|a| symbols.constant(a)).collect();
    symbols
        .function(&replacement_predicate(pred, args.len()), &args)
        .unwrap()
}

fn wrong_arity(_ctx: &mut dyn SolverContext, _query: &Query<'_>) -> Result<Answer, EvalError> {
    let mut answer = Answer::new();
    answer.output([]);
    Ok(answer)
}

fn guess(ctx: &mut dyn SolverContext, _query: &Query<'_>) -> Result<Answer, EvalError> {
    let mut answer = Answer::new();
    answer.output([ctx.store_constant("a")]);
    answer.output_unknown([ctx.store_constant("b")]);
    Ok(answer)
}

fn learn_then_fail(ctx: &mut dyn SolverContext, query: &Query<'_>) -> Result<Answer, EvalError> {
    let p = query.arg(0).unwrap_or_else(|| ctx.store_constant("p"));
    let p_a = ctx.store_atom(&[p, ctx.store_constant("a")])?;
    ctx.learn(Nogood::new([p_a]))?;
    Err(EvalError::plugin("learnThenFail", "backend unavailable"))
}

struct Faulty;

impl Plugin for Faulty {
    fn name(&self) -> &str {
        "Faulty"
    }

    fn create_atoms(&self) -> Vec<PluginAtom> {
        vec![
            PluginAtom::new(AtomDescriptor::new("wrongArity", &[], 1), wrong_arity),
            PluginAtom::new(AtomDescriptor::new("guess", &[], 1), guess),
            PluginAtom::new(
                AtomDescriptor::new("learnThenFail", &[InputKind::Predicate], 1),
                learn_then_fail,
            ),
        ]
    }
}

fn faulty_evaluator(symbols: &Arc<SymbolTable>, config: EvaluatorConfig) -> Evaluator {
    let mut evaluator = Evaluator::with_config(Arc::clone(symbols), config);
    evaluator.register(&Faulty).unwrap();
    evaluator
}

#[test]
fn replacement_predicate_naming() {
    assert_eq!(replacement_predicate("concat", 3), "aux_t_3_concat");
}

#[test]
fn set_difference() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let interp = interpretation(
        &symbols,
        &[
            ("p", &["a"], Truth::True),
            ("p", &["b"], Truth::True),
            ("p", &["c"], Truth::True),
            ("q", &["b"], Truth::True),
        ],
    );
    let input = [symbols.constant("p"), symbols.constant("q")];
    let result = ev.evaluate("testSetMinus", &input, &interp).unwrap();

    let answer = result.answer();
    assert_eq!(answer.true_tuples().len(), 2);
    assert!(answer.is_true(&tuple(&symbols, &["a"])));
    assert!(answer.is_true(&tuple(&symbols, &["c"])));
    assert!(!answer.is_true(&tuple(&symbols, &["b"])));
    assert!(answer.unknown_tuples().is_empty());

    let out_a = output_atom(&symbols, "testSetMinus", &["p", "q", "a"]);
    assert_eq!(
        symbols.render(out_a).unwrap(),
        "aux_t_3_testSetMinus(p,q,a)"
    );
    assert!(result.output_atoms().contains(&(out_a, Truth::True)));
    assert_eq!(result.output_atoms().len(), 2);
}

#[test]
fn learned_set_difference_nogood() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let interp = interpretation(&symbols, &[("p", &["a"], Truth::True)]);
    let input = [symbols.constant("p"), symbols.constant("q")];
    let result = ev.evaluate("testSetMinusLearn", &input, &interp).unwrap();

    let p_a = atom(&symbols, "p", &["a"]);
    let q_a = atom(&symbols, "q", &["a"]);
    let out_a = output_atom(&symbols, "testSetMinusLearn", &["p", "q", "a"]);
    let expected = Nogood::new([
        p_a,
        symbols.negate(q_a).unwrap(),
        symbols.negate(out_a).unwrap(),
    ]);
    assert_eq!(result.learned(), &[expected.clone()]);
    assert!(ev.nogoods().contains(&expected));

    // p(a) true, q(a) false, and the output reported true: not violated
    let status = expected.status(|a| {
        if a == out_a {
            result.truth_of(&tuple(&symbols, &["a"]))
        } else {
            interp.truth(a)
        }
    });
    assert_eq!(status, Truth::False);

    // had the output been false the nogood would fire
    let status = expected.status(|a| if a == out_a { Truth::False } else { interp.truth(a) });
    assert_eq!(status, Truth::True);
}

#[test]
fn unknown_atom() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let err = ev
        .evaluate("missing", &[], &Interpretation::default())
        .unwrap_err();
    assert_eq!(
        err,
        EvalError::UnknownAtom {
            predicate: "missing".to_string()
        }
    );
    assert_eq!(ev.metrics().report().failures, 1);
}

#[test]
fn input_arity_is_checked() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let err = ev
        .evaluate("testSetMinus", &[symbols.constant("p")], &Interpretation::default())
        .unwrap_err();
    assert_eq!(
        err,
        EvalError::InputArity {
            predicate: "testSetMinus".to_string(),
            expected: "2".to_string(),
            actual: 1,
        }
    );
}

#[test]
fn predicate_inputs_must_be_names() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let q = symbols.constant("q");
    let p_a = atom(&symbols, "p", &["a"]);
    let bad = [
        symbols.integer(1),
        symbols.string("p"),
        symbols.negate(symbols.constant("p")).unwrap(),
        p_a,
        symbols.constant("foo bar"),
        symbols.constant("Upper"),
    ];
    for first in bad {
        let err = ev
            .evaluate("testSetMinus", &[first, q], &Interpretation::default())
            .unwrap_err();
        assert!(
            matches!(err, EvalError::InputKind { index: 0, .. }),
            "unexpected {:?}",
            err
        );
    }
}

#[test]
fn output_arity_is_checked() {
    let symbols = setup();
    let ev = faulty_evaluator(&symbols, EvaluatorConfig::default());
    let err = ev
        .evaluate("wrongArity", &[], &Interpretation::default())
        .unwrap_err();
    assert_eq!(
        err,
        EvalError::OutputArity {
            predicate: "wrongArity".to_string(),
            expected: 1,
            actual: 0,
        }
    );
}

#[test]
fn unknown_tuples_need_partial_answers() {
    let symbols = setup();
    let ev = faulty_evaluator(&symbols, EvaluatorConfig::default());
    let err = ev
        .evaluate("guess", &[], &Interpretation::default())
        .unwrap_err();
    assert!(matches!(err, EvalError::UnexpectedUnknown { .. }));
}

#[test]
fn lenient_mode_drops_unknown_tuples() {
    let symbols = setup();
    let config = EvaluatorConfig::default().with_strict_partial_answers(false);
    let ev = faulty_evaluator(&symbols, config);
    let result = ev
        .evaluate("guess", &[], &Interpretation::default())
        .unwrap();
    assert!(result.answer().unknown_tuples().is_empty());
    assert!(result.answer().is_true(&tuple(&symbols, &["a"])));
    assert_eq!(result.truth_of(&tuple(&symbols, &["b"])), Truth::False);
    assert_eq!(ev.metrics().report().dropped_tuples, 1);
}

#[test]
fn failed_evaluation_commits_nothing() {
    let symbols = setup();
    let ev = faulty_evaluator(&symbols, EvaluatorConfig::default());
    let err = ev
        .evaluate(
            "learnThenFail",
            &[symbols.constant("p")],
            &Interpretation::default(),
        )
        .unwrap_err();
    assert!(matches!(err, EvalError::Plugin { .. }));
    assert!(ev.nogoods().is_empty());
    let report = ev.metrics().report();
    assert_eq!(report.failures, 1);
    assert_eq!(report.evaluations, 0);
}

#[test]
fn monotonic_learning_keeps_relevant_inputs() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let interp = interpretation(
        &symbols,
        &[
            ("p", &["a"], Truth::True),
            ("p", &["b"], Truth::True),
            ("q", &["b"], Truth::True),
            ("q", &["c"], Truth::False),
        ],
    );
    let input = [symbols.constant("p"), symbols.constant("q")];
    let result = ev.evaluate("testSetMinus", &input, &interp).unwrap();

    // p is monotonic: only its true atoms matter
    // q is antimonotonic: only its false atoms matter
    let out_a = output_atom(&symbols, "testSetMinus", &["p", "q", "a"]);
    let expected = Nogood::new([
        atom(&symbols, "p", &["a"]),
        atom(&symbols, "p", &["b"]),
        symbols.negate(atom(&symbols, "q", &["c"])).unwrap(),
        symbols.negate(out_a).unwrap(),
    ]);
    assert_eq!(result.learned(), &[expected]);
    assert_eq!(ev.metrics().report().nogoods_derived, 1);
}

#[test]
fn non_monotonic_learning_keeps_every_input() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let interp = interpretation(
        &symbols,
        &[
            ("p", &["a"], Truth::True),
            ("q", &["a"], Truth::False),
            ("q", &["b"], Truth::True),
        ],
    );
    let input = [symbols.constant("p"), symbols.constant("q")];
    let result = ev
        .evaluate("testSetMinusTrueAtoms", &input, &interp)
        .unwrap();

    let out_a = output_atom(&symbols, "testSetMinusTrueAtoms", &["p", "q", "a"]);
    let expected = Nogood::new([
        atom(&symbols, "p", &["a"]),
        symbols.negate(atom(&symbols, "q", &["a"])).unwrap(),
        atom(&symbols, "q", &["b"]),
        symbols.negate(out_a).unwrap(),
    ]);
    assert_eq!(result.learned(), &[expected]);
}

#[test]
fn undecided_input_blocks_learning() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let input = [symbols.constant("p"), symbols.constant("q")];

    // undecided atom of the antimonotonic input: nothing derived
    let interp = interpretation(
        &symbols,
        &[("p", &["a"], Truth::True), ("q", &["b"], Truth::Unknown)],
    );
    let result = ev.evaluate("testSetMinus", &input, &interp).unwrap();
    assert!(result.learned().is_empty());

    // undecided atom of the monotonic input is simply left out
    let interp = interpretation(
        &symbols,
        &[("p", &["a"], Truth::True), ("p", &["b"], Truth::Unknown)],
    );
    let result = ev.evaluate("testSetMinus", &input, &interp).unwrap();
    let out_a = output_atom(&symbols, "testSetMinus", &["p", "q", "a"]);
    let expected = Nogood::new([atom(&symbols, "p", &["a"]), symbols.negate(out_a).unwrap()]);
    assert_eq!(result.learned(), &[expected]);
}

#[test]
fn learning_can_be_disabled() {
    let symbols = setup();
    let mut ev = Evaluator::with_config(
        Arc::clone(&symbols),
        EvaluatorConfig::default().with_input_output_learning(false),
    );
    ev.register(&crate::plugins::TestPlugin).unwrap();
    let interp = interpretation(&symbols, &[("p", &["a"], Truth::True)]);
    let input = [symbols.constant("p"), symbols.constant("q")];
    let result = ev.evaluate("testSetMinus", &input, &interp).unwrap();
    assert_eq!(result.answer().true_tuples().len(), 1);
    assert!(result.learned().is_empty());
    assert!(ev.nogoods().is_empty());
}

#[test]
fn repeated_evaluation_learns_nothing_new() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let interp = interpretation(
        &symbols,
        &[("p", &["a"], Truth::True), ("p", &["b"], Truth::True)],
    );
    let input = [symbols.constant("p"), symbols.constant("q")];
    let first = ev.evaluate("testSetMinus", &input, &interp).unwrap();
    assert_eq!(first.learned().len(), 2);
    let second = ev.evaluate("testSetMinus", &input, &interp).unwrap();
    assert!(second.learned().is_empty());
    assert_eq!(ev.nogoods().len(), 2);

    let report = ev.metrics().report();
    assert_eq!(report.evaluations, 2);
    assert_eq!(report.nogoods_duplicate, 2);
}

#[test]
fn partial_interpretation_makes_answer_provisional() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let input = [symbols.constant("p"), symbols.constant("q")];
    let a = tuple(&symbols, &["a"]);
    let b = tuple(&symbols, &["b"]);

    // q(a) may still become true and remove a from the output
    let partial = interpretation(
        &symbols,
        &[("p", &["a"], Truth::True), ("q", &["a"], Truth::Unknown)],
    );
    let result = ev
        .evaluate("testSetMinusTrueAtoms", &input, &partial)
        .unwrap();
    assert!(result.is_provisional());
    assert!(result.answer().is_true(&a));
    assert_eq!(result.truth_of(&a), Truth::Unknown);
    assert_eq!(result.truth_of(&b), Truth::Unknown);
    let out_a = output_atom(&symbols, "testSetMinusTrueAtoms", &["p", "q", "a"]);
    assert_eq!(result.output_atoms(), &[(out_a, Truth::Unknown)]);

    let complete = interpretation(&symbols, &[("p", &["a"], Truth::True)]);
    let result = ev
        .evaluate("testSetMinusTrueAtoms", &input, &complete)
        .unwrap();
    assert!(!result.is_provisional());
    assert_eq!(result.truth_of(&a), Truth::True);
    assert_eq!(result.truth_of(&b), Truth::False);
    assert_eq!(result.output_atoms(), &[(out_a, Truth::True)]);
}

#[test]
fn partial_answers_stay_definite_on_partial_interpretation() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let interp = interpretation(
        &symbols,
        &[("p", &["a"], Truth::True), ("p", &["b"], Truth::Unknown)],
    );
    let result = ev
        .evaluate("isEmpty", &[symbols.constant("p")], &interp)
        .unwrap();
    assert!(!result.is_provisional());
    assert_eq!(result.truth_of(&[]), Truth::True);
}

#[test]
fn context_checks_output_arity() {
    let symbols = setup();
    let descriptor = AtomDescriptor::new("f", &[InputKind::Constant], 1);
    let input = [symbols.constant("x")];
    let ctx = EvalContext::new(&symbols, &descriptor, &input);
    let err = ctx.store_output_atom(&[]).unwrap_err();
    assert!(matches!(err, StoreError::MalformedTuple { .. }));

    let out = ctx.store_output_atom(&[symbols.integer(2)]).unwrap();
    assert_eq!(symbols.render(out).unwrap(), "aux_t_2_f(x,2)");
}

#[test]
fn context_rejects_data_literals() {
    let symbols = setup();
    let descriptor = AtomDescriptor::new("f", &[], 0);
    let mut ctx = EvalContext::new(&symbols, &descriptor, &[]);
    let err = ctx.learn(Nogood::new([symbols.integer(1)])).unwrap_err();
    assert!(matches!(err, StoreError::NotALiteral { .. }));
    assert!(ctx.learned().is_empty());

    let err = ctx.learn(Nogood::default()).unwrap_err();
    assert_eq!(err, StoreError::EmptyNogood);

    let p = symbols.constant("p");
    ctx.learn(Nogood::new([p])).unwrap();
    assert_eq!(ctx.into_learned(), vec![Nogood::new([p])]);
}

#[test]
fn interpretation_builder_feeds_evaluation() {
    let symbols = setup();
    let ev = evaluator(&symbols);
    let p = symbols.constant("p");
    let one = symbols.integer(1);
    let p_1 = symbols.atom(&[p, one]).unwrap();
    let mut builder = InterpretationBuilder::new(&symbols);
    builder.assign(p_1, Truth::True).unwrap();
    let interp = builder.build();
    let result = ev.evaluate("id", &[p], &interp).unwrap();
    assert!(result.answer().is_true(&[one]));
}
