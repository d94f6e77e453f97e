//! Host side of the external atom protocol.
//!
//! The [`Evaluator`] is what a solver's search loop calls whenever it needs
//! the value of an external atom under the current interpretation:
//!
//! 1. check the bound input against the atom's descriptor
//! 2. run `retrieve` with a fresh [`EvalContext`]
//! 3. check the answer against the output arity and partial-answer setting
//! 4. derive input/output nogoods if the atom allows it
//! 5. commit learned nogoods to the session's [`NogoodDb`]
//!
//! A failing evaluation leaves no trace in the nogood database.

use std::sync::Arc;

use crate::answer::Answer;
use crate::config::EvaluatorConfig;
use crate::error::{DescriptorError, EvalError, StoreError};
use crate::interpretation::Interpretation;
use crate::metrics::EvalMetrics;
use crate::nogood::{Nogood, NogoodDb};
use crate::plugin::{AtomDescriptor, InputKind, Plugin, PluginAtom};
use crate::query::Query;
use crate::registry::Registry;
use crate::store::{SolverContext, SymbolStore};
use crate::symbol::{Symbol, SymbolKind, SymbolTable, Truth, Tuple};
use crate::trace::{debug, debug_span, trace, warn};

/// Name of the replacement predicate standing for `&name` with `arity`
/// input plus output arguments.
pub fn replacement_predicate(name: &str, arity: usize) -> String {
    format!("aux_t_{}_{}", arity, name)
}

/// Per-call context handed to `retrieve`.
///
/// Nogoods learned here stay pending until the evaluation succeeds.
pub struct EvalContext<'a> {
    symbols: &'a SymbolTable,
    descriptor: &'a AtomDescriptor,
    input: &'a [Symbol],
    learned: Vec<Nogood>,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        descriptor: &'a AtomDescriptor,
        input: &'a [Symbol],
    ) -> Self {
        Self {
            symbols,
            descriptor,
            input,
            learned: Vec::new(),
        }
    }

    /// Nogoods submitted so far, in submission order.
    pub fn learned(&self) -> &[Nogood] {
        &self.learned
    }

    pub fn into_learned(self) -> Vec<Nogood> {
        self.learned
    }
}

impl SymbolStore for EvalContext<'_> {
    fn store_constant(&self, text: &str) -> Symbol {
        self.symbols.constant(text)
    }

    fn store_string(&self, text: &str) -> Symbol {
        self.symbols.string(text)
    }

    fn store_integer(&self, value: i64) -> Symbol {
        self.symbols.integer(value)
    }

    fn store_atom(&self, tuple: &[Symbol]) -> Result<Symbol, StoreError> {
        self.symbols.atom(tuple)
    }

    fn store_output_atom(&self, tuple: &[Symbol]) -> Result<Symbol, StoreError> {
        if tuple.len() != self.descriptor.output_arity {
            return Err(StoreError::malformed(format!(
                "output tuple of length {} for &{} with output arity {}",
                tuple.len(),
                self.descriptor.predicate,
                self.descriptor.output_arity
            )));
        }
        let mut args: Tuple = Tuple::with_capacity(self.input.len() + tuple.len());
        args.extend_from_slice(self.input);
        args.extend_from_slice(tuple);
        let name = replacement_predicate(&self.descriptor.predicate, args.len());
        self.symbols.function(&name, &args)
    }
}

impl SolverContext for EvalContext<'_> {
    fn symbols(&self) -> &SymbolTable {
        self.symbols
    }

    fn learn(&mut self, nogood: Nogood) -> Result<(), StoreError> {
        if nogood.is_empty() {
            return Err(StoreError::EmptyNogood);
        }
        for &literal in nogood.literals() {
            if self.symbols.resolve(literal).is_none() {
                return Err(StoreError::UnknownSymbol {
                    index: literal.index(),
                });
            }
            if !self.symbols.is_atom(literal) {
                return Err(StoreError::NotALiteral {
                    symbol: self.symbols.render_lossy(literal),
                });
            }
        }
        trace!(
            predicate = %self.descriptor.predicate,
            size = nogood.len(),
            "plugin learned nogood"
        );
        self.learned.push(nogood);
        Ok(())
    }
}

/// Result of one successful evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    answer: Answer,
    outputs: Vec<(Symbol, Truth)>,
    learned: Vec<Nogood>,
    /// Answer computed on a partial interpretation by an atom that cannot
    /// answer partially.
    provisional: bool,
}

impl Evaluation {
    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    /// Replacement atoms for every reported tuple with their truth value.
    pub fn output_atoms(&self) -> &[(Symbol, Truth)] {
        &self.outputs
    }

    /// Nogoods that this evaluation added to the database.
    pub fn learned(&self) -> &[Nogood] {
        &self.learned
    }

    /// Truth of the external atom for an output tuple.
    ///
    /// If the interpretation was partial and the atom cannot answer
    /// partially, every tuple is unknown, reported or not.
    pub fn truth_of(&self, tuple: &[Symbol]) -> Truth {
        if self.provisional || self.answer.is_unknown(tuple) {
            Truth::Unknown
        } else {
            Truth::from(self.answer.is_true(tuple))
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional
    }
}

/// Evaluates registered external atoms for one solving session.
///
/// Owns the plugin registry and the session's nogood database and shares the
/// symbol table with the solver.
pub struct Evaluator {
    registry: Registry,
    symbols: Arc<SymbolTable>,
    nogoods: NogoodDb,
    config: EvaluatorConfig,
    metrics: EvalMetrics,
}

impl Evaluator {
    pub fn new(symbols: Arc<SymbolTable>) -> Self {
        Self::with_config(symbols, EvaluatorConfig::default())
    }

    pub fn with_config(symbols: Arc<SymbolTable>, config: EvaluatorConfig) -> Self {
        Self {
            registry: Registry::new(),
            symbols,
            nogoods: NogoodDb::new(),
            config,
            metrics: EvalMetrics::new(),
        }
    }

    /// Load a plugin. A rejected plugin does not affect earlier ones.
    pub fn register(&mut self, plugin: &dyn Plugin) -> Result<usize, DescriptorError> {
        self.registry.register(plugin)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn nogoods(&self) -> &NogoodDb {
        &self.nogoods
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &EvalMetrics {
        &self.metrics
    }

    /// Evaluate `&predicate[input]` under `interpretation`.
    pub fn evaluate(
        &self,
        predicate: &str,
        input: &[Symbol],
        interpretation: &Interpretation,
    ) -> Result<Evaluation, EvalError> {
        let result = self.evaluate_inner(predicate, input, interpretation);
        if let Err(_err) = &result {
            self.metrics.record_failure();
            warn!(predicate, error = %_err, "external atom evaluation failed");
        }
        result
    }

    fn evaluate_inner(
        &self,
        predicate: &str,
        input: &[Symbol],
        interpretation: &Interpretation,
    ) -> Result<Evaluation, EvalError> {
        let atom = self
            .registry
            .get(predicate)
            .ok_or_else(|| EvalError::UnknownAtom {
                predicate: predicate.to_string(),
            })?;
        let descriptor = atom.descriptor();
        self.check_input(descriptor, input)?;

        let _span = debug_span!("retrieve", predicate, inputs = input.len()).entered();

        let query = Query::new(input, interpretation, &self.symbols);
        let mut ctx = EvalContext::new(&self.symbols, descriptor, input);
        let mut answer = atom.retrieve(&mut ctx, &query)?;

        self.check_answer(descriptor, &mut answer)?;

        let derived = if self.config.input_output_learning
            && descriptor.properties.do_input_output_learning
        {
            self.input_output_nogoods(&ctx, atom, input, interpretation, &answer)?
        } else {
            Vec::new()
        };

        let provisional =
            interpretation.is_partial() && !descriptor.properties.provides_partial_answer;
        let reported = if provisional { Truth::Unknown } else { Truth::True };

        let mut outputs =
            Vec::with_capacity(answer.true_tuples().len() + answer.unknown_tuples().len());
        for (tuples, truth) in [
            (answer.true_tuples(), reported),
            (answer.unknown_tuples(), Truth::Unknown),
        ] {
            for tuple in tuples {
                outputs.push((ctx.store_output_atom(tuple)?, truth));
            }
        }

        let mut learned = Vec::new();
        for (nogood, is_derived) in ctx
            .into_learned()
            .into_iter()
            .map(|n| (n, false))
            .chain(derived.into_iter().map(|n| (n, true)))
        {
            let new = self.nogoods.insert(nogood.clone());
            self.metrics.record_nogood(is_derived, new);
            if new {
                learned.push(nogood);
            }
        }

        self.metrics
            .record_evaluation(answer.true_tuples().len(), answer.unknown_tuples().len());
        debug!(
            true_tuples = answer.true_tuples().len(),
            unknown_tuples = answer.unknown_tuples().len(),
            nogoods = learned.len(),
            "retrieve finished"
        );

        Ok(Evaluation {
            answer,
            outputs,
            learned,
            provisional,
        })
    }

    fn check_input(&self, descriptor: &AtomDescriptor, input: &[Symbol]) -> Result<(), EvalError> {
        if !descriptor.accepts_input_len(input.len()) {
            let expected = if descriptor.has_tuple_input() {
                format!("at least {}", descriptor.fixed_inputs())
            } else {
                descriptor.inputs.len().to_string()
            };
            return Err(EvalError::InputArity {
                predicate: descriptor.predicate.clone(),
                expected,
                actual: input.len(),
            });
        }
        for (index, &sym) in input.iter().enumerate() {
            if sym.is_negated() || self.symbols.resolve(sym).is_none() {
                return Err(EvalError::InputKind {
                    predicate: descriptor.predicate.clone(),
                    index,
                    symbol: self.symbols.render_lossy(sym),
                });
            }
            let is_predicate_name =
                self.symbols.kind(sym) == Some(SymbolKind::Constant) && self.symbols.is_atom(sym);
            if descriptor.kind_at(index) == Some(InputKind::Predicate) && !is_predicate_name {
                return Err(EvalError::InputKind {
                    predicate: descriptor.predicate.clone(),
                    index,
                    symbol: self.symbols.render_lossy(sym),
                });
            }
        }
        Ok(())
    }

    fn check_answer(&self, descriptor: &AtomDescriptor, answer: &mut Answer) -> Result<(), EvalError> {
        for tuple in answer.true_tuples().iter().chain(answer.unknown_tuples()) {
            if tuple.len() != descriptor.output_arity {
                return Err(EvalError::OutputArity {
                    predicate: descriptor.predicate.clone(),
                    expected: descriptor.output_arity,
                    actual: tuple.len(),
                });
            }
        }
        if !answer.unknown_tuples().is_empty() && !descriptor.properties.provides_partial_answer {
            if self.config.strict_partial_answers {
                return Err(EvalError::UnexpectedUnknown {
                    predicate: descriptor.predicate.clone(),
                });
            }
            let dropped = answer.unknown_tuples().len();
            warn!(
                predicate = %descriptor.predicate,
                dropped,
                "dropping unknown tuples from atom without partial answers"
            );
            self.metrics.record_dropped(dropped);
            answer.clear_unknown();
        }
        Ok(())
    }

    /// One nogood per true output tuple: the input literals that justified
    /// it together with the negated output atom.
    ///
    /// True input atoms are kept unless the argument is antimonotonic, false
    /// ones unless it is monotonic. An undecided atom under a non-monotonic
    /// argument means the answer could still change, so nothing is derived.
    fn input_output_nogoods(
        &self,
        ctx: &EvalContext<'_>,
        atom: &PluginAtom,
        input: &[Symbol],
        interpretation: &Interpretation,
        answer: &Answer,
    ) -> Result<Vec<Nogood>, EvalError> {
        let descriptor = atom.descriptor();
        let props = &descriptor.properties;
        let mut premise = Vec::new();
        for (index, &pred) in input.iter().enumerate() {
            if descriptor.kind_at(index) != Some(InputKind::Predicate) {
                continue;
            }
            for (input_atom, truth) in interpretation.atoms() {
                if self.symbols.head(input_atom) != Some(pred) {
                    continue;
                }
                match truth {
                    Truth::True if !props.is_antimonotonic(index) => premise.push(input_atom),
                    Truth::False if !props.is_monotonic(index) => premise.push(input_atom.flip()),
                    Truth::Unknown if !props.is_monotonic(index) => {
                        trace!(
                            predicate = %descriptor.predicate,
                            "undecided input, skipping input/output learning"
                        );
                        return Ok(Vec::new());
                    }
                    _ => {}
                }
            }
        }

        let mut nogoods = Vec::with_capacity(answer.true_tuples().len());
        for tuple in answer.true_tuples() {
            let output = ctx.store_output_atom(tuple)?;
            nogoods.push(Nogood::new(
                premise.iter().copied().chain(std::iter::once(output.flip())),
            ));
        }
        Ok(nogoods)
    }
}

#[cfg(test)]
#[path = "tests/eval.rs"]
mod tests;
