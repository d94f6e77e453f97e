use crate::eval::Evaluator;
use crate::interpretation::{Interpretation, InterpretationBuilder};
use crate::plugins::{StringPlugin, TestPlugin};
use crate::symbol::{Symbol, SymbolTable, Truth};
use std::sync::Arc;

pub(crate) fn setup() -> Arc<SymbolTable> {
    Arc::new(SymbolTable::new())
}

/// Store `pred(args...)` with constant arguments.
pub(crate) fn atom(symbols: &SymbolTable, pred: &str, args: &[&str]) -> Symbol {
    let args: Vec<Symbol> = args.iter().map(|a| symbols.constant(a)).collect();
    symbols
        .function(pred, &args)
        .expect("constant arguments always form an atom")
}

/// Interpretation over unary and nullary atoms given as `(pred, args, truth)`.
pub(crate) fn interpretation(
    symbols: &SymbolTable,
    atoms: &[(&str, &[&str], Truth)],
) -> Interpretation {
    let mut builder = InterpretationBuilder::new(symbols);
    for &(pred, args, truth) in atoms {
        builder
            .assign(atom(symbols, pred, args), truth)
            .expect("test atoms are well formed");
    }
    builder.build()
}

/// Evaluator with both bundled plugins loaded.
pub(crate) fn evaluator(symbols: &Arc<SymbolTable>) -> Evaluator {
    let mut evaluator = Evaluator::new(Arc::clone(symbols));
    evaluator
        .register(&StringPlugin)
        .expect("string plugin registers");
    evaluator
        .register(&TestPlugin)
        .expect("test plugin registers");
    evaluator
}
