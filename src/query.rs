use crate::interpretation::Interpretation;
use crate::symbol::{Symbol, SymbolTable, Tuple};
use rustc_hash::FxHashSet;

/// Input of one evaluation: the bound input arguments and the interpretation
/// they are evaluated against.
#[derive(Clone, Copy)]
pub struct Query<'a> {
    input: &'a [Symbol],
    interpretation: &'a Interpretation,
    symbols: &'a SymbolTable,
}

impl<'a> Query<'a> {
    pub fn new(
        input: &'a [Symbol],
        interpretation: &'a Interpretation,
        symbols: &'a SymbolTable,
    ) -> Self {
        Self {
            input,
            interpretation,
            symbols,
        }
    }

    /// All input arguments. A trailing tuple input is flattened into the end.
    pub fn input(&self) -> &'a [Symbol] {
        self.input
    }

    /// Input argument at `index`.
    pub fn arg(&self, index: usize) -> Option<Symbol> {
        self.input.get(index).copied()
    }

    /// Arguments from `start` on, i.e. the variable-length tuple segment.
    pub fn rest(&self, start: usize) -> &'a [Symbol] {
        self.input.get(start..).unwrap_or(&[])
    }

    pub fn interpretation(&self) -> &'a Interpretation {
        self.interpretation
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    /// Shorthand for `interpretation().extension(predicate)`.
    pub fn extension(&self, predicate: Symbol) -> FxHashSet<Tuple> {
        self.interpretation.extension(predicate)
    }
}
