//! Plugin-facing store and learning surface.
//!
//! A plugin never sees the solver directly: everything it may do besides
//! returning an [`Answer`](crate::answer::Answer) goes through a
//! [`SolverContext`]. Both storing and learning are monotone: storing an
//! existing symbol returns the existing handle and learning an existing
//! nogood is a no-op.

use crate::error::StoreError;
use crate::nogood::Nogood;
use crate::symbol::{Symbol, SymbolTable};

/// Canonicalizes symbols produced by a plugin into the solver's symbol space.
pub trait SymbolStore {
    fn store_constant(&self, text: &str) -> Symbol;

    /// Store `text` wrapped as a quoted string constant.
    fn store_string(&self, text: &str) -> Symbol;

    fn store_integer(&self, value: i64) -> Symbol;

    /// Store the atom `tuple[0](tuple[1], ...)`.
    fn store_atom(&self, tuple: &[Symbol]) -> Result<Symbol, StoreError>;

    /// Store the atom denoting this external atom's output for `tuple`
    /// under the current input.
    fn store_output_atom(&self, tuple: &[Symbol]) -> Result<Symbol, StoreError>;
}

/// Everything `retrieve` may touch besides its query.
pub trait SolverContext: SymbolStore {
    /// Read access to the shared symbol table.
    fn symbols(&self) -> &SymbolTable;

    /// Submit a nogood to the solver.
    fn learn(&mut self, nogood: Nogood) -> Result<(), StoreError>;

    /// Negate a literal, rejecting data symbols.
    fn negate(&self, sym: Symbol) -> Result<Symbol, StoreError> {
        self.symbols().negate(sym)
    }
}
