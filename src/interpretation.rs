use crate::error::StoreError;
use crate::symbol::{Symbol, SymbolTable, Truth, Tuple};
use rustc_hash::{FxHashMap, FxHashSet};

/// Read-only snapshot of the input atoms relevant to one evaluation.
///
/// Atoms that were never assigned are false. Undecided atoms make the
/// snapshot partial; they never show up in [`Interpretation::extension`]
/// or [`Interpretation::true_atoms`].
#[derive(Debug, Clone, Default)]
pub struct Interpretation {
    /// Input atoms in assignment order with their truth value.
    atoms: Vec<(Symbol, Truth)>,
    truth: FxHashMap<Symbol, Truth>,
    /// Argument tuples of decided-true atoms, keyed by predicate constant.
    extensions: FxHashMap<Symbol, FxHashSet<Tuple>>,
    undecided: usize,
}

impl Interpretation {
    /// Truth of a literal. Negated handles report the complement.
    pub fn truth(&self, literal: Symbol) -> Truth {
        let value = self
            .truth
            .get(&literal.positive())
            .copied()
            .unwrap_or(Truth::False);
        if literal.is_negated() {
            value.negate()
        } else {
            value
        }
    }

    pub fn is_true(&self, literal: Symbol) -> bool {
        self.truth(literal).is_true()
    }

    /// All input atoms with their truth value, in assignment order.
    pub fn atoms(&self) -> impl Iterator<Item = (Symbol, Truth)> + '_ {
        self.atoms.iter().copied()
    }

    pub fn true_atoms(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.atoms
            .iter()
            .filter(|(_, t)| t.is_true())
            .map(|(sym, _)| *sym)
    }

    /// True and undecided input atoms.
    pub fn possibly_true_atoms(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.atoms
            .iter()
            .filter(|(_, t)| !t.is_false())
            .map(|(sym, _)| *sym)
    }

    /// Whether some input atom is still undecided.
    pub fn is_partial(&self) -> bool {
        self.undecided > 0
    }

    /// Every argument tuple `args` such that `predicate(args...)` is true.
    ///
    /// Anything that is not a predicate constant yields the empty set.
    pub fn extension(&self, predicate: Symbol) -> FxHashSet<Tuple> {
        self.extensions.get(&predicate).cloned().unwrap_or_default()
    }

    /// Predicate constants with a non-empty extension.
    pub fn predicates(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.extensions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Solver-side construction of an [`Interpretation`].
pub struct InterpretationBuilder<'a> {
    symbols: &'a SymbolTable,
    order: Vec<Symbol>,
    truth: FxHashMap<Symbol, Truth>,
}

impl<'a> InterpretationBuilder<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            order: Vec::new(),
            truth: FxHashMap::default(),
        }
    }

    /// Assign a truth value to a positive atom. A later assignment of the
    /// same atom overrides the earlier one.
    pub fn assign(&mut self, atom: Symbol, truth: Truth) -> Result<&mut Self, StoreError> {
        if atom.is_negated() || !self.symbols.is_atom(atom) {
            return Err(StoreError::NotAnAtom {
                symbol: self.symbols.render_lossy(atom),
            });
        }
        if self.truth.insert(atom, truth).is_none() {
            self.order.push(atom);
        }
        Ok(self)
    }

    pub fn build(self) -> Interpretation {
        let mut atoms = Vec::with_capacity(self.order.len());
        let mut extensions: FxHashMap<Symbol, FxHashSet<Tuple>> = FxHashMap::default();
        let mut undecided = 0;
        for atom in self.order {
            let truth = self.truth[&atom];
            atoms.push((atom, truth));
            match truth {
                Truth::True => {
                    // assign() only admits atoms, which always have a head
                    if let Some(head) = self.symbols.head(atom) {
                        extensions
                            .entry(head)
                            .or_default()
                            .insert(self.symbols.arguments(atom));
                    }
                }
                Truth::Unknown => undecided += 1,
                Truth::False => {}
            }
        }
        Interpretation {
            atoms,
            truth: self.truth,
            extensions,
            undecided,
        }
    }
}

#[cfg(test)]
#[path = "tests/interpretation.rs"]
mod tests;
