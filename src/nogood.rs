use crate::symbol::{Symbol, Truth};
use dashmap::DashSet;
use parking_lot::Mutex;
use smallvec::SmallVec;

/// A set of signed literals that must never hold together.
///
/// A positive handle is the assumption that the atom is true, a negated
/// handle that it is false. Literals are kept sorted and deduplicated, so
/// nogoods over the same literal set compare and hash equal regardless of
/// construction order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Nogood {
    literals: SmallVec<[Symbol; 4]>,
}

impl Nogood {
    pub fn new(literals: impl IntoIterator<Item = Symbol>) -> Self {
        let mut literals: SmallVec<[Symbol; 4]> = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Self { literals }
    }

    pub fn literals(&self) -> &[Symbol] {
        &self.literals
    }

    pub fn contains(&self, literal: Symbol) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Contains some literal together with its complement, so it can never
    /// be violated.
    pub fn is_trivial(&self) -> bool {
        // complements differ only in the low bit and are adjacent once sorted
        self.literals
            .windows(2)
            .any(|w| w[0].positive() == w[1].positive())
    }

    /// Whether the nogood is violated under an assignment of atoms.
    ///
    /// `True` if every literal holds, `False` if some literal is falsified,
    /// `Unknown` otherwise.
    pub fn status(&self, mut truth_of: impl FnMut(Symbol) -> Truth) -> Truth {
        let mut status = Truth::True;
        for &literal in &self.literals {
            let atom = truth_of(literal.positive());
            let holds = if literal.is_negated() {
                atom.negate()
            } else {
                atom
            };
            match holds {
                Truth::False => return Truth::False,
                Truth::Unknown => status = Truth::Unknown,
                Truth::True => {}
            }
        }
        status
    }
}

impl FromIterator<Symbol> for Nogood {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Nogood::new(iter)
    }
}

/// Solver-owned nogood database.
///
/// Append-only for the lifetime of a solving session. Lookups may run
/// concurrently with each other; insertions are expected from a single
/// evaluation loop.
pub struct NogoodDb {
    seen: DashSet<Nogood>,
    log: Mutex<Vec<Nogood>>,
}

impl NogoodDb {
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Add a nogood. Returns true if it was new. Trivial and empty nogoods
    /// are not stored.
    pub fn insert(&self, nogood: Nogood) -> bool {
        if nogood.is_empty() || nogood.is_trivial() {
            return false;
        }
        if !self.seen.insert(nogood.clone()) {
            return false;
        }
        self.log.lock().push(nogood);
        true
    }

    pub fn contains(&self, nogood: &Nogood) -> bool {
        self.seen.contains(nogood)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// All stored nogoods in insertion order.
    pub fn snapshot(&self) -> Vec<Nogood> {
        self.log.lock().clone()
    }

    /// Nogoods inserted after the first `from` ones.
    pub fn since(&self, from: usize) -> Vec<Nogood> {
        let log = self.log.lock();
        log.get(from..).map(<[Nogood]>::to_vec).unwrap_or_default()
    }
}

impl Default for NogoodDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/nogood.rs"]
mod tests;
