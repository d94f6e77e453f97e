use lasso::{Spur, ThreadedRodeo};

/// Key of an interned name. Predicates, function symbols, constants and
/// quoted strings all share one name space.
pub type NameId = Spur;

/// Text of every name the solver and its plugins have stored.
///
/// Interning the same text twice yields the same key, and a key resolves
/// back to its text for as long as the table lives. Names are only ever
/// added, so keys held by learned nogoods stay valid.
pub struct NameTable {
    rodeo: ThreadedRodeo,
}

impl NameTable {
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    pub fn intern(&self, name: &str) -> NameId {
        self.rodeo.get_or_intern(name)
    }

    /// None for keys minted by another table.
    pub fn resolve(&self, id: NameId) -> Option<&str> {
        self.rodeo.try_resolve(&id)
    }

    /// Key of `name` if it was interned before.
    pub fn get(&self, name: &str) -> Option<NameId> {
        self.rodeo.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rodeo.contains(name)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/name.rs"]
mod tests;
