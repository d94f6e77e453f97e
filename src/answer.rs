use crate::symbol::{Symbol, Tuple};
use rustc_hash::FxHashSet;

/// Output of one `retrieve` call.
///
/// True tuples are certainly in the output relation. Unknown tuples may or
/// may not be and are only meaningful for atoms that provide partial answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    true_tuples: FxHashSet<Tuple>,
    unknown_tuples: FxHashSet<Tuple>,
}

impl Answer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `tuple` as true. Returns false if it was already reported.
    pub fn output(&mut self, tuple: impl IntoIterator<Item = Symbol>) -> bool {
        let tuple: Tuple = tuple.into_iter().collect();
        self.unknown_tuples.remove(&tuple);
        self.true_tuples.insert(tuple)
    }

    /// Report `tuple` as unknown. Ignored if the tuple is already true.
    pub fn output_unknown(&mut self, tuple: impl IntoIterator<Item = Symbol>) -> bool {
        let tuple: Tuple = tuple.into_iter().collect();
        if self.true_tuples.contains(&tuple) {
            return false;
        }
        self.unknown_tuples.insert(tuple)
    }

    pub fn true_tuples(&self) -> &FxHashSet<Tuple> {
        &self.true_tuples
    }

    pub fn unknown_tuples(&self) -> &FxHashSet<Tuple> {
        &self.unknown_tuples
    }

    pub fn is_true(&self, tuple: &[Symbol]) -> bool {
        self.true_tuples.contains(tuple)
    }

    pub fn is_unknown(&self, tuple: &[Symbol]) -> bool {
        self.unknown_tuples.contains(tuple)
    }

    pub fn is_empty(&self) -> bool {
        self.true_tuples.is_empty() && self.unknown_tuples.is_empty()
    }

    pub(crate) fn clear_unknown(&mut self) {
        self.unknown_tuples.clear();
    }
}
