//! External atom descriptors and the plugin surface.
//!
//! An external atom is registered by value: an [`AtomDescriptor`] carrying
//! its static signature plus a plain [`RetrieveFn`] implementing its
//! semantics. Plugins hold no mutable state shared between evaluations.

use crate::answer::Answer;
use crate::error::{DescriptorError, EvalError};
use crate::query::Query;
use crate::store::SolverContext;
use crate::symbol::is_identifier;
use smallvec::SmallVec;
use std::fmt;

/// Kind of an input argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// A predicate name; the atom reads the predicate's extension.
    Predicate,
    /// A single ground term.
    Constant,
    /// Any number of trailing ground terms. Only valid as the last input.
    Tuple,
}

/// Optional properties of an external source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtSourceProperties {
    /// The atom may report unknown tuples on partial interpretations.
    pub provides_partial_answer: bool,
    /// The host may derive input/output nogoods automatically.
    pub do_input_output_learning: bool,
    /// Output positions whose value domain is finite.
    pub finite_output_domain: SmallVec<[usize; 2]>,
    /// Predicate inputs in which the atom is monotonic.
    pub monotonic_inputs: SmallVec<[usize; 2]>,
    /// Predicate inputs in which the atom is antimonotonic.
    pub antimonotonic_inputs: SmallVec<[usize; 2]>,
}

impl Default for ExtSourceProperties {
    fn default() -> Self {
        Self {
            provides_partial_answer: false,
            do_input_output_learning: true,
            finite_output_domain: SmallVec::new(),
            monotonic_inputs: SmallVec::new(),
            antimonotonic_inputs: SmallVec::new(),
        }
    }
}

impl ExtSourceProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partial_answer(mut self, on: bool) -> Self {
        self.provides_partial_answer = on;
        self
    }

    pub fn input_output_learning(mut self, on: bool) -> Self {
        self.do_input_output_learning = on;
        self
    }

    pub fn finite_output(mut self, index: usize) -> Self {
        self.finite_output_domain.push(index);
        self
    }

    pub fn monotonic(mut self, index: usize) -> Self {
        self.monotonic_inputs.push(index);
        self
    }

    pub fn antimonotonic(mut self, index: usize) -> Self {
        self.antimonotonic_inputs.push(index);
        self
    }

    pub fn is_monotonic(&self, index: usize) -> bool {
        self.monotonic_inputs.contains(&index)
    }

    pub fn is_antimonotonic(&self, index: usize) -> bool {
        self.antimonotonic_inputs.contains(&index)
    }
}

/// Static signature of an external atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomDescriptor {
    pub predicate: String,
    pub inputs: Vec<InputKind>,
    pub output_arity: usize,
    pub properties: ExtSourceProperties,
}

impl AtomDescriptor {
    pub fn new(predicate: impl Into<String>, inputs: &[InputKind], output_arity: usize) -> Self {
        Self {
            predicate: predicate.into(),
            inputs: inputs.to_vec(),
            output_arity,
            properties: ExtSourceProperties::default(),
        }
    }

    pub fn with_properties(mut self, properties: ExtSourceProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Whether the last input is a variable-length tuple.
    pub fn has_tuple_input(&self) -> bool {
        self.inputs.last() == Some(&InputKind::Tuple)
    }

    /// Number of fixed input positions before a trailing tuple, if any.
    pub fn fixed_inputs(&self) -> usize {
        if self.has_tuple_input() {
            self.inputs.len() - 1
        } else {
            self.inputs.len()
        }
    }

    /// Input kind of argument `index` after tuple flattening.
    pub fn kind_at(&self, index: usize) -> Option<InputKind> {
        match self.inputs.get(index) {
            Some(kind) => Some(*kind),
            None if self.has_tuple_input() => Some(InputKind::Tuple),
            None => None,
        }
    }

    /// Whether `count` input arguments fit this signature.
    pub fn accepts_input_len(&self, count: usize) -> bool {
        if self.has_tuple_input() {
            count >= self.fixed_inputs()
        } else {
            count == self.inputs.len()
        }
    }

    /// Check the descriptor for internal consistency.
    pub fn validate(&self, plugin: &str) -> Result<(), DescriptorError> {
        if self.predicate.is_empty() {
            return Err(DescriptorError::EmptyPredicate {
                plugin: plugin.to_string(),
            });
        }
        if !is_identifier(&self.predicate) {
            return Err(DescriptorError::InvalidPredicate {
                plugin: plugin.to_string(),
                predicate: self.predicate.clone(),
            });
        }
        for (index, kind) in self.inputs.iter().enumerate() {
            if *kind == InputKind::Tuple && index + 1 != self.inputs.len() {
                return Err(DescriptorError::TupleNotLast {
                    predicate: self.predicate.clone(),
                    index,
                });
            }
        }
        let props = &self.properties;
        for (indices, property) in [
            (&props.monotonic_inputs, "monotonic"),
            (&props.antimonotonic_inputs, "antimonotonic"),
        ] {
            for &index in indices.iter() {
                if self.inputs.get(index) != Some(&InputKind::Predicate) {
                    return Err(DescriptorError::NotAPredicateInput {
                        predicate: self.predicate.clone(),
                        index,
                        property,
                    });
                }
            }
        }
        if let Some(&index) = props
            .monotonic_inputs
            .iter()
            .find(|&&i| props.antimonotonic_inputs.contains(&i))
        {
            return Err(DescriptorError::ConflictingMonotonicity {
                predicate: self.predicate.clone(),
                index,
            });
        }
        if let Some(&index) = props
            .finite_output_domain
            .iter()
            .find(|&&i| i >= self.output_arity)
        {
            return Err(DescriptorError::OutputIndexOutOfRange {
                predicate: self.predicate.clone(),
                index,
                arity: self.output_arity,
            });
        }
        Ok(())
    }
}

/// Semantics of an external atom.
///
/// Must be total for well-formed input, must not keep state between calls,
/// and may only affect the solver through `ctx`.
pub type RetrieveFn = fn(&mut dyn SolverContext, &Query<'_>) -> Result<Answer, EvalError>;

/// A registered external atom: descriptor plus evaluation entry point.
#[derive(Clone)]
pub struct PluginAtom {
    descriptor: AtomDescriptor,
    retrieve: RetrieveFn,
}

impl PluginAtom {
    pub fn new(descriptor: AtomDescriptor, retrieve: RetrieveFn) -> Self {
        Self {
            descriptor,
            retrieve,
        }
    }

    pub fn descriptor(&self) -> &AtomDescriptor {
        &self.descriptor
    }

    pub fn predicate(&self) -> &str {
        &self.descriptor.predicate
    }

    pub fn retrieve(
        &self,
        ctx: &mut dyn SolverContext,
        query: &Query<'_>,
    ) -> Result<Answer, EvalError> {
        (self.retrieve)(ctx, query)
    }
}

impl fmt::Debug for PluginAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginAtom")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// A collection of external atoms loaded together.
pub trait Plugin {
    /// Unique identifier used in diagnostics.
    fn name(&self) -> &str;

    /// Called once at registration.
    fn create_atoms(&self) -> Vec<PluginAtom>;
}

#[cfg(test)]
#[path = "tests/plugin.rs"]
mod tests;
