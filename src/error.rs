//! Error types for the external atom protocol.
//!
//! - [`StoreError`]: a symbol could not be stored or used as a literal.
//!   Recoverable per call.
//! - [`DescriptorError`]: a plugin or atom descriptor is malformed. Detected
//!   at registration and fatal only to the plugin being loaded.
//! - [`EvalError`]: one evaluation of one atom failed. Isolated to that query.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("malformed tuple: {reason}")]
    MalformedTuple { reason: String },

    #[error("symbol {symbol} is not a literal and cannot be negated or learned")]
    NotALiteral { symbol: String },

    #[error("symbol {symbol} is not an atom")]
    NotAnAtom { symbol: String },

    #[error("an empty nogood would make every interpretation inconsistent")]
    EmptyNogood,

    #[error("unknown symbol handle #{index}")]
    UnknownSymbol { index: u32 },
}

impl StoreError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        StoreError::MalformedTuple {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("plugin name must not be empty")]
    EmptyPluginName,

    #[error("plugin {plugin}: external atom predicate name must not be empty")]
    EmptyPredicate { plugin: String },

    #[error("plugin {plugin}: invalid predicate name {predicate:?}")]
    InvalidPredicate { plugin: String, predicate: String },

    #[error("&{predicate}: tuple input at position {index} must be the last input")]
    TupleNotLast { predicate: String, index: usize },

    #[error("&{predicate}: input {index} declared {property} but is not a predicate input")]
    NotAPredicateInput {
        predicate: String,
        index: usize,
        property: &'static str,
    },

    #[error("&{predicate}: input {index} declared both monotonic and antimonotonic")]
    ConflictingMonotonicity { predicate: String, index: usize },

    #[error("&{predicate}: finite output domain index {index} exceeds output arity {arity}")]
    OutputIndexOutOfRange {
        predicate: String,
        index: usize,
        arity: usize,
    },

    #[error("&{predicate} from plugin {plugin} is already defined by plugin {existing}")]
    DuplicatePredicate {
        predicate: String,
        plugin: String,
        existing: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("no external atom &{predicate} is registered")]
    UnknownAtom { predicate: String },

    #[error("&{predicate} expects {expected} input arguments, got {actual}")]
    InputArity {
        predicate: String,
        expected: String,
        actual: usize,
    },

    #[error("&{predicate}: input {index} has the wrong kind: {symbol}")]
    InputKind {
        predicate: String,
        index: usize,
        symbol: String,
    },

    #[error("&{predicate} returned a tuple of length {actual}, output arity is {expected}")]
    OutputArity {
        predicate: String,
        expected: usize,
        actual: usize,
    },

    #[error("&{predicate} returned unknown tuples but does not provide partial answers")]
    UnexpectedUnknown { predicate: String },

    #[error("&{predicate} failed: {message}")]
    Plugin { predicate: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EvalError {
    /// Convenience constructor for failures raised inside `retrieve`.
    pub fn plugin(predicate: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Plugin {
            predicate: predicate.into(),
            message: message.into(),
        }
    }
}
