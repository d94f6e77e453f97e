//! Reference plugins exercising the protocol.

pub mod string;
pub mod testing;

pub use string::StringPlugin;
pub use testing::TestPlugin;

use crate::error::EvalError;
use crate::query::Query;
use crate::symbol::{is_quoted, unquote, Symbol, SymbolTable};

/// Text of `sym` for string building: quoted constants lose their quotes,
/// everything else is rendered. The flag reports whether quotes were removed.
pub(crate) fn string_operand(symbols: &SymbolTable, sym: Symbol) -> Result<(String, bool), EvalError> {
    let text = symbols.render(sym)?;
    if is_quoted(&text) {
        Ok((unquote(&text), true))
    } else {
        Ok((text, false))
    }
}

/// Integer input at `index`, or a plugin error naming the atom.
pub(crate) fn integer_arg(query: &Query<'_>, index: usize, predicate: &str) -> Result<i64, EvalError> {
    query
        .arg(index)
        .and_then(|sym| query.symbols().integer_value(sym))
        .ok_or_else(|| EvalError::plugin(predicate, format!("input {} must be an integer", index)))
}
