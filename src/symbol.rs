use crate::error::StoreError;
use crate::name::{NameId, NameTable};
use hashbrown::HashMap;
use parking_lot::RwLock;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Handle to a symbol in a [`SymbolTable`].
///
/// The low bit is the negation flag, the remaining bits index the table.
/// Handles are stable for the lifetime of the table, so equality and
/// hashing are O(1) and a handle stays valid after the evaluation that
/// created it has returned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    fn from_index(index: u32) -> Self {
        Symbol(index << 1)
    }

    /// Index of the underlying term in the table.
    pub fn index(self) -> u32 {
        self.0 >> 1
    }

    /// Raw handle value, including the negation bit.
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_negated(self) -> bool {
        self.0 & 1 == 1
    }

    /// The un-negated form of this literal.
    pub fn positive(self) -> Symbol {
        Symbol(self.0 & !1)
    }

    pub(crate) fn flip(self) -> Symbol {
        Symbol(self.0 ^ 1)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            write!(f, "-#{}", self.index())
        } else {
            write!(f, "#{}", self.index())
        }
    }
}

/// Ordered argument tuple. Most atoms in practice have at most four arguments.
pub type Tuple = SmallVec<[Symbol; 4]>;

/// Structural content of a stored symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Identifier or quoted string. Strings keep their surrounding quotes.
    Constant(NameId),
    Integer(i64),
    /// Predicate application or compound term, always with at least one argument.
    Function(NameId, Tuple),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Constant,
    Integer,
    Function,
}

/// Truth value of a ground atom relative to an interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn negate(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    pub fn is_false(self) -> bool {
        self == Truth::False
    }

    pub fn is_decided(self) -> bool {
        self != Truth::Unknown
    }
}

impl From<bool> for Truth {
    fn from(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }
}

/// Number of shards for the hashcons maps (power of 2 for fast modulo).
const NUM_SHARDS: usize = 16;

/// Append-only, thread-safe symbol arena with hashconsing.
///
/// Guarantees:
/// - Structurally equal terms get the same Symbol
/// - A Symbol can be resolved back to its term for as long as the table lives
/// - Nothing is ever removed or overwritten
///
/// Concurrent readers never block each other. Growth takes a shard write
/// lock plus a short write lock on the node vector.
pub struct SymbolTable {
    names: NameTable,
    nodes: RwLock<Vec<Term>>,
    shards: [RwLock<HashMap<Term, Symbol>>; NUM_SHARDS],
}

impl SymbolTable {
    pub fn new() -> Self {
        let shards = std::array::from_fn(|_| RwLock::new(HashMap::new()));
        Self {
            names: NameTable::new(),
            nodes: RwLock::new(Vec::new()),
            shards,
        }
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    fn intern(&self, term: Term) -> Symbol {
        let shard = &self.shards[Self::shard_index(&term)];

        {
            let map = shard.read();
            if let Some(&sym) = map.get(&term) {
                return sym;
            }
        }

        let mut map = shard.write();
        // Another writer may have won the race between the two locks.
        if let Some(&sym) = map.get(&term) {
            return sym;
        }

        let sym = {
            let mut nodes = self.nodes.write();
            let sym = Symbol::from_index(nodes.len() as u32);
            nodes.push(term.clone());
            sym
        };
        map.insert(term, sym);
        sym
    }

    fn shard_index(term: &Term) -> usize {
        let mut hasher = FxHasher::default();
        term.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    /// Store a bare constant. Quotes, if any, are kept as part of the name.
    pub fn constant(&self, text: &str) -> Symbol {
        let name = self.names.intern(text);
        self.intern(Term::Constant(name))
    }

    /// Store `text` as a quoted string constant.
    pub fn string(&self, text: &str) -> Symbol {
        self.constant(&quote(text))
    }

    pub fn integer(&self, value: i64) -> Symbol {
        self.intern(Term::Integer(value))
    }

    /// Store `name(args...)`. With no arguments this is the constant `name`.
    pub fn function(&self, name: &str, args: &[Symbol]) -> Result<Symbol, StoreError> {
        let name = self.names.intern(name);
        self.function_by_id(name, args)
    }

    fn function_by_id(&self, name: NameId, args: &[Symbol]) -> Result<Symbol, StoreError> {
        if args.is_empty() {
            return Ok(self.intern(Term::Constant(name)));
        }
        for arg in args {
            if arg.is_negated() {
                return Err(StoreError::malformed(format!(
                    "argument {} is a negated literal",
                    self.render_lossy(*arg)
                )));
            }
            self.check_handle(*arg)?;
        }
        Ok(self.intern(Term::Function(name, SmallVec::from_slice(args))))
    }

    /// Store the atom described by `[predicate, arg1, ...]`.
    ///
    /// The head must be a constant spelled as an identifier: strings,
    /// integers and arbitrary text cannot name a predicate.
    pub fn atom(&self, tuple: &[Symbol]) -> Result<Symbol, StoreError> {
        let (head, args) = tuple
            .split_first()
            .ok_or_else(|| StoreError::malformed("empty tuple"))?;
        let name = match self.resolve_checked(*head)? {
            Term::Constant(name) if !head.is_negated() && self.is_predicate_name(name) => name,
            _ => {
                return Err(StoreError::malformed(format!(
                    "head {} is not a predicate name",
                    self.render_lossy(*head)
                )))
            }
        };
        self.function_by_id(name, args)
    }

    fn check_handle(&self, sym: Symbol) -> Result<(), StoreError> {
        if (sym.index() as usize) < self.nodes.read().len() {
            Ok(())
        } else {
            Err(StoreError::UnknownSymbol { index: sym.index() })
        }
    }

    /// Resolve the term behind a handle, ignoring the negation bit.
    pub fn resolve(&self, sym: Symbol) -> Option<Term> {
        self.nodes.read().get(sym.index() as usize).cloned()
    }

    fn resolve_checked(&self, sym: Symbol) -> Result<Term, StoreError> {
        self.resolve(sym)
            .ok_or(StoreError::UnknownSymbol { index: sym.index() })
    }

    pub fn kind(&self, sym: Symbol) -> Option<SymbolKind> {
        Some(match self.resolve(sym)? {
            Term::Constant(_) => SymbolKind::Constant,
            Term::Integer(_) => SymbolKind::Integer,
            Term::Function(_, _) => SymbolKind::Function,
        })
    }

    /// Name of a constant or function symbol.
    pub fn name(&self, sym: Symbol) -> Option<&str> {
        match self.resolve(sym)? {
            Term::Constant(name) | Term::Function(name, _) => self.names.resolve(name),
            Term::Integer(_) => None,
        }
    }

    pub fn integer_value(&self, sym: Symbol) -> Option<i64> {
        match self.resolve(sym)? {
            Term::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Function arguments; empty for constants and integers.
    pub fn arguments(&self, sym: Symbol) -> Tuple {
        match self.resolve(sym) {
            Some(Term::Function(_, args)) => args,
            _ => Tuple::new(),
        }
    }

    /// `[name] ++ args` for functions, `[sym]` for constants and integers.
    pub fn tuple(&self, sym: Symbol) -> Option<Tuple> {
        match self.resolve(sym)? {
            Term::Constant(_) | Term::Integer(_) => Some(smallvec::smallvec![sym.positive()]),
            Term::Function(name, args) => {
                let mut tuple = Tuple::with_capacity(args.len() + 1);
                tuple.push(self.intern(Term::Constant(name)));
                tuple.extend_from_slice(&args);
                Some(tuple)
            }
        }
    }

    /// Predicate constant of an atom, or None if `sym` cannot be an atom.
    pub fn head(&self, sym: Symbol) -> Option<Symbol> {
        match self.resolve(sym)? {
            Term::Constant(name) if self.is_predicate_name(name) => Some(sym.positive()),
            Term::Function(name, _) if self.is_predicate_name(name) => {
                Some(self.intern(Term::Constant(name)))
            }
            _ => None,
        }
    }

    /// Whether `sym` can stand for a ground atom (and therefore a literal).
    pub fn is_atom(&self, sym: Symbol) -> bool {
        self.head(sym).is_some()
    }

    /// Whether `sym` is a quoted string constant.
    pub fn is_string(&self, sym: Symbol) -> bool {
        matches!(self.resolve(sym), Some(Term::Constant(name)) if self.is_quoted(name))
    }

    fn is_quoted(&self, name: NameId) -> bool {
        self.names.resolve(name).is_some_and(is_quoted)
    }

    fn is_predicate_name(&self, name: NameId) -> bool {
        self.names.resolve(name).is_some_and(is_identifier)
    }

    /// Negate a literal. Integers and strings are data, not literals.
    pub fn negate(&self, sym: Symbol) -> Result<Symbol, StoreError> {
        self.resolve_checked(sym)?;
        if self.is_atom(sym) {
            Ok(sym.flip())
        } else {
            Err(StoreError::NotALiteral {
                symbol: self.render_lossy(sym),
            })
        }
    }

    /// Render in ASP syntax: `name(a,b)`, negated literals prefixed with `-`.
    pub fn render(&self, sym: Symbol) -> Result<String, StoreError> {
        let mut out = String::new();
        if sym.is_negated() {
            out.push('-');
        }
        self.render_into(sym.positive(), &mut out)?;
        Ok(out)
    }

    fn render_into(&self, sym: Symbol, out: &mut String) -> Result<(), StoreError> {
        match self.resolve_checked(sym)? {
            Term::Constant(name) => out.push_str(self.names.resolve(name).unwrap_or("?")),
            Term::Integer(value) => out.push_str(&value.to_string()),
            Term::Function(name, args) => {
                out.push_str(self.names.resolve(name).unwrap_or("?"));
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.render_into(*arg, out)?;
                }
                out.push(')');
            }
        }
        Ok(())
    }

    /// Rendering for diagnostics; never fails.
    pub fn render_lossy(&self, sym: Symbol) -> String {
        self.render(sym).unwrap_or_else(|_| format!("{:?}", sym))
    }

    /// Number of distinct symbols stored.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// ASP identifier: optional leading underscores, a lowercase letter, then
/// letters, digits, underscores or primes.
pub fn is_identifier(name: &str) -> bool {
    let rest = name.trim_start_matches('_');
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\'')
}

pub fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// Surround with quotes, escaping the way clingo string literals do.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Inverse of [`quote`]. Unquoted text is returned as is.
pub fn unquote(text: &str) -> String {
    if !is_quoted(text) {
        return text.to_string();
    }
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/symbol.rs"]
mod tests;
