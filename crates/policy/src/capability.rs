use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Words that can't be bound in strict-mode module code.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Returns true if `name` can be used verbatim as a binding name in
/// generated source.
///
/// Accepts `[A-Za-z_$][A-Za-z0-9_$]*` plus non-ASCII alphanumerics, minus
/// the words strict mode reserves. Everything generated from these names
/// runs as strict code.
pub fn is_binding_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
}

/// A non-empty, duplicate-free list of exported symbol names.
///
/// Order is first-seen order; it only matters for reproducible output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolList(Vec<String>);

impl SymbolList {
    /// Build a symbol list, dropping duplicates. Returns `None` if no names
    /// remain.
    pub fn new<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut symbols: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !symbols.contains(&name) {
                symbols.push(name);
            }
        }
        (!symbols.is_empty()).then_some(Self(symbols))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SymbolList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for name in &self.0 {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// Grant for a builtin module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinGrant {
    /// The whole module namespace (`true` in policy files).
    Full,
    /// Only the listed exports.
    Symbols(SymbolList),
}

impl Serialize for BuiltinGrant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BuiltinGrant::Full => serializer.serialize_bool(true),
            BuiltinGrant::Symbols(symbols) => symbols.serialize(serializer),
        }
    }
}

/// Result of checking a specifier against a resource's grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Resolve the specifier unchanged.
    Allow,
    /// Resolve to a narrowed module exposing only these symbols.
    Attenuate(SymbolList),
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Deny { .. })
    }
}
