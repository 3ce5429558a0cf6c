use super::string_literal;
use crate::{Error, Result};
use policy::is_binding_name;

/// Source for a module that re-exports only `symbols` from `specifier`.
///
/// The names are exported individually and as the default export object.
/// Duplicates are dropped; order follows first occurrence.
pub fn attenuation_source<S: AsRef<str>>(specifier: &str, symbols: &[S]) -> Result<String> {
    let mut names: Vec<&str> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.as_ref();
        if !is_binding_name(symbol) {
            return Err(Error::InvalidSymbol(symbol.to_string()));
        }
        if !names.contains(&symbol) {
            names.push(symbol);
        }
    }

    if names.is_empty() {
        return Err(Error::MissingParameter {
            locator: specifier.to_string(),
            parameter: "keys",
        });
    }

    let selection = names.join(", ");
    Ok(format!(
        "import {{ {selection} }} from {}; export {{ {selection} }}; export default {{ {selection} }};",
        string_literal(specifier)
    ))
}
