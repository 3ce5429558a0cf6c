use std::collections::BTreeSet;

/// Globals hidden from every non-entry module unless its policy grants them.
pub const DEFAULT_CENSORED_GLOBALS: &[&str] = &["process"];

/// Prologue that shadows every name in `censorable` not present in
/// `allowed`.
///
/// `globalThis` and `global` are always replaced with empty objects so the
/// hidden names can't be reached through the global object either. Strict
/// mode blocks recovering it from a sloppy function's `this`. The prologue is
/// a single line, leaving the module's own line numbers unchanged.
pub fn censorship_prologue<S: AsRef<str>>(allowed: &BTreeSet<String>, censorable: &[S]) -> String {
    let mut prologue = String::from("'use strict'; var globalThis = {}; var global = {};");
    for name in censorable.iter().map(AsRef::as_ref) {
        if !allowed.contains(name) {
            prologue.push_str(" var ");
            prologue.push_str(name);
            prologue.push_str(" = undefined;");
        }
    }
    prologue.push(' ');
    prologue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_censors_process_by_default() {
        let prologue = censorship_prologue(&allowed(&[]), DEFAULT_CENSORED_GLOBALS);
        assert_eq!(
            prologue,
            "'use strict'; var globalThis = {}; var global = {}; var process = undefined; "
        );
    }

    #[test]
    fn test_granted_global_is_not_shadowed() {
        let prologue = censorship_prologue(&allowed(&["process"]), DEFAULT_CENSORED_GLOBALS);
        assert!(!prologue.contains("process"));
        assert!(prologue.contains("var globalThis = {};"));
        assert!(prologue.contains("var global = {};"));
    }

    #[test]
    fn test_custom_list_keeps_order() {
        let prologue = censorship_prologue(&allowed(&["fetch"]), &["process", "fetch", "Buffer"]);
        assert!(prologue.ends_with("var process = undefined; var Buffer = undefined; "));
    }

    #[test]
    fn test_single_line() {
        let prologue = censorship_prologue(&allowed(&[]), &["process", "Buffer"]);
        assert!(!prologue.contains('\n'));
    }
}
