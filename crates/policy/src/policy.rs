//! Policy configuration and grant decisions.

use crate::{BuiltinGrant, Decision, Error, Result, SymbolList, is_binding_name};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Capability policy, keyed by resource id.
///
/// Resources without an entry get an empty [`ResourcePolicy`] and may import
/// nothing but themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub resources: BTreeMap<String, ResourcePolicy>,
}

/// Grants held by a single resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourcePolicy {
    /// Builtin modules, granted whole or restricted to named exports.
    pub builtin: BTreeMap<String, BuiltinGrant>,

    /// Packages (by resource id) this resource may import.
    pub packages: BTreeMap<String, bool>,

    /// Ambient globals left visible to this resource's source.
    pub globals: BTreeMap<String, bool>,
}

/// A policy entry that had an unexpected shape and was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyWarning {
    /// Dotted location of the entry, e.g. `resources.pkg.builtin.node:fs`.
    pub path: String,
    pub reason: String,
}

impl fmt::Display for PolicyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

impl Policy {
    /// Load policy from a file. `.toml` files are read as TOML, anything
    /// else as JSON. Malformed entries are logged and dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let (policy, warnings) = Self::load_with_warnings(path)?;
        log_warnings(&warnings);
        Ok(policy)
    }

    /// Like [`Policy::load`], but hands the tolerated entries back to the
    /// caller instead of logging them.
    pub fn load_with_warnings(path: impl AsRef<Path>) -> Result<(Self, Vec<PolicyWarning>)> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let value = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml_to_value(&content)?,
            _ => serde_json::from_str(&content).map_err(|e| Error::Parse(e.to_string()))?,
        };
        Ok(Self::from_value(&value))
    }

    /// Parse policy from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
        let (policy, warnings) = Self::from_value(&value);
        log_warnings(&warnings);
        Ok(policy)
    }

    /// Parse policy from a TOML string with the same structure as the JSON
    /// form (`[resources.<id>.builtin]` and so on).
    pub fn parse_toml(toml: &str) -> Result<Self> {
        let (policy, warnings) = Self::from_value(&toml_to_value(toml)?);
        log_warnings(&warnings);
        Ok(policy)
    }

    /// Build a policy from an already-parsed document.
    ///
    /// Never fails: any entry of an unexpected shape falls back to "not
    /// granted" and is reported in the returned warnings.
    pub fn from_value(value: &Value) -> (Self, Vec<PolicyWarning>) {
        let mut warnings = Vec::new();
        let mut policy = Policy::default();

        let Some(root) = expect_object(value, "policy", &mut warnings) else {
            return (policy, warnings);
        };
        let Some(resources) = root.get("resources") else {
            return (policy, warnings);
        };
        let Some(resources) = expect_object(resources, "resources", &mut warnings) else {
            return (policy, warnings);
        };

        for (id, entry) in resources {
            let path = format!("resources.{id}");
            let resource = ResourcePolicy::from_value(entry, &path, &mut warnings);
            policy.resources.insert(id.clone(), resource);
        }

        (policy, warnings)
    }

    /// The grants for `resource`, if it has an entry.
    pub fn resource(&self, resource: &str) -> Option<&ResourcePolicy> {
        self.resources.get(resource)
    }
}

impl ResourcePolicy {
    fn from_value(value: &Value, path: &str, warnings: &mut Vec<PolicyWarning>) -> Self {
        let mut resource = ResourcePolicy::default();
        let Some(entry) = expect_object(value, path, warnings) else {
            return resource;
        };

        if let Some(builtin) = entry.get("builtin") {
            let section = format!("{path}.builtin");
            if let Some(builtin) = expect_object(builtin, &section, warnings) {
                for (module, grant) in builtin {
                    let entry_path = format!("{section}.{module}");
                    if let Some(grant) = parse_builtin_grant(grant, &entry_path, warnings) {
                        resource.builtin.insert(module.clone(), grant);
                    }
                }
            }
        }

        if let Some(packages) = entry.get("packages") {
            resource.packages = parse_flags(packages, &format!("{path}.packages"), warnings);
        }

        if let Some(globals) = entry.get("globals") {
            resource.globals = parse_flags(globals, &format!("{path}.globals"), warnings);
        }

        resource
    }

    /// Decide whether this resource may import `specifier`.
    ///
    /// Builtin grants are consulted before package grants. Self-reference
    /// and entry-module trust are the caller's concern.
    pub fn check(&self, specifier: &str) -> Decision {
        match self.builtin.get(specifier) {
            Some(BuiltinGrant::Full) => return Decision::Allow,
            Some(BuiltinGrant::Symbols(symbols)) => return Decision::Attenuate(symbols.clone()),
            None => {}
        }

        if self.packages.get(specifier).copied().unwrap_or(false) {
            return Decision::Allow;
        }

        Decision::Deny {
            reason: format!("no builtin or package grant for {specifier}"),
        }
    }

    /// Whether the ambient global `name` stays visible.
    pub fn allows_global(&self, name: &str) -> bool {
        self.globals.get(name).copied().unwrap_or(false)
    }
}

fn toml_to_value(toml: &str) -> Result<Value> {
    let table: toml::Table = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
    serde_json::to_value(table).map_err(|e| Error::Parse(e.to_string()))
}

fn log_warnings(warnings: &[PolicyWarning]) {
    for warning in warnings {
        tracing::warn!(path = %warning.path, "ignoring malformed policy entry: {}", warning.reason);
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    warnings: &mut Vec<PolicyWarning>,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            warnings.push(PolicyWarning {
                path: path.to_string(),
                reason: format!("expected an object, found {}", kind_of(other)),
            });
            None
        }
    }
}

fn parse_builtin_grant(
    value: &Value,
    path: &str,
    warnings: &mut Vec<PolicyWarning>,
) -> Option<BuiltinGrant> {
    let mut warn = |reason: String| {
        warnings.push(PolicyWarning {
            path: path.to_string(),
            reason,
        });
    };

    match value {
        Value::Bool(true) => Some(BuiltinGrant::Full),
        Value::Bool(false) => None,
        Value::Array(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(name) if is_binding_name(name) => names.push(name),
                    Some(name) => {
                        warn(format!("{name:?} is not a valid export name"));
                        return None;
                    }
                    None => {
                        warn(format!("expected export names, found {}", kind_of(item)));
                        return None;
                    }
                }
            }
            match SymbolList::new(names) {
                Some(symbols) => Some(BuiltinGrant::Symbols(symbols)),
                None => {
                    warn("empty export list grants nothing".to_string());
                    None
                }
            }
        }
        other => {
            warn(format!("expected true or a list of exports, found {}", kind_of(other)));
            None
        }
    }
}

fn parse_flags(
    value: &Value,
    path: &str,
    warnings: &mut Vec<PolicyWarning>,
) -> BTreeMap<String, bool> {
    let mut flags = BTreeMap::new();
    let Some(map) = expect_object(value, path, warnings) else {
        return flags;
    };
    for (name, flag) in map {
        match flag {
            Value::Bool(granted) => {
                flags.insert(name.clone(), *granted);
            }
            other => warnings.push(PolicyWarning {
                path: format!("{path}.{name}"),
                reason: format!("expected a boolean, found {}", kind_of(other)),
            }),
        }
    }
    flags
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn symbols(names: &[&str]) -> SymbolList {
        SymbolList::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_parse_json() {
        let policy = Policy::parse_json(
            r#"{
                "resources": {
                    "pkg": {
                        "builtin": { "node:fs": ["readFileSync"], "node:path": true },
                        "packages": { "left-pad": true },
                        "globals": { "process": true }
                    }
                }
            }"#,
        )
        .unwrap();

        let pkg = policy.resource("pkg").unwrap();
        assert_eq!(
            pkg.builtin.get("node:fs"),
            Some(&BuiltinGrant::Symbols(symbols(&["readFileSync"])))
        );
        assert_eq!(pkg.builtin.get("node:path"), Some(&BuiltinGrant::Full));
        assert!(pkg.allows_global("process"));
        assert!(!pkg.allows_global("Buffer"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[resources.pkg.builtin]
"node:fs" = ["readdirSync"]

[resources.pkg.packages]
left-pad = true

[resources.pkg.globals]
process = false
"#;
        let policy = Policy::parse_toml(toml).unwrap();
        let pkg = policy.resource("pkg").unwrap();

        assert_eq!(pkg.check("node:fs"), Decision::Attenuate(symbols(&["readdirSync"])));
        assert_eq!(pkg.check("left-pad"), Decision::Allow);
        assert!(!pkg.allows_global("process"));
    }

    #[test]
    fn test_check_order() {
        let mut resource = ResourcePolicy::default();
        resource
            .builtin
            .insert("node:fs".into(), BuiltinGrant::Symbols(symbols(&["stat"])));
        resource.packages.insert("node:fs".into(), true);

        // builtin grants win over package grants
        assert_eq!(resource.check("node:fs"), Decision::Attenuate(symbols(&["stat"])));
    }

    #[test]
    fn test_empty_policy_denies() {
        let resource = ResourcePolicy::default();
        assert!(!resource.check("node:fs").is_allowed());
        assert!(!resource.check("left-pad").is_allowed());
    }

    #[test]
    fn test_false_grants_nothing() {
        let (policy, warnings) = Policy::from_value(&json!({
            "resources": { "pkg": {
                "builtin": { "node:fs": false },
                "packages": { "left-pad": false }
            }}
        }));
        assert!(warnings.is_empty());
        let pkg = policy.resource("pkg").unwrap();
        assert!(!pkg.check("node:fs").is_allowed());
        assert!(!pkg.check("left-pad").is_allowed());
    }

    #[test]
    fn test_malformed_entries_are_tolerated() {
        let (policy, warnings) = Policy::from_value(&json!({
            "resources": {
                "broken": 42,
                "pkg": {
                    "builtin": {
                        "node:fs": "readFileSync",
                        "node:os": [],
                        "node:net": ["connect", 7],
                        "node:vm": ["x } from 'node:child_process'; //"],
                        "node:path": true
                    },
                    "packages": ["left-pad"],
                    "globals": { "process": "yes", "Buffer": true }
                }
            }
        }));

        assert_eq!(policy.resource("broken"), Some(&ResourcePolicy::default()));

        let pkg = policy.resource("pkg").unwrap();
        assert_eq!(pkg.builtin.len(), 1);
        assert_eq!(pkg.builtin.get("node:path"), Some(&BuiltinGrant::Full));
        assert!(pkg.packages.is_empty());
        assert!(pkg.allows_global("Buffer"));
        assert!(!pkg.allows_global("process"));

        let paths: Vec<_> = warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "resources.broken",
                "resources.pkg.builtin.node:fs",
                "resources.pkg.builtin.node:net",
                "resources.pkg.builtin.node:os",
                "resources.pkg.builtin.node:vm",
                "resources.pkg.packages",
                "resources.pkg.globals.process",
            ]
        );
    }

    #[test]
    fn test_reserved_export_name_is_dropped() {
        let (policy, warnings) = Policy::from_value(&json!({
            "resources": { "pkg": { "builtin": {
                "node:fs": ["default", "readFileSync"],
                "node:path": ["join"]
            }}}
        }));

        let pkg = policy.resource("pkg").unwrap();
        assert!(!pkg.check("node:fs").is_allowed());
        assert_eq!(pkg.check("node:path"), Decision::Attenuate(symbols(&["join"])));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "resources.pkg.builtin.node:fs");
        assert!(warnings[0].reason.contains("\"default\""));
    }

    #[test]
    fn test_non_object_root_is_empty() {
        let (policy, warnings) = Policy::from_value(&json!(["nope"]));
        assert!(policy.resources.is_empty());
        assert_eq!(warnings.len(), 1);

        let (policy, warnings) = Policy::from_value(&json!({}));
        assert!(policy.resources.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(Policy::parse_json("{"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("policy.json");
        let mut file = std::fs::File::create(&json_path).unwrap();
        write!(file, r#"{{"resources": {{"pkg": {{"packages": {{"dep": true}}}}}}}}"#).unwrap();
        let policy = Policy::load(&json_path).unwrap();
        assert_eq!(policy.resource("pkg").unwrap().check("dep"), Decision::Allow);

        let toml_path = dir.path().join("policy.toml");
        std::fs::write(&toml_path, "[resources.pkg.packages]\ndep = true\n").unwrap();
        let policy = Policy::load(&toml_path).unwrap();
        assert_eq!(policy.resource("pkg").unwrap().check("dep"), Decision::Allow);
    }

    #[test]
    fn test_serializes_to_external_shape() {
        let policy = Policy::parse_json(
            r#"{"resources": {"pkg": {"builtin": {"node:fs": ["readFileSync"]}}}}"#,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({"resources": {"pkg": {
                "builtin": {"node:fs": ["readFileSync"]},
                "packages": {},
                "globals": {}
            }}})
        );
    }
}
