//! Dependency resolution across a merged set of definitions.
//!
//! Depth-first, memoized by name and guarded by an in-progress set:
//! - `{{name}}` placeholders in string values (and template bodies) are
//!   replaced by the referenced definition's resolved plain text.
//! - Numeric constants whose expanded text is a `+ - * /` expression are
//!   folded to a number; text that does not evaluate is kept as is.
//! - Cycles and references to unknown names abort the whole batch.
pub mod arith;

use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::schema::{Content, Definition, Primitive, TypeTag};

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("reference pattern compiles"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("circular dependency detected: {name}")]
    CircularDependency { name: String },

    #[error("undefined dependency: {name}")]
    UndefinedDependency { name: String },
}

impl ResolveError {
    /// The definition the error is about.
    pub fn name(&self) -> &str {
        match self {
            ResolveError::CircularDependency { name }
            | ResolveError::UndefinedDependency { name } => name,
        }
    }
}

/// A definition whose references are expanded and arithmetic folded.
/// Only [`resolve`] produces these.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDefinition {
    name: String,
    definition: Definition,
}

impl ResolvedDefinition {
    pub(crate) fn new(name: impl Into<String>, definition: Definition) -> Self {
        ResolvedDefinition { name: name.into(), definition }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn into_definition(self) -> Definition {
        self.definition
    }
}

impl Deref for ResolvedDefinition {
    type Target = Definition;

    fn deref(&self) -> &Definition {
        &self.definition
    }
}

pub type ResolvedDefinitions = IndexMap<String, ResolvedDefinition>;

// ------------------------------- Front API -------------------------------- //

/// Resolve every definition. Output keeps the input order; the first
/// structural error aborts.
#[tracing::instrument(level = "debug", skip_all, fields(definitions = definitions.len()))]
pub fn resolve(
    definitions: &IndexMap<String, Definition>,
) -> Result<ResolvedDefinitions, ResolveError> {
    let mut resolver = Resolver::new(definitions);
    for name in definitions.keys() {
        resolver.resolve_name(name)?;
    }

    let mut resolved = resolver.resolved;
    let out: ResolvedDefinitions = definitions
        .keys()
        .filter_map(|name| {
            let def = resolved.remove(name)?;
            Some((name.clone(), ResolvedDefinition::new(name, def)))
        })
        .collect();
    tracing::debug!(resolved = out.len(), "dependency resolution finished");
    Ok(out)
}

// ------------------------------- Resolver --------------------------------- //

struct Resolver<'a> {
    raw: &'a IndexMap<String, Definition>,
    resolved: HashMap<String, Definition>,
    in_progress: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn new(raw: &'a IndexMap<String, Definition>) -> Self {
        Resolver {
            raw,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn resolve_name(&mut self, name: &str) -> Result<(), ResolveError> {
        if self.resolved.contains_key(name) {
            return Ok(());
        }
        if self.in_progress.contains(name) {
            return Err(ResolveError::CircularDependency { name: name.to_string() });
        }
        let raw = self.raw;
        let def = raw
            .get(name)
            .ok_or_else(|| ResolveError::UndefinedDependency { name: name.to_string() })?;

        self.in_progress.insert(name.to_string());
        let outcome = self.expand_definition(name, def);
        self.in_progress.remove(name);

        self.resolved.insert(name.to_string(), outcome?);
        Ok(())
    }

    fn expand_definition(
        &mut self,
        name: &str,
        def: &Definition,
    ) -> Result<Definition, ResolveError> {
        let content = match &def.content {
            Content::Constant { ty, value: Value::String(text) } => {
                let expanded = self.expand_text(name, text)?;
                Content::Constant { ty: ty.clone(), value: fold_numeric(name, ty, expanded) }
            }
            Content::Template { template, parameters } => Content::Template {
                template: self.expand_text(name, template)?,
                parameters: parameters.clone(),
            },
            other => other.clone(),
        };
        Ok(Definition { content, ..def.clone() })
    }

    /// Replace every placeholder. Failed placeholders stay verbatim so the
    /// partial text can be reported; the first failure is then returned.
    fn expand_text(&mut self, owner: &str, text: &str) -> Result<String, ResolveError> {
        if !text.contains("{{") {
            return Ok(text.to_string());
        }
        let mut first_error: Option<ResolveError> = None;
        let expanded = REFERENCE
            .replace_all(text, |caps: &Captures| {
                let dep = caps[1].trim();
                match self.resolve_name(dep) {
                    Ok(()) => match self.resolved.get(dep) {
                        Some(def) => plain_text(dep, def),
                        None => caps[0].to_string(),
                    },
                    Err(err) => {
                        first_error.get_or_insert(err);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned();

        match first_error {
            Some(err) => {
                tracing::debug!(
                    definition = owner,
                    partial = %expanded,
                    error = %err,
                    "reference expansion failed"
                );
                Err(err)
            }
            None => Ok(expanded),
        }
    }
}

// ------------------------------- Helpers ---------------------------------- //

fn fold_numeric(owner: &str, ty: &TypeTag, expanded: String) -> Value {
    let Some(prim) = ty.primitive().filter(|p| p.is_numeric()) else {
        return Value::String(expanded);
    };
    match arith::evaluate(&expanded) {
        Ok(n) if prim.is_float() => {
            Number::from_f64(n as f64).map_or(Value::String(expanded), Value::Number)
        }
        Ok(n) => Value::from(n),
        Err(err) => match parse_number_literal(prim, &expanded) {
            Some(v) => v,
            None => {
                tracing::debug!(
                    definition = owner,
                    text = %expanded,
                    %err,
                    "kept unevaluated numeric text"
                );
                Value::String(expanded)
            }
        },
    }
}

fn parse_number_literal(prim: Primitive, text: &str) -> Option<Value> {
    let text = text.trim();
    if prim.is_float() {
        return text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::from(i));
    }
    text.parse::<u64>().ok().filter(|_| prim.is_unsigned()).map(Value::from)
}

/// Text substituted for a `{{name}}` placeholder.
fn plain_text(name: &str, def: &Definition) -> String {
    match &def.content {
        Content::Constant { value, .. } => match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => number_text(n),
            other => other.to_string(),
        },
        Content::Enum { default, .. } => default.clone().unwrap_or_default(),
        Content::Template { template, .. } => template.clone(),
        Content::Object { .. } => name.to_string(),
    }
}

/// Integer text when the number has no fractional part, shortest decimal otherwise.
pub(crate) fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defs(entries: Vec<(&str, Definition)>) -> IndexMap<String, Definition> {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn value_of<'a>(out: &'a ResolvedDefinitions, name: &str) -> &'a Value {
        out[name].value().unwrap()
    }

    #[test]
    fn expands_chains_depth_first() {
        let input = defs(vec![
            ("Url", Definition::constant("string", json!("{{Scheme}}://{{ Host }}/v{{Version}}"))),
            ("Host", Definition::constant("string", json!("{{Domain}}:8080"))),
            ("Domain", Definition::constant("string", json!("example.com"))),
            ("Scheme", Definition::constant("string", json!("https"))),
            ("Version", Definition::constant("int", json!(2))),
        ]);
        let out = resolve(&input).unwrap();
        assert_eq!(value_of(&out, "Url"), &json!("https://example.com:8080/v2"));
        assert!(out.values().all(|d| !d.value().unwrap().to_string().contains("{{")));
    }

    #[test]
    fn output_keeps_input_order() {
        let input = defs(vec![
            ("B", Definition::constant("string", json!("{{A}}"))),
            ("A", Definition::constant("string", json!("a"))),
        ]);
        let out = resolve(&input).unwrap();
        let names: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(out["B"].name(), "B");
    }

    #[test]
    fn self_reference_is_circular() {
        let input = defs(vec![("N", Definition::constant("string", json!("{{N}}")))]);
        assert_eq!(
            resolve(&input),
            Err(ResolveError::CircularDependency { name: "N".into() })
        );
    }

    #[test]
    fn longer_cycle_names_a_member() {
        let input = defs(vec![
            ("A", Definition::constant("string", json!("x{{B}}"))),
            ("B", Definition::constant("string", json!("{{C}}"))),
            ("C", Definition::constant("string", json!("{{A}}y"))),
            ("D", Definition::constant("string", json!("free"))),
        ]);
        let err = resolve(&input).unwrap_err();
        assert!(matches!(err, ResolveError::CircularDependency { .. }));
        assert!(["A", "B", "C"].contains(&err.name()));
    }

    #[test]
    fn unknown_reference_is_undefined() {
        let input =
            defs(vec![("A", Definition::constant("string", json!("{{Missing}} and more")))]);
        assert_eq!(
            resolve(&input),
            Err(ResolveError::UndefinedDependency { name: "Missing".into() })
        );
    }

    #[test]
    fn folds_arithmetic_for_numeric_types() {
        let input = defs(vec![
            ("Plain", Definition::constant("int", json!("2 + 3 * 4"))),
            ("PageSize", Definition::constant("int", json!(20))),
            ("MaxUsers", Definition::constant("int64", json!("{{PageSize}} * 10"))),
            ("Half", Definition::constant("float64", json!("{{PageSize}} / 8"))),
            ("Ratio", Definition::constant("float", json!("0.25"))),
        ]);
        let out = resolve(&input).unwrap();
        assert_eq!(value_of(&out, "Plain"), &json!(14));
        assert_eq!(value_of(&out, "MaxUsers"), &json!(200));
        assert_eq!(value_of(&out, "Half"), &json!(2.0));
        assert_eq!(value_of(&out, "Ratio"), &json!(0.25));
    }

    #[test]
    fn unevaluable_numeric_text_is_kept() {
        let input = defs(vec![
            ("Zero", Definition::constant("int", json!("4 / 0"))),
            ("Words", Definition::constant("int", json!("four"))),
            ("Text", Definition::constant("string", json!("1 + 1"))),
        ]);
        let out = resolve(&input).unwrap();
        assert_eq!(value_of(&out, "Zero"), &json!("4 / 0"));
        assert_eq!(value_of(&out, "Words"), &json!("four"));
        assert_eq!(value_of(&out, "Text"), &json!("1 + 1"));
    }

    #[test]
    fn big_unsigned_text_becomes_number() {
        let input =
            defs(vec![("Max", Definition::constant("uint64", json!("18446744073709551615")))]);
        let out = resolve(&input).unwrap();
        assert_eq!(value_of(&out, "Max"), &json!(18446744073709551615u64));
    }

    #[test]
    fn shared_dependencies_resolve_once() {
        let input = defs(vec![
            ("Base", Definition::constant("int", json!(3))),
            ("Left", Definition::constant("int", json!("{{Base}} + 1"))),
            ("Right", Definition::constant("int", json!("{{Base}} * 2"))),
            ("Sum", Definition::constant("int", json!("{{Left}} + {{Right}}"))),
        ]);
        let out = resolve(&input).unwrap();
        assert_eq!(value_of(&out, "Sum"), &json!(10));
    }

    #[test]
    fn non_string_kinds_feed_references() {
        let input = defs(vec![
            ("Status", Definition::enumeration(["active", "inactive"], Some("active"))),
            ("User", Definition::object([("name", "string")])),
            ("Base", Definition::constant("string", json!("https://api.example.com"))),
            ("UserPath", Definition::template("{{Base}}/users/%id%", ["id"])),
            ("Label", Definition::constant("string", json!("{{Status}}/{{User}}/{{Flags}}"))),
            ("Flags", Definition::constant("bool[]", json!([true, false]))),
        ]);
        let out = resolve(&input).unwrap();
        assert_eq!(value_of(&out, "Label"), &json!("active/User/[true,false]"));
        assert_eq!(
            out["UserPath"].content,
            Content::Template {
                template: "https://api.example.com/users/%id%".into(),
                parameters: vec!["id".into()],
            }
        );
    }

    #[test]
    fn number_text_prefers_integers() {
        assert_eq!(number_text(&Number::from_f64(3.0).unwrap()), "3");
        assert_eq!(number_text(&Number::from_f64(3.5).unwrap()), "3.5");
        assert_eq!(number_text(&Number::from(u64::MAX)), "18446744073709551615");
    }
}
