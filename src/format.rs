//! Type-directed formatting of resolved definitions.
//!
//! One dispatch over [`Content`] and [`TypeTag`] is shared by both targets;
//! the target-specific spelling lives behind [`Syntax`] in [`go`] and [`ts`].
//! Formatting never fails: mismatched values degrade to a best-effort literal
//! and unparseable dates to a marked placeholder.
pub mod date;
pub mod go;
pub mod ts;

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::SecondsFormat;
use serde_json::{Number, Value};

use crate::naming;
use crate::resolver::{self, ResolvedDefinition};
use crate::schema::{Content, Definition, Primitive, TypeTag};

pub const DEFAULT_INDENT: usize = 2;

// ------------------------------- Public types ----------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Target {
    Go,
    #[value(name = "ts", alias = "typescript")]
    TypeScript,
}

impl Target {
    pub fn extension(self) -> &'static str {
        match self {
            Target::Go => "go",
            Target::TypeScript => "ts",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How a literal may be bound: Go only allows `const` for scalars, and
/// TypeScript narrows collections with `as const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Collection,
    Constructed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub shape: Shape,
    /// Go output needs the `time` package.
    pub uses_time: bool,
}

impl Literal {
    fn scalar(text: impl Into<String>) -> Self {
        Literal { text: text.into(), shape: Shape::Scalar, uses_time: false }
    }

    fn constructed(text: impl Into<String>, uses_time: bool) -> Self {
        Literal { text: text.into(), shape: Shape::Constructed, uses_time }
    }
}

/// A named top-level declaration plus the Go packages it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub text: String,
    pub imports: BTreeSet<&'static str>,
}

/// Immutable formatting configuration handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    pub target: Target,
    /// Indent width for TypeScript; Go output is tab-indented like gofmt.
    pub indent: usize,
}

impl Formatter {
    pub fn new(target: Target) -> Self {
        Formatter { target, indent: DEFAULT_INDENT }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn literal(&self, def: &ResolvedDefinition) -> Literal {
        match self.target {
            Target::Go => literal_with(&go::GoSyntax::of(def), def),
            Target::TypeScript => literal_with(&ts::TsSyntax::of(def), def),
        }
    }

    /// Name the declaration of `def` introduces in the target language.
    pub fn identifier(&self, def: &ResolvedDefinition) -> String {
        match self.target {
            Target::Go => naming::exported(def.name()),
            Target::TypeScript => ts::identifier(def.name(), def),
        }
    }

    pub fn declaration(&self, def: &ResolvedDefinition) -> Declaration {
        match self.target {
            Target::Go => go::declaration(def.name(), def),
            Target::TypeScript => ts::declaration(def.name(), def, self.indent),
        }
    }
}

pub fn format_literal(def: &ResolvedDefinition, target: Target) -> String {
    Formatter::new(target).literal(def).text
}

pub fn format_declaration(def: &ResolvedDefinition, target: Target) -> String {
    Formatter::new(target).declaration(def).text
}

// ------------------------------- Syntax seam ------------------------------ //

/// Date encoding selected by a target's mode hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateRepr {
    Text,
    Native,
    Epoch,
    WideEpoch,
}

/// 64-bit integer encoding selected by a target's mode hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WideRepr {
    Plain,
    Big,
}

pub(crate) trait Syntax {
    fn null(&self) -> &'static str;
    fn wide_repr(&self) -> WideRepr;
    fn date_repr(&self) -> DateRepr;
    fn big_int(&self, prim: Primitive, digits: &str) -> String;
    fn wide_epoch(&self, secs: i64) -> String;
    fn native_date(&self, parts: &date::Components) -> String;
    fn invalid_native_date(&self, marker: &str) -> String;
    /// `element` is `None` for untyped arrays.
    fn list(&self, element: Option<&TypeTag>, items: &[String]) -> String;
    fn empty_list(&self, element: Option<&TypeTag>) -> String;
    fn unsupported(&self, value: &Value) -> String;
}

pub(crate) fn literal_with<S: Syntax>(syntax: &S, def: &Definition) -> Literal {
    match &def.content {
        Content::Constant { ty, value } => typed(syntax, ty, value, true),
        Content::Enum { default, .. } => match default {
            Some(d) => Literal::scalar(quote(d)),
            None => Literal::scalar(syntax.null()),
        },
        Content::Template { template, .. } => Literal::scalar(quote(template)),
        Content::Object { .. } => Literal::scalar(syntax.null()),
    }
}

/// `top` enables the string-to-date heuristic. Elements of primitive-typed
/// arrays never get it, since their slice type could not hold a date.
fn typed<S: Syntax>(syntax: &S, ty: &TypeTag, value: &Value, top: bool) -> Literal {
    match (ty, value) {
        (TypeTag::Array(element), Value::Array(items)) => list(syntax, Some(element), items),
        (TypeTag::Primitive(prim), _) => primitive(syntax, *prim, value, top),
        _ => untyped(syntax, value, top),
    }
}

fn primitive<S: Syntax>(syntax: &S, prim: Primitive, value: &Value, top: bool) -> Literal {
    match (prim, value) {
        (Primitive::Date, _) => date_literal(syntax, value),
        (Primitive::Timestamp, _) => timestamp_literal(value),
        (Primitive::Bool, Value::Bool(b)) => Literal::scalar(b.to_string()),
        (p, Value::Number(n)) if p.is_wide_integer() => wide_literal(syntax, p, n),
        (p, Value::Number(n)) if p.is_numeric() => Literal::scalar(number_literal(n)),
        (Primitive::String, Value::String(s)) if top && date::is_strict_datetime(s) => {
            date_literal(syntax, value)
        }
        (Primitive::String, Value::String(s)) => Literal::scalar(quote(s)),
        _ => untyped(syntax, value, top),
    }
}

/// Fallback by JSON shape for custom tags and declared/decoded mismatches.
fn untyped<S: Syntax>(syntax: &S, value: &Value, top: bool) -> Literal {
    match value {
        Value::Null => Literal::constructed(syntax.null(), false),
        Value::Bool(b) => Literal::scalar(b.to_string()),
        Value::Number(n) => Literal::scalar(number_literal(n)),
        Value::String(s) if top && date::is_strict_datetime(s) => date_literal(syntax, value),
        Value::String(s) => Literal::scalar(quote(s)),
        Value::Array(items) => list(syntax, None, items),
        Value::Object(_) => Literal::constructed(syntax.unsupported(value), false),
    }
}

fn list<S: Syntax>(syntax: &S, element: Option<&TypeTag>, items: &[Value]) -> Literal {
    let parts: Vec<Literal> = items
        .iter()
        .map(|item| match element {
            Some(ty) => typed(syntax, ty, item, matches!(ty, TypeTag::Custom(_))),
            None => untyped(syntax, item, true),
        })
        .collect();
    if parts.is_empty() {
        return Literal {
            text: syntax.empty_list(element),
            shape: Shape::Collection,
            uses_time: false,
        };
    }
    let texts: Vec<String> = parts.iter().map(|p| p.text.clone()).collect();
    Literal {
        text: syntax.list(element, &texts),
        shape: Shape::Collection,
        uses_time: parts.iter().any(|p| p.uses_time),
    }
}

fn wide_literal<S: Syntax>(syntax: &S, prim: Primitive, n: &Number) -> Literal {
    let digits = number_literal(n);
    let integral = digits.bytes().all(|b| b.is_ascii_digit() || b == b'-');
    match syntax.wide_repr() {
        WideRepr::Big if integral => Literal::scalar(syntax.big_int(prim, &digits)),
        _ => Literal::scalar(digits),
    }
}

fn date_literal<S: Syntax>(syntax: &S, value: &Value) -> Literal {
    let repr = syntax.date_repr();
    let Some(instant) = date::parse_instant(value) else {
        tracing::debug!(value = %value, "unparseable date; emitting marked placeholder");
        let marker = date::invalid_marker("date", value);
        return match repr {
            DateRepr::Text => {
                let raw = quote(&date::display_raw(value));
                Literal::scalar(format!("{raw} /* invalid date */"))
            }
            DateRepr::Native => Literal::constructed(syntax.invalid_native_date(&marker), true),
            DateRepr::Epoch | DateRepr::WideEpoch => Literal::scalar(format!("0 {marker}")),
        };
    };
    match repr {
        DateRepr::Text => match value {
            Value::String(raw) => Literal::scalar(quote(raw)),
            _ => Literal::scalar(quote(&instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        },
        DateRepr::Native => {
            let parts = date::Components::of(&instant);
            Literal::constructed(syntax.native_date(&parts), true)
        }
        DateRepr::Epoch => Literal::scalar(instant.timestamp().to_string()),
        DateRepr::WideEpoch => Literal::scalar(syntax.wide_epoch(instant.timestamp())),
    }
}

fn timestamp_literal(value: &Value) -> Literal {
    match date::parse_instant(value) {
        Some(instant) => Literal::scalar(instant.timestamp().to_string()),
        None => Literal::scalar(format!("0 {}", date::invalid_marker("timestamp", value))),
    }
}

pub(crate) fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

pub(crate) fn number_literal(n: &Number) -> String {
    resolver::number_text(n)
}

/// `base`, or `base2`, `base3`, ... whichever is free first.
pub(crate) fn unique(base: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// ------------------------------- Enum model ------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// PascalCase name derived from the value.
    pub name: String,
    pub value: String,
}

/// Members of an enum declaration, shared by both renderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumModel {
    pub members: Vec<EnumMember>,
    default: Option<usize>,
}

impl EnumModel {
    pub fn new(enum_name: &str, values: &[String], default: Option<&str>) -> Self {
        let mut members: Vec<EnumMember> = Vec::new();
        let mut seen = HashSet::new();
        let mut taken = HashSet::new();

        for value in values {
            if !seen.insert(value.as_str()) {
                continue;
            }
            let position = members.len() + 1;
            let base = naming::pascal(value);
            let name = if base.is_empty() {
                unique(format!("Value{position}"), &taken)
            } else if taken.contains(&base) {
                unique(format!("{base}{position}"), &taken)
            } else {
                base
            };
            taken.insert(name.clone());
            members.push(EnumMember { name, value: value.clone() });
        }

        let default = default.and_then(|wanted| {
            let found = members.iter().position(|m| m.value == wanted);
            if found.is_none() {
                tracing::warn!(
                    definition = enum_name,
                    default = wanted,
                    "enum default is not a declared value; dropped"
                );
            }
            found
        });
        EnumModel { members, default }
    }

    pub fn is_valid(&self, candidate: &str) -> bool {
        self.members.iter().any(|m| m.value == candidate)
    }

    pub fn default_member(&self) -> Option<&EnumMember> {
        self.default.and_then(|i| self.members.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ----------------------------- Template model ----------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    pub name: String,
    /// Builder argument name, unique and not a reserved word.
    pub ident: String,
}

impl TemplateParam {
    pub fn placeholder(&self) -> String {
        format!("%{}%", self.name)
    }
}

/// A template body plus its builder arguments, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateModel {
    pub template: String,
    pub parameters: Vec<TemplateParam>,
}

impl TemplateModel {
    pub fn new(template: &str, parameters: &[String], reserved: &[&str]) -> Self {
        let mut taken = HashSet::new();
        let parameters = parameters
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut ident = naming::camel(name);
                if ident.is_empty() {
                    ident = format!("arg{}", i + 1);
                } else if ident.starts_with(|c: char| c.is_numeric()) {
                    ident = format!("_{ident}");
                }
                if reserved.contains(&ident.as_str()) {
                    ident.push('_');
                }
                let ident = unique(ident, &taken);
                taken.insert(ident.clone());
                TemplateParam { name: name.clone(), ident }
            })
            .collect();
        TemplateModel { template: template.to_string(), parameters }
    }

    /// First occurrence of each parameter name; later duplicates never match.
    pub fn distinct(&self) -> Vec<&TemplateParam> {
        let mut seen = HashSet::new();
        self.parameters.iter().filter(|p| seen.insert(p.name.as_str())).collect()
    }

    /// Single left-to-right pass: at each position the first declared
    /// parameter whose placeholder matches wins, and substituted text is
    /// never rescanned. Parameters without an argument stay verbatim.
    pub fn build(&self, args: &[&str]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        'scan: while !rest.is_empty() {
            for (param, arg) in self.parameters.iter().zip(args) {
                let placeholder = param.placeholder();
                if let Some(tail) = rest.strip_prefix(placeholder.as_str()) {
                    out.push_str(arg);
                    rest = tail;
                    continue 'scan;
                }
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
        out
    }
}

// ------------------------------- Tests ------------------------------------ //
