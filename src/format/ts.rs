//! TypeScript spelling: literals, `export const`, const-object enums,
//! template builders and interfaces.
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde_json::Value;

use super::{
    date, literal_with, quote, DateRepr, Declaration, EnumModel, Shape, Syntax, TemplateModel,
    WideRepr,
};
use crate::naming;
use crate::schema::{Content, Definition, Primitive, TsMode, TypeTag};

/// Words that cannot name a binding in module code.
const KEYWORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Predefined type names an enum type alias or interface cannot take.
const TYPE_NAMES: &[&str] = &[
    "any",
    "bigint",
    "boolean",
    "never",
    "number",
    "object",
    "string",
    "symbol",
    "undefined",
    "unknown",
];

/// Identifier for a top-level declaration; reserved names get a trailing `_`.
pub(crate) fn identifier(name: &str, def: &Definition) -> String {
    let ident = naming::identifier(name);
    let declares_type = matches!(def.content, Content::Enum { .. } | Content::Object { .. });
    if KEYWORDS.contains(&ident.as_str())
        || (declares_type && TYPE_NAMES.contains(&ident.as_str()))
    {
        format!("{ident}_")
    } else {
        ident
    }
}

// ------------------------------- Literals --------------------------------- //

pub(crate) struct TsSyntax {
    mode: Option<TsMode>,
}

impl TsSyntax {
    pub(crate) fn of(def: &Definition) -> Self {
        TsSyntax { mode: def.ts_mode }
    }
}

impl Syntax for TsSyntax {
    fn null(&self) -> &'static str {
        "null"
    }

    fn wide_repr(&self) -> WideRepr {
        match self.mode {
            Some(TsMode::Number) => WideRepr::Plain,
            _ => WideRepr::Big,
        }
    }

    fn date_repr(&self) -> DateRepr {
        match self.mode {
            Some(TsMode::String) => DateRepr::Text,
            Some(TsMode::Number) => DateRepr::Epoch,
            Some(TsMode::BigInt) => DateRepr::WideEpoch,
            Some(TsMode::Date) | None => DateRepr::Native,
        }
    }

    fn big_int(&self, _prim: Primitive, digits: &str) -> String {
        format!("{digits}n")
    }

    fn wide_epoch(&self, secs: i64) -> String {
        format!("{secs}n")
    }

    fn native_date(&self, parts: &date::Components) -> String {
        format!(
            "new Date(Date.UTC({}, {}, {}, {}, {}, {}, {}))",
            parts.year,
            parts.month.saturating_sub(1),
            parts.day,
            parts.hour,
            parts.minute,
            parts.second,
            parts.millisecond()
        )
    }

    fn invalid_native_date(&self, marker: &str) -> String {
        format!("new Date(0) {marker}")
    }

    fn list(&self, _element: Option<&TypeTag>, items: &[String]) -> String {
        format!("[{}]", items.join(", "))
    }

    fn empty_list(&self, _element: Option<&TypeTag>) -> String {
        "[]".to_string()
    }

    fn unsupported(&self, value: &Value) -> String {
        value.to_string()
    }
}

fn field_type(ty: &TypeTag) -> String {
    match ty {
        TypeTag::Custom(name) => name.clone(),
        TypeTag::Array(inner) => format!("{}[]", field_type(inner)),
        TypeTag::Primitive(prim) if prim.is_numeric() => "number".to_string(),
        TypeTag::Primitive(Primitive::Timestamp) => "number".to_string(),
        TypeTag::Primitive(Primitive::Bool) => "boolean".to_string(),
        TypeTag::Primitive(Primitive::Date) => "Date".to_string(),
        TypeTag::Primitive(_) => "string".to_string(),
    }
}

fn property_key(field: &str) -> String {
    if naming::is_identifier(field) { field.to_string() } else { quote(field) }
}

/// Escape a parameter name for use inside a regex literal alternation.
fn regex_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\^$.|?*+()[]{}/".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ------------------------------ Declarations ------------------------------ //

pub(crate) fn declaration(name: &str, def: &Definition, indent: usize) -> Declaration {
    let ident = identifier(name, def);
    let pad = " ".repeat(indent);
    let text = match &def.content {
        Content::Constant { .. } => {
            let literal = literal_with(&TsSyntax::of(def), def);
            let narrow = if literal.shape == Shape::Collection { " as const" } else { "" };
            format!("export const {ident} = {}{narrow};", literal.text)
        }
        Content::Enum { values, default } => enumeration(&ident, values, default.as_deref(), &pad),
        Content::Template { template, parameters } => {
            template_builder(&ident, template, parameters, &pad)
        }
        Content::Object { fields } => interface(&ident, fields, &pad),
    };
    Declaration { text, imports: Default::default() }
}

fn enumeration(ident: &str, values: &[String], default: Option<&str>, pad: &str) -> String {
    let model = EnumModel::new(ident, values, default);
    let key = |name: &str| {
        if name.starts_with(|c: char| c.is_numeric()) {
            format!("_{name}")
        } else {
            name.to_string()
        }
    };
    let suffix = naming::upper_first(ident);

    let mut out = String::new();
    if model.is_empty() {
        let _ = writeln!(out, "export const {ident} = {{}} as const;");
    } else {
        let _ = writeln!(out, "export const {ident} = {{");
        for member in &model.members {
            let _ = writeln!(out, "{pad}{}: {},", key(member.name.as_str()), quote(&member.value));
        }
        out.push_str("} as const;\n");
    }

    let _ = writeln!(out, "\nexport type {ident} = (typeof {ident})[keyof typeof {ident}];");

    let refs: Vec<String> = model
        .members
        .iter()
        .map(|m| format!("{ident}.{}", key(m.name.as_str())))
        .collect();
    let _ = writeln!(out, "\nexport const {ident}Values = [{}] as const;", refs.join(", "));

    let _ = writeln!(out, "\nexport function is{suffix}(value: unknown): value is {ident} {{");
    let _ = writeln!(
        out,
        "{pad}return typeof value === \"string\" && \
         ({ident}Values as readonly string[]).includes(value);\n}}"
    );

    let _ = writeln!(out, "\nexport function parse{suffix}(value: string): {ident} {{");
    let _ = writeln!(out, "{pad}if (!is{suffix}(value)) {{");
    let _ = writeln!(
        out,
        "{pad}{pad}throw new Error(`invalid {ident}: ${{JSON.stringify(value)}}`);"
    );
    let _ = writeln!(out, "{pad}}}\n{pad}return value;\n}}");

    let _ = writeln!(
        out,
        "\nexport function tryParse{suffix}(value: string): {ident} | undefined {{"
    );
    let _ = writeln!(out, "{pad}return is{suffix}(value) ? value : undefined;\n}}");

    if let Some(member) = model.default_member() {
        let _ = writeln!(
            out,
            "\nexport const {ident}Default: {ident} = {ident}.{};",
            key(member.name.as_str())
        );
    }
    out.trim_end().to_string()
}

fn template_builder(ident: &str, template: &str, parameters: &[String], pad: &str) -> String {
    let reserved: Vec<&str> = KEYWORDS.iter().copied().chain(["values"]).collect();
    let model = TemplateModel::new(template, parameters, &reserved);
    let mut out = format!("export const {ident}Template = {};\n", quote(&model.template));

    let args: Vec<String> =
        model.parameters.iter().map(|p| format!("{}: string", p.ident)).collect();
    let _ = writeln!(
        out,
        "\nexport function build{}({}): string {{",
        naming::upper_first(ident),
        args.join(", ")
    );
    if model.parameters.is_empty() {
        let _ = writeln!(out, "{pad}return {ident}Template;");
    } else {
        // one alternation keeps the pass single and leftmost, earlier names first
        let distinct = model.distinct();
        let entries: Vec<String> =
            distinct.iter().map(|p| format!("{}: {}", quote(&p.name), p.ident)).collect();
        let alternation: Vec<String> = distinct.iter().map(|p| regex_escape(&p.name)).collect();
        let _ = writeln!(
            out,
            "{pad}const values: Record<string, string> = {{ {} }};",
            entries.join(", ")
        );
        let _ = writeln!(
            out,
            "{pad}return {ident}Template.replace(/%({})%/g, (_match, key: string) => values[key]);",
            alternation.join("|")
        );
    }
    out.push('}');
    out
}

fn interface(ident: &str, fields: &IndexMap<String, TypeTag>, pad: &str) -> String {
    if fields.is_empty() {
        return format!("export interface {ident} {{}}");
    }
    let mut out = format!("export interface {ident} {{\n");
    for (field, ty) in fields {
        let _ = writeln!(out, "{pad}{}: {};", property_key(field), field_type(ty));
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn constants() {
        let scalar = declaration("apiUrl", &Definition::constant("string", json!("https://x")), 2);
        assert_eq!(scalar.text, r#"export const apiUrl = "https://x";"#);

        let list = declaration("Primes", &Definition::constant("int[]", json!([2, 3, 5])), 2);
        assert_eq!(list.text, "export const Primes = [2, 3, 5] as const;");

        let big = declaration("max-id", &Definition::constant("int64", json!(42)), 2);
        assert_eq!(big.text, "export const maxId = 42n;");

        let when = declaration(
            "Launch",
            &Definition::constant("date", json!("2024-02-29T12:30:45.250Z")),
            2,
        );
        assert_eq!(
            when.text,
            "export const Launch = new Date(Date.UTC(2024, 1, 29, 12, 30, 45, 250));"
        );
        assert!(when.imports.is_empty());
    }

    #[test]
    fn enum_declaration() {
        let decl = declaration(
            "Status",
            &Definition::enumeration(["active", "inactive"], Some("active")),
            2,
        );
        let expected = r#"export const Status = {
  Active: "active",
  Inactive: "inactive",
} as const;

export type Status = (typeof Status)[keyof typeof Status];

export const StatusValues = [Status.Active, Status.Inactive] as const;

export function isStatus(value: unknown): value is Status {
  return typeof value === "string" && (StatusValues as readonly string[]).includes(value);
}

export function parseStatus(value: string): Status {
  if (!isStatus(value)) {
    throw new Error(`invalid Status: ${JSON.stringify(value)}`);
  }
  return value;
}

export function tryParseStatus(value: string): Status | undefined {
  return isStatus(value) ? value : undefined;
}

export const StatusDefault: Status = Status.Active;"#;
        assert_eq!(decl.text, expected);
    }

    #[test]
    fn enum_keys_never_start_with_digits() {
        let decl = declaration("HttpCode", &Definition::enumeration(["404", "500"], None), 4);
        assert!(decl.text.contains("    _404: \"404\",\n"));
        assert!(decl.text.contains("[HttpCode._404, HttpCode._500]"));
        assert!(!decl.text.contains("HttpCodeDefault"));
    }

    #[test]
    fn template_declaration() {
        let decl = declaration(
            "userPath",
            &Definition::template("/users/%id%/%id.v%", ["id", "id.v", "id"]),
            2,
        );
        let expected = r#"export const userPathTemplate = "/users/%id%/%id.v%";

export function buildUserPath(id: string, idV: string, id2: string): string {
  const values: Record<string, string> = { "id": id, "id.v": idV };
  return userPathTemplate.replace(/%(id|id\.v)%/g, (_match, key: string) => values[key]);
}"#;
        assert_eq!(decl.text, expected);

        let bare = declaration("Greeting", &Definition::template("hi", Vec::<String>::new()), 2);
        let body = "export function buildGreeting(): string {\n  return GreetingTemplate;\n}";
        assert!(bare.text.ends_with(body));
    }

    #[test]
    fn reserved_names_get_a_suffix() {
        let constant = declaration("class", &Definition::constant("int", json!(1)), 2);
        assert_eq!(constant.text, "export const class_ = 1;");

        let enumeration = declaration("default", &Definition::enumeration(["on"], Some("on")), 2);
        assert!(enumeration.text.starts_with("export const default_ = {\n"));
        let alias = "export type default_ = (typeof default_)[keyof typeof default_];";
        assert!(enumeration.text.contains(alias));

        let shape = declaration("string", &Definition::object([("a", "int")]), 2);
        assert!(shape.text.starts_with("export interface string_ {"));
        let plain = declaration("string", &Definition::constant("string", json!("s")), 2);
        assert_eq!(plain.text, r#"export const string = "s";"#);

        let values = declaration("values", &Definition::constant("int[]", json!([1])), 2);
        assert_eq!(values.text, "export const values = [1] as const;");
    }

    #[test]
    fn interface_declaration() {
        let decl = declaration(
            "User",
            &Definition::object([
                ("id", "uint64"),
                ("display-name", "string"),
                ("active", "bool"),
                ("joined", "date"),
                ("seen", "timestamp"),
                ("tags", "string[]"),
                ("home", "Address"),
            ]),
            2,
        );
        let expected = r#"export interface User {
  id: number;
  "display-name": string;
  active: boolean;
  joined: Date;
  seen: number;
  tags: string[];
  home: Address;
}"#;
        assert_eq!(decl.text, expected);
    }
}
