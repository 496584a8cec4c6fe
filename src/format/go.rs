//! Go spelling: literals, constants, string enums, template builders and
//! structs. Output is tab-indented and column-aligned the way gofmt leaves it.
use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde_json::Value;

use super::{
    date, literal_with, quote, unique, DateRepr, Declaration, EnumModel, Shape, Syntax,
    TemplateModel, WideRepr,
};
use crate::naming;
use crate::schema::{Content, Definition, GoMode, Primitive, TypeTag};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Keywords plus the predeclared names a builder argument must not shadow.
const RESERVED: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
    "any",
    "bool",
    "error",
    "false",
    "int",
    "len",
    "nil",
    "string",
    "true",
    "strings",
];

// ------------------------------- Literals --------------------------------- //

pub(crate) struct GoSyntax {
    mode: Option<GoMode>,
}

impl GoSyntax {
    pub(crate) fn of(def: &Definition) -> Self {
        GoSyntax { mode: def.go_mode }
    }

    /// Element type used in slice literals; follows the date mode.
    fn value_type(&self, ty: Option<&TypeTag>) -> String {
        match ty {
            None | Some(TypeTag::Custom(_)) => "any".to_string(),
            Some(TypeTag::Array(inner)) => format!("[]{}", self.value_type(Some(inner))),
            Some(TypeTag::Primitive(prim)) => match prim {
                Primitive::Float => "float64".to_string(),
                Primitive::Timestamp => "int64".to_string(),
                Primitive::Date => match self.date_repr() {
                    DateRepr::Text => "string".to_string(),
                    DateRepr::Native => "time.Time".to_string(),
                    DateRepr::Epoch if self.mode == Some(GoMode::Int) => "int".to_string(),
                    DateRepr::Epoch | DateRepr::WideEpoch => "int64".to_string(),
                },
                other => other.name().to_string(),
            },
        }
    }
}

impl Syntax for GoSyntax {
    fn null(&self) -> &'static str {
        "nil"
    }

    fn wide_repr(&self) -> WideRepr {
        match self.mode {
            Some(GoMode::Int64) => WideRepr::Big,
            _ => WideRepr::Plain,
        }
    }

    fn date_repr(&self) -> DateRepr {
        match self.mode {
            Some(GoMode::String) => DateRepr::Text,
            Some(GoMode::Int) | Some(GoMode::Timestamp) => DateRepr::Epoch,
            Some(GoMode::Int64) => DateRepr::WideEpoch,
            Some(GoMode::Time) | None => DateRepr::Native,
        }
    }

    fn big_int(&self, prim: Primitive, digits: &str) -> String {
        let wrapper = if prim.is_unsigned() { "uint64" } else { "int64" };
        format!("{wrapper}({digits})")
    }

    fn wide_epoch(&self, secs: i64) -> String {
        format!("int64({secs})")
    }

    fn native_date(&self, parts: &date::Components) -> String {
        let month = MONTHS[(parts.month as usize).saturating_sub(1) % 12];
        format!(
            "time.Date({}, time.{month}, {}, {}, {}, {}, {}, time.UTC)",
            parts.year, parts.day, parts.hour, parts.minute, parts.second, parts.nanosecond
        )
    }

    fn invalid_native_date(&self, marker: &str) -> String {
        format!("time.Time{{}} {marker}")
    }

    fn list(&self, element: Option<&TypeTag>, items: &[String]) -> String {
        format!("[]{}{{{}}}", self.value_type(element), items.join(", "))
    }

    fn empty_list(&self, _element: Option<&TypeTag>) -> String {
        "nil".to_string()
    }

    fn unsupported(&self, _value: &Value) -> String {
        "nil /* unsupported value */".to_string()
    }
}

/// Struct field type: exact widths, no mode involved.
fn field_type(ty: &TypeTag) -> String {
    match ty {
        TypeTag::Custom(name) => name.clone(),
        TypeTag::Array(inner) => format!("[]{}", field_type(inner)),
        TypeTag::Primitive(Primitive::Float) => "float64".to_string(),
        TypeTag::Primitive(Primitive::Date) => "time.Time".to_string(),
        TypeTag::Primitive(Primitive::Timestamp) => "int64".to_string(),
        TypeTag::Primitive(other) => other.name().to_string(),
    }
}

/// Declared storage type for a numeric constant with an explicit width.
fn storage_type(ty: &TypeTag, value: &Value) -> Option<&'static str> {
    let prim = ty.primitive()?;
    if !value.is_number()
        || !prim.is_numeric()
        || matches!(prim, Primitive::Int | Primitive::Float)
    {
        return None;
    }
    Some(prim.name())
}

// ------------------------------ Declarations ------------------------------ //

pub(crate) fn declaration(name: &str, def: &Definition) -> Declaration {
    let ident = naming::exported(name);
    match &def.content {
        Content::Constant { ty, value } => constant(&ident, def, ty, value),
        Content::Enum { values, default } => enumeration(&ident, values, default.as_deref()),
        Content::Template { template, parameters } => {
            template_builder(&ident, template, parameters)
        }
        Content::Object { fields } => structure(&ident, fields),
    }
}

fn constant(ident: &str, def: &Definition, ty: &TypeTag, value: &Value) -> Declaration {
    let syntax = GoSyntax::of(def);
    let literal = literal_with(&syntax, def);
    let mut imports = BTreeSet::new();
    if literal.uses_time {
        imports.insert("time");
    }

    let text = match literal.shape {
        Shape::Scalar => match storage_type(ty, value) {
            Some(go_ty) => format!("const {ident} {go_ty} = {}", literal.text),
            None => format!("const {ident} = {}", literal.text),
        },
        Shape::Collection if literal.text == "nil" => {
            let slice = match ty {
                TypeTag::Array(_) => syntax.value_type(Some(ty)),
                _ => "[]any".to_string(),
            };
            if slice.contains("time.") {
                imports.insert("time");
            }
            format!("var {ident} {slice}")
        }
        _ if literal.text.starts_with("nil") => format!("var {ident} any = {}", literal.text),
        _ => format!("var {ident} = {}", literal.text),
    };
    Declaration { text, imports }
}

fn enumeration(ident: &str, values: &[String], default: Option<&str>) -> Declaration {
    let model = EnumModel::new(ident, values, default);
    let consts: Vec<(String, &str)> = model
        .members
        .iter()
        .map(|m| (format!("{ident}{}", m.name), m.value.as_str()))
        .collect();
    let names: Vec<&str> = consts.iter().map(|(name, _)| name.as_str()).collect();

    let mut out = String::new();
    let _ = writeln!(out, "// {ident} is one of a closed set of string values.");
    let _ = writeln!(out, "type {ident} string");

    if !consts.is_empty() {
        let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
        out.push_str("\nconst (\n");
        for (name, value) in &consts {
            let _ = writeln!(out, "\t{name:<width$} {ident} = {}", quote(value));
        }
        out.push_str(")\n");
    }

    let _ = writeln!(out, "\n// {ident}Values returns every declared value in order.");
    let _ = writeln!(out, "func {ident}Values() []{ident} {{");
    if names.is_empty() {
        out.push_str("\treturn nil\n");
    } else {
        let _ = writeln!(out, "\treturn []{ident}{{{}}}", names.join(", "));
    }
    out.push_str("}\n");

    let _ = writeln!(out, "\nfunc (v {ident}) String() string {{\n\treturn string(v)\n}}");

    let _ = writeln!(out, "\n// IsValid reports whether v is one of the declared values.");
    let _ = writeln!(out, "func (v {ident}) IsValid() bool {{");
    if !names.is_empty() {
        let _ = writeln!(out, "\tswitch v {{\n\tcase {}:\n\t\treturn true\n\t}}", names.join(", "));
    }
    out.push_str("\treturn false\n}\n");

    let _ = writeln!(out, "\nfunc Parse{ident}(s string) ({ident}, error) {{");
    let _ = writeln!(out, "\tif v, ok := Lookup{ident}(s); ok {{\n\t\treturn v, nil\n\t}}");
    let _ = writeln!(out, "\treturn \"\", fmt.Errorf(\"invalid {ident}: %q\", s)\n}}");

    let _ = writeln!(out, "\nfunc Lookup{ident}(s string) ({ident}, bool) {{");
    let _ = writeln!(out, "\tv := {ident}(s)\n\tif !v.IsValid() {{\n\t\treturn \"\", false\n\t}}");
    out.push_str("\treturn v, true\n}\n");

    if let Some(member) = model.default_member() {
        let _ = writeln!(
            out,
            "\nfunc Default{ident}() {ident} {{\n\treturn {ident}{}\n}}",
            member.name
        );
    }

    Declaration {
        text: out.trim_end().to_string(),
        imports: BTreeSet::from(["fmt"]),
    }
}

fn template_builder(ident: &str, template: &str, parameters: &[String]) -> Declaration {
    let model = TemplateModel::new(template, parameters, RESERVED);
    let mut imports = BTreeSet::new();
    let mut out = format!("const {ident}Template = {}\n", quote(&model.template));

    let args: Vec<String> =
        model.parameters.iter().map(|p| format!("{} string", p.ident)).collect();
    let _ = writeln!(out, "\n// Build{ident} fills the placeholders of {ident}Template.");
    let _ = writeln!(out, "func Build{ident}({}) string {{", args.join(", "));
    if model.parameters.is_empty() {
        let _ = writeln!(out, "\treturn {ident}Template");
    } else {
        imports.insert("strings");
        // NewReplacer: leftmost match, earlier pairs win ties, no rescans.
        let pairs: Vec<String> = model
            .parameters
            .iter()
            .map(|p| format!("{}, {}", quote(&p.placeholder()), p.ident))
            .collect();
        let _ = writeln!(
            out,
            "\treturn strings.NewReplacer({}).Replace({ident}Template)",
            pairs.join(", ")
        );
    }
    out.push('}');
    Declaration { text: out, imports }
}

fn structure(ident: &str, fields: &IndexMap<String, TypeTag>) -> Declaration {
    if fields.is_empty() {
        return Declaration { text: format!("type {ident} struct{{}}"), imports: BTreeSet::new() };
    }

    let mut taken = HashSet::new();
    let rows: Vec<(String, String, &str)> = fields
        .iter()
        .map(|(field, ty)| {
            let name = unique(naming::exported(field), &taken);
            taken.insert(name.clone());
            (name, field_type(ty), field.as_str())
        })
        .collect();

    let name_width = rows.iter().map(|(n, _, _)| n.chars().count()).max().unwrap_or(0);
    let type_width = rows.iter().map(|(_, t, _)| t.chars().count()).max().unwrap_or(0);
    let mut out = format!("type {ident} struct {{\n");
    for (name, ty, field) in &rows {
        let _ = writeln!(out, "\t{name:<name_width$} {ty:<type_width$} `json:\"{field}\"`");
    }
    out.push('}');

    let mut imports = BTreeSet::new();
    if rows.iter().any(|(_, ty, _)| ty.contains("time.")) {
        imports.insert("time");
    }
    Declaration { text: out, imports }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn constants_pick_const_or_var() {
        let int = declaration("MaxUsers", &Definition::constant("int", json!(200)));
        assert_eq!(int.text, "const MaxUsers = 200");
        assert!(int.imports.is_empty());

        let sized = declaration("Port", &Definition::constant("uint16", json!(8080)));
        assert_eq!(sized.text, "const Port uint16 = 8080");

        let list = declaration("Primes", &Definition::constant("int[]", json!([2, 3, 5])));
        assert_eq!(list.text, "var Primes = []int{2, 3, 5}");

        let empty = declaration("Launches", &Definition::constant("date[]", json!([])));
        assert_eq!(empty.text, "var Launches []time.Time");
        assert!(empty.imports.contains("time"));

        let launch = declaration(
            "launch_date",
            &Definition::constant("date", json!("2023-01-01T00:00:00Z")),
        );
        assert_eq!(
            launch.text,
            "var LaunchDate = time.Date(2023, time.January, 1, 0, 0, 0, 0, time.UTC)"
        );
        assert_eq!(launch.imports, BTreeSet::from(["time"]));
    }

    #[test]
    fn unevaluated_numbers_stay_untyped() {
        let decl = declaration("Broken", &Definition::constant("int32", json!("4 / 0")));
        assert_eq!(decl.text, r#"const Broken = "4 / 0""#);
    }

    #[test]
    fn enum_declaration() {
        let decl =
            declaration("Status", &Definition::enumeration(["active", "inactive"], Some("active")));
        let expected = r#"// Status is one of a closed set of string values.
type Status string

const (
	StatusActive   Status = "active"
	StatusInactive Status = "inactive"
)

// StatusValues returns every declared value in order.
func StatusValues() []Status {
	return []Status{StatusActive, StatusInactive}
}

func (v Status) String() string {
	return string(v)
}

// IsValid reports whether v is one of the declared values.
func (v Status) IsValid() bool {
	switch v {
	case StatusActive, StatusInactive:
		return true
	}
	return false
}

func ParseStatus(s string) (Status, error) {
	if v, ok := LookupStatus(s); ok {
		return v, nil
	}
	return "", fmt.Errorf("invalid Status: %q", s)
}

func LookupStatus(s string) (Status, bool) {
	v := Status(s)
	if !v.IsValid() {
		return "", false
	}
	return v, true
}

func DefaultStatus() Status {
	return StatusActive
}"#;
        assert_eq!(decl.text, expected);
        assert_eq!(decl.imports, BTreeSet::from(["fmt"]));
    }

    #[test]
    fn empty_enum_still_compiles() {
        let decl = declaration("Nothing", &Definition::enumeration(Vec::<String>::new(), None));
        assert!(!decl.text.contains("const ("));
        assert!(decl.text.contains("func NothingValues() []Nothing {\n\treturn nil\n}"));
        assert!(decl.text.contains("func (v Nothing) IsValid() bool {\n\treturn false\n}"));
        assert!(!decl.text.contains("DefaultNothing"));
    }

    #[test]
    fn template_declaration() {
        let decl =
            declaration("UserPath", &Definition::template("/users/%id%/%type%", ["id", "type"]));
        let expected = r#"const UserPathTemplate = "/users/%id%/%type%"

// BuildUserPath fills the placeholders of UserPathTemplate.
func BuildUserPath(id string, type_ string) string {
	return strings.NewReplacer("%id%", id, "%type%", type_).Replace(UserPathTemplate)
}"#;
        assert_eq!(decl.text, expected);
        assert_eq!(decl.imports, BTreeSet::from(["strings"]));

        let bare = declaration("Greeting", &Definition::template("hello", Vec::<String>::new()));
        assert!(bare.text.ends_with("func BuildGreeting() string {\n\treturn GreetingTemplate\n}"));
        assert!(bare.imports.is_empty());
    }

    #[test]
    fn struct_declaration() {
        let decl = declaration(
            "User",
            &Definition::object([
                ("id", "int64"),
                ("display_name", "string"),
                ("joined", "date"),
                ("scores", "float[]"),
                ("home", "Address"),
            ]),
        );
        let expected = "type User struct {
\tId          int64     `json:\"id\"`
\tDisplayName string    `json:\"display_name\"`
\tJoined      time.Time `json:\"joined\"`
\tScores      []float64 `json:\"scores\"`
\tHome        Address   `json:\"home\"`
}";
        assert_eq!(decl.text, expected);
        assert_eq!(decl.imports, BTreeSet::from(["time"]));
        let empty = declaration("Empty", &Definition::object(Vec::<(&str, &str)>::new()));
        assert_eq!(empty.text, "type Empty struct{}");
    }
}
