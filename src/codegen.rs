//! Assemble one generated source file from resolved definitions.
use std::collections::{BTreeSet, HashMap};

use crate::format::{Formatter, Target};
use crate::naming;
use crate::resolver::ResolvedDefinition;

pub const HEADER: &str = "// Code generated by konst. DO NOT EDIT.";
pub const DEFAULT_GO_PACKAGE: &str = "constants";

/// Two definitions whose names map to the same target identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub identifier: String,
    pub first: String,
    pub second: String,
}

pub struct Codegen {
    formatter: Formatter,
    package: String,
    source: Option<String>,
    imports: BTreeSet<&'static str>,
    declarations: Vec<(String, String)>,
    identifiers: HashMap<String, String>,
    collisions: Vec<NameCollision>,
}

impl Codegen {
    pub fn new(formatter: Formatter) -> Self {
        Codegen {
            formatter,
            package: DEFAULT_GO_PACKAGE.to_string(),
            source: None,
            imports: BTreeSet::new(),
            declarations: Vec::new(),
            identifiers: HashMap::new(),
            collisions: Vec::new(),
        }
    }

    /// Go package clause; blank or unusable names keep the default.
    pub fn with_package(mut self, package: Option<&str>) -> Self {
        if let Some(raw) = package.map(str::trim).filter(|p| !p.is_empty()) {
            let name = if naming::is_identifier(raw) {
                raw.to_string()
            } else {
                naming::snake(raw)
            };
            if naming::is_identifier(&name) {
                self.package = name;
            }
        }
        self
    }

    /// Mentioned in the header so readers know what to edit instead.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn emit(&mut self, def: &ResolvedDefinition) {
        let identifier = self.formatter.identifier(def);
        match self.identifiers.get(&identifier) {
            Some(first) if first != def.name() => {
                tracing::warn!(
                    identifier = %identifier,
                    first = %first,
                    second = %def.name(),
                    "definitions collide in generated {} output",
                    self.formatter.target
                );
                self.collisions.push(NameCollision {
                    identifier,
                    first: first.clone(),
                    second: def.name().to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.identifiers.insert(identifier, def.name().to_string());
            }
        }
        let decl = self.formatter.declaration(def);
        self.imports.extend(decl.imports);
        self.declarations.push((def.name().to_string(), decl.text));
    }

    pub fn emit_all<'a>(&mut self, defs: impl IntoIterator<Item = &'a ResolvedDefinition>) {
        for def in defs {
            self.emit(def);
        }
    }

    /// Identifier clashes seen so far; the emitted file will not compile.
    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    pub fn into_string(mut self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        if let Some(source) = &self.source {
            out.push_str(&format!("// Source: {source}\n"));
        }

        if self.formatter.target == Target::Go {
            out.push_str(&format!("\npackage {}\n", self.package));
            match self.imports.len() {
                0 => {}
                1 => {
                    let only = self.imports.iter().next().copied().unwrap_or_default();
                    out.push_str(&format!("\nimport \"{only}\"\n"));
                }
                _ => {
                    out.push_str("\nimport (\n");
                    for import in &self.imports {
                        out.push_str(&format!("\t\"{import}\"\n"));
                    }
                    out.push_str(")\n");
                }
            }
        }

        self.declarations.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, text) in &self.declarations {
            out.push('\n');
            out.push_str(text);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Definition;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn defs() -> Vec<ResolvedDefinition> {
        vec![
            ResolvedDefinition::new("Timeout", Definition::constant("int", json!(30))),
            ResolvedDefinition::new(
                "Epoch",
                Definition::constant("date", json!("2023-01-01T00:00:00Z")),
            ),
            ResolvedDefinition::new("Key", Definition::template("k:%id%", ["id"])),
        ]
    }

    #[test]
    fn go_file_layout() {
        let mut cg = Codegen::new(Formatter::new(Target::Go)).with_package(Some("settings"));
        cg.emit_all(&defs());
        let expected = r#"// Code generated by konst. DO NOT EDIT.

package settings

import (
	"strings"
	"time"
)

var Epoch = time.Date(2023, time.January, 1, 0, 0, 0, 0, time.UTC)

const KeyTemplate = "k:%id%"

// BuildKey fills the placeholders of KeyTemplate.
func BuildKey(id string) string {
	return strings.NewReplacer("%id%", id).Replace(KeyTemplate)
}

const Timeout = 30
"#;
        assert_eq!(cg.into_string(), expected);
    }

    #[test]
    fn typescript_file_layout() {
        let mut cg =
            Codegen::new(Formatter::new(Target::TypeScript)).with_source("config/app.json");
        cg.emit_all(&defs()[..1]);
        assert_eq!(
            cg.into_string(),
            "// Code generated by konst. DO NOT EDIT.\n\
             // Source: config/app.json\n\n\
             export const Timeout = 30;\n"
        );
    }

    #[test]
    fn reports_identifier_collisions() {
        let defs = [
            ResolvedDefinition::new("max_users", Definition::constant("int", json!(10))),
            ResolvedDefinition::new("MaxUsers", Definition::constant("int", json!(20))),
        ];
        let mut go = Codegen::new(Formatter::new(Target::Go));
        go.emit_all(&defs);
        assert_eq!(
            go.collisions(),
            [NameCollision {
                identifier: "MaxUsers".into(),
                first: "max_users".into(),
                second: "MaxUsers".into(),
            }]
        );

        let mut ts = Codegen::new(Formatter::new(Target::TypeScript));
        ts.emit_all(&defs);
        assert!(ts.collisions().is_empty());
    }

    #[test]
    fn single_import_and_package_fallbacks() {
        let mut cg = Codegen::new(Formatter::new(Target::Go)).with_package(Some("  "));
        cg.emit(&ResolvedDefinition::new("Color", Definition::enumeration(["red"], None)));
        let text = cg.into_string();
        assert!(text.contains("\npackage constants\n\nimport \"fmt\"\n"));

        let cg = Codegen::new(Formatter::new(Target::Go)).with_package(Some("app-config"));
        assert!(cg.into_string().ends_with("package app_config\n"));
    }
}
