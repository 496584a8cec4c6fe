//! Schema model: the typed view of one (or several merged) definition files.
//!
//! On disk a definition is a flat JSON object whose `type` decides which
//! other keys matter. In memory that becomes [`Content`], a sum type with one
//! variant per kind, so "exactly one content shape per definition" holds by
//! construction instead of by convention.
pub mod mode;
pub mod ty;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use mode::{GoMode, TsMode};
pub use ty::{Primitive, TypeTag};

use crate::path_de::{self, PathError};

// ------------------------------- Errors ----------------------------------- //

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema{}: {source}", origin_suffix(.file))]
    Decode {
        file: Option<PathBuf>,
        #[source]
        source: PathError,
    },
}

fn origin_suffix(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!(" ({})", path.display()),
        None => String::new(),
    }
}

/// Structural problems inside one definition object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("{kind} definition requires a `{field}` field")]
    MissingField { kind: Kind, field: &'static str },

    #[error("`type` must not be empty")]
    EmptyType,
}

// -------------------------------- Model ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Constant,
    Enum,
    Template,
    Object,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Constant => "constant",
            Kind::Enum => "enum",
            Kind::Template => "template",
            Kind::Object => "object",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Scalar or array constant.
    Constant { ty: TypeTag, value: Value },
    /// Closed set of string values, declaration order kept.
    Enum { values: Vec<String>, default: Option<String> },
    /// Text with `%name%` placeholders filled by a generated builder.
    Template { template: String, parameters: Vec<String> },
    /// Structural type: field name to declared type, declaration order kept.
    Object { fields: IndexMap<String, TypeTag> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDefinition", into = "RawDefinition")]
pub struct Definition {
    pub content: Content,
    pub go_mode: Option<GoMode>,
    pub ts_mode: Option<TsMode>,
}

impl Definition {
    pub fn new(content: Content) -> Self {
        Definition { content, go_mode: None, ts_mode: None }
    }

    pub fn constant(ty: &str, value: Value) -> Self {
        Self::new(Content::Constant { ty: TypeTag::parse(ty), value })
    }

    pub fn enumeration<S: Into<String>>(
        values: impl IntoIterator<Item = S>,
        default: Option<&str>,
    ) -> Self {
        Self::new(Content::Enum {
            values: values.into_iter().map(Into::into).collect(),
            default: default.map(str::to_string),
        })
    }

    pub fn template<S: Into<String>>(
        template: &str,
        parameters: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(Content::Template {
            template: template.to_string(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        })
    }

    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(Content::Object {
            fields: fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), TypeTag::parse(ty)))
                .collect(),
        })
    }

    pub fn with_go_mode(mut self, mode: GoMode) -> Self {
        self.go_mode = Some(mode);
        self
    }

    pub fn with_ts_mode(mut self, mode: TsMode) -> Self {
        self.ts_mode = Some(mode);
        self
    }

    pub fn kind(&self) -> Kind {
        match &self.content {
            Content::Constant { .. } => Kind::Constant,
            Content::Enum { .. } => Kind::Enum,
            Content::Template { .. } => Kind::Template,
            Content::Object { .. } => Kind::Object,
        }
    }

    /// Raw value of a constant.
    pub fn value(&self) -> Option<&Value> {
        match &self.content {
            Content::Constant { value, .. } => Some(value),
            _ => None,
        }
    }
}

// ------------------------------ Wire shape -------------------------------- //

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum FieldSpec {
    Name(String),
    Typed {
        #[serde(rename = "type")]
        ty: String,
    },
}

impl FieldSpec {
    fn type_name(&self) -> &str {
        match self {
            FieldSpec::Name(ty) | FieldSpec::Typed { ty } => ty,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<IndexMap<String, FieldSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    go_mode: Option<GoMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ts_mode: Option<TsMode>,
}

impl TryFrom<RawDefinition> for Definition {
    type Error = DefinitionError;

    fn try_from(raw: RawDefinition) -> Result<Self, Self::Error> {
        let content = match raw.ty.trim() {
            "" => return Err(DefinitionError::EmptyType),
            "enum" => Content::Enum {
                values: raw.values.unwrap_or_default(),
                default: raw.default,
            },
            "template" => Content::Template {
                template: raw.template.ok_or(DefinitionError::MissingField {
                    kind: Kind::Template,
                    field: "template",
                })?,
                parameters: raw.parameters.unwrap_or_default(),
            },
            "object" => {
                let fields = raw.fields.ok_or(DefinitionError::MissingField {
                    kind: Kind::Object,
                    field: "fields",
                })?;
                Content::Object {
                    fields: fields
                        .iter()
                        .map(|(name, spec)| (name.clone(), TypeTag::parse(spec.type_name())))
                        .collect(),
                }
            }
            other => Content::Constant {
                ty: TypeTag::parse(other),
                value: raw.value.ok_or(DefinitionError::MissingField {
                    kind: Kind::Constant,
                    field: "value",
                })?,
            },
        };
        Ok(Definition { content, go_mode: raw.go_mode, ts_mode: raw.ts_mode })
    }
}

impl From<Definition> for RawDefinition {
    fn from(def: Definition) -> Self {
        let mut raw = RawDefinition {
            go_mode: def.go_mode,
            ts_mode: def.ts_mode,
            ..RawDefinition::default()
        };
        match def.content {
            Content::Constant { ty, value } => {
                raw.ty = ty.to_string();
                raw.value = Some(value);
            }
            Content::Enum { values, default } => {
                raw.ty = "enum".into();
                raw.values = Some(values);
                raw.default = default;
            }
            Content::Template { template, parameters } => {
                raw.ty = "template".into();
                raw.template = Some(template);
                raw.parameters = Some(parameters);
            }
            Content::Object { fields } => {
                raw.ty = "object".into();
                raw.fields = Some(
                    fields
                        .into_iter()
                        .map(|(name, ty)| (name, FieldSpec::Name(ty.to_string())))
                        .collect(),
                );
            }
        }
        raw
    }
}

// -------------------------------- Schema ---------------------------------- //

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go_package: Option<String>,
    #[serde(default)]
    pub definitions: IndexMap<String, Definition>,
}

impl Schema {
    pub fn from_json_str(src: &str) -> Result<Self, SchemaError> {
        path_de::from_str_with_path(src)
            .map_err(|source| SchemaError::Decode { file: None, source })
    }

    pub fn load_file(path: &Path) -> Result<Self, SchemaError> {
        let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: Schema = path_de::from_slice_with_path(&bytes).map_err(|source| {
            SchemaError::Decode { file: Some(path.to_path_buf()), source }
        })?;
        tracing::debug!(
            file = %path.display(),
            definitions = schema.definitions.len(),
            "parsed schema file"
        );
        Ok(schema)
    }

    /// Fold `other` into `self`: later definitions overwrite earlier ones with
    /// the same name; the first non-empty version and package are kept.
    pub fn merge(&mut self, other: Schema) {
        if is_blank(&self.version) {
            self.version = other.version.filter(|v| !v.trim().is_empty());
        }
        if is_blank(&self.go_package) {
            self.go_package = other.go_package.filter(|p| !p.trim().is_empty());
        }
        for (name, def) in other.definitions {
            if self.definitions.contains_key(&name) {
                tracing::debug!(definition = %name, "definition overwritten by later file");
            }
            self.definitions.insert(name, def);
        }
    }
}

fn is_blank(v: &Option<String>) -> bool {
    v.as_deref().is_none_or(|s| s.trim().is_empty())
}

// ------------------------------- Tests ------------------------------------ //
