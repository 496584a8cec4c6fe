//! Type tags carried by constant definitions and object fields.
//!
//! A tag is a primitive name (`int64`, `date`, ...) optionally suffixed with
//! one or more `[]` to denote arrays. Anything else is kept verbatim as a
//! custom tag so user-chosen type names survive into object declarations.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Float32,
    Float64,
    String,
    Bool,
    Date,
    Timestamp,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        let p = match name {
            "int" => Primitive::Int,
            "int8" => Primitive::Int8,
            "int16" => Primitive::Int16,
            "int32" => Primitive::Int32,
            "int64" => Primitive::Int64,
            "uint" => Primitive::Uint,
            "uint8" => Primitive::Uint8,
            "uint16" => Primitive::Uint16,
            "uint32" => Primitive::Uint32,
            "uint64" => Primitive::Uint64,
            "float" => Primitive::Float,
            "float32" => Primitive::Float32,
            "float64" => Primitive::Float64,
            "string" => Primitive::String,
            "bool" => Primitive::Bool,
            "date" => Primitive::Date,
            "timestamp" => Primitive::Timestamp,
            _ => return None,
        };
        Some(p)
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint => "uint",
            Primitive::Uint8 => "uint8",
            Primitive::Uint16 => "uint16",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Float => "float",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::String => "string",
            Primitive::Bool => "bool",
            Primitive::Date => "date",
            Primitive::Timestamp => "timestamp",
        }
    }

    /// Every signed and unsigned integer width, the wide ones included.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::Int
                | Primitive::Int8
                | Primitive::Int16
                | Primitive::Int32
                | Primitive::Int64
                | Primitive::Uint
                | Primitive::Uint8
                | Primitive::Uint16
                | Primitive::Uint32
                | Primitive::Uint64
        )
    }

    /// 64-bit integers, whose literal form depends on the target mode.
    pub fn is_wide_integer(self) -> bool {
        matches!(self, Primitive::Int64 | Primitive::Uint64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::Float | Primitive::Float32 | Primitive::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Primitive::Uint
                | Primitive::Uint8
                | Primitive::Uint16
                | Primitive::Uint32
                | Primitive::Uint64
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Primitive(Primitive),
    Array(Box<TypeTag>),
    Custom(String),
}

impl TypeTag {
    /// Parse a tag such as `"int"`, `"date[]"` or `"string[][]"`. Never fails:
    /// unknown names become [`TypeTag::Custom`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(base) = raw.strip_suffix("[]") {
            if !base.trim().is_empty() {
                return TypeTag::Array(Box::new(TypeTag::parse(base)));
            }
        }
        match Primitive::from_name(raw) {
            Some(p) => TypeTag::Primitive(p),
            None => TypeTag::Custom(raw.to_string()),
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            TypeTag::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Element tag of an array tag.
    pub fn element(&self) -> Option<&TypeTag> {
        match self {
            TypeTag::Array(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.primitive().is_some_and(Primitive::is_numeric)
    }
}

impl From<&str> for TypeTag {
    fn from(raw: &str) -> Self {
        TypeTag::parse(raw)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Primitive(p) => f.write_str(p.name()),
            TypeTag::Array(inner) => write!(f, "{inner}[]"),
            TypeTag::Custom(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_arrays() {
        let tag = TypeTag::parse("int[][]");
        let inner = tag.element().and_then(TypeTag::element).unwrap();
        assert_eq!(inner, &TypeTag::Primitive(Primitive::Int));
        assert_eq!(tag.to_string(), "int[][]");
    }

    #[test]
    fn unknown_names_are_custom() {
        assert_eq!(TypeTag::parse("UserId"), TypeTag::Custom("UserId".into()));
        assert_eq!(TypeTag::parse("[]"), TypeTag::Custom("[]".into()));
        assert_eq!(
            TypeTag::parse("Point[]"),
            TypeTag::Array(Box::new(TypeTag::Custom("Point".into())))
        );
    }

    #[test]
    fn numeric_families() {
        assert!(Primitive::Uint64.is_wide_integer());
        assert!(Primitive::Uint64.is_unsigned());
        assert!(!Primitive::Int32.is_wide_integer());
        assert!(Primitive::Float32.is_numeric());
        assert!(!TypeTag::parse("date").is_numeric());
        assert!(!TypeTag::parse("int[]").is_numeric());
    }
}
