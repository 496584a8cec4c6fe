//! Generate Go and TypeScript source from JSON definitions of constants,
//! enums, string templates and object shapes.
//!
//! Pipeline: [`schema`] parses and merges definition files, [`resolver`]
//! expands `{{name}}` references and folds arithmetic, [`format`] turns each
//! resolved definition into target syntax, [`codegen`] assembles a file and
//! [`process`] drives it over files and directories.
pub mod cli;
pub mod codegen;
pub mod format;
pub mod naming;
pub mod path_de;
pub mod process;
pub mod resolver;
pub mod schema;

pub use format::{format_declaration, format_literal, Declaration, Formatter, Literal, Target};
pub use resolver::{resolve, ResolveError, ResolvedDefinition, ResolvedDefinitions};
pub use schema::{Content, Definition, GoMode, Kind, Schema, SchemaError, TsMode, TypeTag};
