//! File-level pipeline: load one file or a directory of definition files,
//! merge and resolve them together, then render one output per input.
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::codegen::{Codegen, HEADER};
use crate::format::{Formatter, Target};
use crate::naming::NamingStyle;
use crate::resolver::{self, ResolveError, ResolvedDefinitions};
use crate::schema::{Schema, SchemaError};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("no .json files under {}", .0.display())]
    NoInputs(PathBuf),

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to list input files: {0}")]
    Walk(#[from] glob::GlobError),

    #[error("{} already exists (pass --force to overwrite)", .0.display())]
    Exists(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ------------------------------- Options ---------------------------------- //

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    /// Output root; defaults to the input directory (or the input file's parent).
    pub out: Option<PathBuf>,
    pub target: Target,
    /// Defaults to snake case for Go and kebab case for TypeScript.
    pub naming: Option<NamingStyle>,
    pub indent: usize,
    pub force: bool,
}

impl Options {
    pub fn new(input: impl Into<PathBuf>, target: Target) -> Self {
        Options {
            input: input.into(),
            out: None,
            target,
            naming: None,
            indent: crate::format::DEFAULT_INDENT,
            force: false,
        }
    }

    pub fn naming_style(&self) -> NamingStyle {
        self.naming.unwrap_or(match self.target {
            Target::Go => NamingStyle::Snake,
            Target::TypeScript => NamingStyle::Kebab,
        })
    }

    fn formatter(&self) -> Formatter {
        Formatter::new(self.target).with_indent(self.indent)
    }
}

// ------------------------------- Loading ---------------------------------- //

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the input root.
    pub relative: PathBuf,
    pub schema: Schema,
}

/// Every parsed input plus their merge.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub is_dir: bool,
    pub files: Vec<SourceFile>,
    pub merged: Schema,
}

pub fn load(input: &Path) -> Result<Workspace, ProcessError> {
    if !input.exists() {
        return Err(ProcessError::MissingInput(input.to_path_buf()));
    }

    let (root, is_dir, paths) = if input.is_dir() {
        (input.to_path_buf(), true, discover(input)?)
    } else {
        let root = input.parent().map(Path::to_path_buf).unwrap_or_default();
        (root, false, vec![input.to_path_buf()])
    };

    let files = paths
        .into_iter()
        .map(|path| -> Result<SourceFile, ProcessError> {
            let schema = Schema::load_file(&path)?;
            let relative = path
                .strip_prefix(&root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));
            Ok(SourceFile { path, relative, schema })
        })
        .collect::<Result<Vec<_>, ProcessError>>()?;

    let mut merged = Schema::default();
    for file in &files {
        merged.merge(file.schema.clone());
    }
    tracing::info!(
        files = files.len(),
        definitions = merged.definitions.len(),
        "loaded definition files"
    );
    Ok(Workspace { root, is_dir, files, merged })
}

/// `**/*.json` under `dir`, in lexical order.
fn discover(dir: &Path) -> Result<Vec<PathBuf>, ProcessError> {
    let pattern = format!("{}/**/*.json", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut paths = glob::glob(&pattern)?
        .collect::<Result<Vec<_>, glob::GlobError>>()?
        .into_iter()
        .filter(|p| p.is_file())
        .collect::<Vec<_>>();
    paths.sort();
    if paths.is_empty() {
        return Err(ProcessError::NoInputs(dir.to_path_buf()));
    }
    Ok(paths)
}

impl Workspace {
    pub fn resolve(&self) -> Result<ResolvedDefinitions, ResolveError> {
        resolver::resolve(&self.merged.definitions)
    }

    /// The merged schema with every value resolved, in wire shape.
    pub fn resolved_schema(&self) -> Result<Schema, ResolveError> {
        let resolved = self.resolve()?;
        Ok(Schema {
            version: self.merged.version.clone(),
            go_package: self.merged.go_package.clone(),
            definitions: resolved
                .into_iter()
                .map(|(name, def)| (name, def.into_definition()))
                .collect(),
        })
    }
}

// ------------------------------- Rendering -------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub source: Option<PathBuf>,
    pub output: PathBuf,
    pub contents: String,
}

/// Render every output in memory. Each file is independent, so this fans out
/// over the rayon pool.
pub fn render(
    workspace: &Workspace,
    resolved: &ResolvedDefinitions,
    options: &Options,
) -> Vec<RenderedFile> {
    let out_root = options.out.clone().unwrap_or_else(|| workspace.root.clone());
    let style = options.naming_style();
    let formatter = options.formatter();

    let mut rendered: Vec<RenderedFile> = workspace
        .files
        .par_iter()
        .map(|file| {
            let relative = output_relative(&file.relative, style, options.target);
            let package = file
                .schema
                .go_package
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .or(workspace.merged.go_package.as_deref());
            let mut cg = Codegen::new(formatter)
                .with_package(package)
                .with_source(file.relative.to_string_lossy().replace('\\', "/"));
            cg.emit_all(file.schema.definitions.keys().filter_map(|name| resolved.get(name)));
            tracing::debug!(
                source = %file.path.display(),
                output = %relative.display(),
                "rendered"
            );
            RenderedFile {
                source: Some(file.path.clone()),
                output: out_root.join(relative),
                contents: cg.into_string(),
            }
        })
        .collect();

    if workspace.is_dir && options.target == Target::TypeScript {
        rendered.push(index_module(&out_root, &rendered));
    }
    rendered
}

/// `<converted dirs>/<converted stem>.<ext>`
fn output_relative(relative: &Path, style: NamingStyle, target: Target) -> PathBuf {
    let mut out = PathBuf::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            if let Component::Normal(dir) = component {
                out.push(style.apply(&dir.to_string_lossy()));
            }
        }
    }
    let stem = relative.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    out.push(format!("{}.{}", style.apply(&stem), target.extension()));
    out
}

/// `index.ts` re-exporting every generated module.
fn index_module(out_root: &Path, rendered: &[RenderedFile]) -> RenderedFile {
    let mut modules: Vec<String> = rendered
        .iter()
        .filter_map(|file| file.output.strip_prefix(out_root).ok())
        .map(|rel| {
            let without_ext = rel.with_extension("");
            format!("./{}", without_ext.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    modules.sort();
    modules.dedup();

    let mut contents = format!("{HEADER}\n\n");
    for module in &modules {
        contents.push_str(&format!("export * from \"{module}\";\n"));
    }
    RenderedFile { source: None, output: out_root.join("index.ts"), contents }
}

/// Write everything, or nothing when an output exists and `force` is off.
pub fn write_all(files: &[RenderedFile], force: bool) -> Result<(), ProcessError> {
    if !force {
        if let Some(existing) = files.iter().find(|f| f.output.exists()) {
            return Err(ProcessError::Exists(existing.output.clone()));
        }
    }
    for file in files {
        if let Some(parent) = file.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ProcessError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&file.output, &file.contents).map_err(|source| ProcessError::Write {
            path: file.output.clone(),
            source,
        })?;
        tracing::info!(output = %file.output.display(), "wrote");
    }
    Ok(())
}

// ------------------------------- Front API -------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub definitions: usize,
}

pub fn generate(options: &Options) -> Result<Vec<PathBuf>, ProcessError> {
    let rendered = prepare(options)?;
    write_all(&rendered, options.force)?;
    Ok(rendered.into_iter().map(|f| f.output).collect())
}

/// Output paths `generate` would write, without touching the filesystem.
pub fn dry_run(options: &Options) -> Result<Vec<PathBuf>, ProcessError> {
    Ok(prepare(options)?.into_iter().map(|f| f.output).collect())
}

/// Parse and resolve only.
pub fn validate(input: &Path) -> Result<Summary, ProcessError> {
    let workspace = load(input)?;
    let resolved = workspace.resolve()?;
    Ok(Summary { files: workspace.files.len(), definitions: resolved.len() })
}

fn prepare(options: &Options) -> Result<Vec<RenderedFile>, ProcessError> {
    let workspace = load(&options.input)?;
    let resolved = workspace.resolve()?;
    Ok(render(&workspace, &resolved, options))
}
