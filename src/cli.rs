//! CLI: generate | validate | dry-run | resolve
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::format::{Target, DEFAULT_INDENT};
use crate::naming::NamingStyle;
use crate::process;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Go or TypeScript constants, enums, templates and types from JSON definitions
#[derive(Parser, Debug)]
#[command(name = "konst", version)]
pub struct CommandLineInterface {
    /// more log output (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// resolve definitions and write one output file per input file
    Generate(GenerateOut),
    /// parse and resolve without writing anything
    Validate(InputSettings),
    /// list the files `generate` would write
    DryRun(GenerateOut),
    /// print the merged definitions with every reference resolved
    Resolve(ResolveOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// definition file, or a directory searched recursively for *.json
    #[arg(short, long, env = "KONST_INPUT", default_value = "konst.json")]
    input: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory (next to the input if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// target language
    #[arg(short, long, value_enum, env = "KONST_MODE", default_value_t = Target::Go)]
    mode: Target,

    /// output file naming (snake for go, kebab for ts if omitted)
    #[arg(long, value_enum, env = "KONST_NAMING")]
    naming: Option<NamingStyle>,

    /// indent width for TypeScript output
    #[arg(long, default_value_t = DEFAULT_INDENT)]
    indent: usize,

    /// overwrite existing output files
    #[arg(short, long, default_value_t = false)]
    force: bool,
}

#[derive(Args, Debug, Clone)]
struct ResolveOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl GenerateOut {
    fn options(&self) -> process::Options {
        process::Options {
            input: self.input_settings.input.clone(),
            out: self.out.clone(),
            target: self.mode,
            naming: self.naming,
            indent: self.indent,
            force: self.force,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let options = target.options();
                let written = process::generate(&options)
                    .with_context(|| format!("cannot generate from {}", options.input.display()))?;
                for path in &written {
                    eprintln!("{} {}", "✓".green(), path.display());
                }
                let total = format!("generated {} {} file(s)", written.len(), options.target);
                eprintln!("{}", total.bold());
            }
            Command::Validate(input) => {
                let summary = process::validate(&input.input)
                    .with_context(|| format!("{} is not valid", input.input.display()))?;
                eprintln!(
                    "{} {} definition(s) across {} file(s) resolve cleanly",
                    "✓".green().bold(),
                    summary.definitions,
                    summary.files
                );
            }
            Command::DryRun(target) => {
                let options = target.options();
                let planned = process::dry_run(&options)?;
                for path in &planned {
                    let note = if path.exists() {
                        " (exists)".yellow().to_string()
                    } else {
                        String::new()
                    };
                    println!("{}{note}", path.display());
                }
            }
            Command::Resolve(target) => {
                let workspace = process::load(&target.input_settings.input)?;
                let schema = workspace.resolved_schema()?;
                let schema_src = serde_json::to_string_pretty(&schema)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("cannot create {}", parent.display()))?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("cannot write {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
            }
        }
        Ok(())
    }
}
