//! The Helion type-core driver.
//!
//! Provides the `helionc` command with the following subcommands:
//!
//! - `helionc unify <A> <B>` - Unify two type annotations and print the solution
//! - `helionc subtype <A> <B>` - Check whether `A <: B` in the nominal registry
//! - `helionc layout <T>` - Print the lowered layout of a type as JSON
//! - `helionc show <T>` - Print the canonical, mangled and structural forms of a type
//!
//! Options:
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `--verbose` - Log type-core events to stderr (`RUST_LOG` overrides)

use std::process;

use clap::{Parser, Subcommand};
use rustc_hash::FxHashMap;
use tracing_subscriber::EnvFilter;

use helion_common::{parse_annotation, TypeAnnotation};
use helion_typeck::diagnostics::{render_diagnostic, Diagnose, DiagnosticOptions};
use helion_typeck::{
    convert_with_params, from_datatype, subtype, to_datatype, ConstraintOrigin, DatatypeId,
    InferCtx, Registry, Ty,
};

#[derive(Parser)]
#[command(name = "helionc", version, about = "The Helion type core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output diagnostics as JSON (one object per line) instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Disable colorized output
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Log type-core events at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Unify two type annotations
    Unify { left: String, right: String },
    /// Check whether the first type is a subtype of the second
    Subtype { sub: String, sup: String },
    /// Print the memory layout of a type
    Layout { ty: String },
    /// Print the canonical forms of a type
    Show { ty: String },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let diag_opts = DiagnosticOptions {
        color: !cli.no_color && !cli.json,
        json: cli.json,
    };

    if let Err(rendered) = run(cli.command, &diag_opts) {
        eprintln!("{}", rendered);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one subcommand. Errors come back already rendered.
fn run(command: Commands, opts: &DiagnosticOptions) -> Result<(), String> {
    match command {
        Commands::Unify { left, right } => {
            let left_ann = parse(&left, opts)?;
            let right_ann = parse(&right, opts)?;

            let mut ctx = InferCtx::new();
            let (left_ty, left_params) =
                convert_with_params(&mut ctx, &left_ann).map_err(|e| report(&e, &left, opts))?;
            let (right_ty, right_params) =
                convert_with_params(&mut ctx, &right_ann).map_err(|e| report(&e, &right, opts))?;

            let origin = ConstraintOrigin::Annotation {
                span: right_ann.span,
            };
            ctx.unify(left_ty.clone(), right_ty, origin)
                .map_err(|e| report(&e, &right, opts))?;

            println!("{}", ctx.display(left_ty));
            for line in solved_params(&mut ctx, left_params, right_params) {
                println!("  {}", line);
            }
            Ok(())
        }

        Commands::Subtype { sub, sup } => {
            let registry = Registry::new();
            let a = datatype(&registry, &sub, opts)?;
            let b = datatype(&registry, &sup, opts)?;
            let holds = subtype(&registry, a, b).map_err(|e| report(&e, &sub, opts))?;
            println!("{}", holds);
            Ok(())
        }

        Commands::Layout { ty } => {
            let registry = Registry::new();
            let id = datatype(&registry, &ty, opts)?;
            let layout = registry.layout(id).map_err(|e| report(&e, &ty, opts))?;
            let json = serde_json::to_string_pretty(&*layout).map_err(|e| e.to_string())?;
            println!("{}", json);
            println!("size: {} bytes", layout.size());
            Ok(())
        }

        Commands::Show { ty } => {
            let registry = Registry::new();
            let id = datatype(&registry, &ty, opts)?;
            let supertype = registry.supertype(id);
            println!("type:       {}", registry.display(id));
            println!("style:      {}", registry.style(id));
            println!("supertype:  {}", registry.display(supertype));
            println!("mangled:    {}", registry.mangled_name(id));
            println!("structural: {}", from_datatype(&registry, id));
            Ok(())
        }
    }
}

/// Parameter bindings from both sides, qualified by side since each side
/// names its parameters independently.
fn solved_params(
    ctx: &mut InferCtx,
    left: FxHashMap<String, Ty>,
    right: FxHashMap<String, Ty>,
) -> Vec<String> {
    let mut bindings: Vec<_> = left
        .into_iter()
        .map(|(name, var)| ("left", name, var))
        .chain(right.into_iter().map(|(name, var)| ("right", name, var)))
        .collect();
    bindings.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    bindings
        .into_iter()
        .map(|(side, name, var)| format!("{}.{} = {}", side, name, ctx.display(var)))
        .collect()
}

fn report<E: Diagnose>(error: &E, source: &str, opts: &DiagnosticOptions) -> String {
    render_diagnostic(error, source, "<argument>", opts)
}

fn parse(source: &str, opts: &DiagnosticOptions) -> Result<TypeAnnotation, String> {
    parse_annotation(source).map_err(|e| report(&e, source, opts))
}

fn datatype(registry: &Registry, source: &str, opts: &DiagnosticOptions) -> Result<DatatypeId, String> {
    let ann = parse(source, opts)?;
    to_datatype(registry, &ann, &FxHashMap::default()).map_err(|e| report(&e, source, opts))
}
