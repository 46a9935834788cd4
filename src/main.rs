use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::{debug, error, info};
use thiserror::Error;

mod analysis;
mod backend;
mod frontend;
mod ir;

use analysis::semantic::{SemanticError, SymbolTable};
use backend::CodegenError;

#[derive(Parser)]
#[command(name = "toyc")]
#[command(about = "Compiles a straight-line toy program to RISC-V assembly")]
#[command(version = "0.1.0")]
struct Config {
    /// Source file
    source: PathBuf,

    /// Assembly output; defaults to the source path with an .asm extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the IR, one instruction per line, before normalization
    #[arg(long)]
    ir: Option<PathBuf>,

    /// Also write the symbol table, one `(name, type)` entry per line
    #[arg(long)]
    symbols: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum CompileError {
    #[error("could not access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error(s):\n{}", .0.join("\n"))]
    Parse(Vec<String>),

    #[error("semantic error(s):\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Semantic(Vec<SemanticError>),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

#[derive(Debug)]
struct Compiled {
    symbols: SymbolTable,
    ir: Vec<ir::Instruction>,
    assembly: String,
}

fn compile(source_code: &str) -> Result<Compiled, CompileError> {
    let ast = frontend::parser::parse(source_code).map_err(|errs| {
        CompileError::Parse(errs.iter().map(|err| format!("{:?}", err)).collect())
    })?;
    debug!("parsed {} statement(s)", ast.statements.len());

    let symbols = analysis::semantic::check(&ast).map_err(CompileError::Semantic)?;
    debug!("{} variable(s) declared", symbols.len());

    let mut temps = ir::Temps::new();
    let instructions = ir::lower::lower(&ast, &mut temps);
    let assembly = backend::generate(&instructions, &temps)?;

    Ok(Compiled { symbols, ir: instructions, assembly })
}

fn symbol_listing(symbols: &SymbolTable) -> String {
    let mut names: Vec<_> = symbols.keys().collect();
    names.sort();

    let mut listing = String::new();
    for name in names {
        listing.push_str(&format!("({}, {})\n", name, symbols[name].ty));
    }
    listing
}

fn write(path: &Path, contents: &str) -> Result<(), CompileError> {
    fs::write(path, contents).map_err(|source| CompileError::Io { path: path.to_path_buf(), source })
}

fn run(config: &Config) -> Result<PathBuf, CompileError> {
    let source_code = fs::read_to_string(&config.source).map_err(|source| CompileError::Io {
        path: config.source.clone(),
        source,
    })?;

    let compiled = compile(&source_code)?;

    if let Some(ir_path) = &config.ir {
        let mut listing = String::new();
        for instr in &compiled.ir {
            listing.push_str(&instr.to_string());
            listing.push('\n');
        }
        write(ir_path, &listing)?;
        info!("IR written to {}", ir_path.display());
    }

    if let Some(symbols_path) = &config.symbols {
        write(symbols_path, &symbol_listing(&compiled.symbols))?;
        info!("symbol table written to {}", symbols_path.display());
    }

    let destination = config
        .output
        .clone()
        .unwrap_or_else(|| config.source.with_extension("asm"));
    write(&destination, &compiled.assembly)?;

    Ok(destination)
}

/// The error followed by each of its causes, `: `-separated.
fn describe(err: &CompileError) -> String {
    let mut message = err.to_string();
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        message.push_str(&format!(": {}", inner));
        cause = inner.source();
    }
    message
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    match run(&config) {
        Ok(destination) => info!("Compilation successful, wrote {}", destination.display()),
        Err(err) => {
            error!("compilation of {} failed", config.source.display());
            eprintln!("error: {}", describe(&err));
            process::exit(1);
        }
    }
}
