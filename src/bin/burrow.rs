use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use burrow::{value::ValueKind, BurrowError, Interpreter, Repl};

#[derive(Parser)]
#[command(author, version, about = "Browse and call the symbols of a running process")]
struct Args {
    /// Log binder activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Let scripts dereference typed references with `load`
    #[arg(long, global = true)]
    allow_raw_reads: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a script file against the host namespace
    Run { script: PathBuf },
    /// Start an interactive REPL session
    Repl,
    /// Evaluate a snippet and print its result
    Eval { source: String },
    /// List every namespace the host exposes
    Packages,
}

fn main() -> Result<(), BurrowError> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut interpreter = Interpreter::for_host();
    if args.allow_raw_reads {
        // SAFETY: the operator opted in and owns the validity of every address
        // their scripts hand to `newAt`.
        unsafe { interpreter.session().enable_raw_reads() };
    }
    match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => {
            let source = fs::read_to_string(&script)?;
            interpreter.eval_source(&source)?;
            Ok(())
        }
        Command::Repl => Repl::new(interpreter).run(),
        Command::Eval { source } => {
            let value = interpreter.eval_source(&source)?;
            if !matches!(value.kind(), ValueKind::Unit) {
                println!("{value}");
            }
            Ok(())
        }
        Command::Packages => {
            for namespace in interpreter.session().packages()? {
                println!("{namespace}");
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("burrow=debug"),
        Err(_) => return,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
