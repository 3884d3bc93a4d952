use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{
    diagnostics::{BurrowError, Result},
    runtime::Interpreter,
    value::ValueKind,
};

pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(readline_error)?;
        loop {
            match editor.readline("burrow> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    match self.interpreter.eval_source(trimmed) {
                        Ok(value) => {
                            if !matches!(value.kind(), ValueKind::Unit) {
                                println!("{value}");
                            }
                        }
                        Err(BurrowError::Diagnostic(diag)) => {
                            eprintln!("{:?}: {}", diag.kind, diag.message);
                            for note in &diag.notes {
                                eprintln!("  note: {note}");
                            }
                        }
                        Err(other) => eprintln!("error: {other}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(readline_error(err)),
            }
        }
        Ok(())
    }
}

fn readline_error(err: ReadlineError) -> BurrowError {
    BurrowError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
}
