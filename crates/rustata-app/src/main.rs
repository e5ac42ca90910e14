//! rustata interactive entry point.
//!
//! Reads command lines with history editing, dispatches each through the
//! shell registry, and prints reports or errors. Ctrl-C interrupts the
//! current line; Ctrl-D or `exit` ends the session.

use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use rustata_shell::{CommandOutput, CommandRegistry, Session};

const LOGOTYPE: &str = r"  ___  ____  ____  ____  ____
 /__    /   ____/   /   ____/
___/   /   /___/   /   /___/
  Statistics/Data Analysis";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::info!("starting rustata {}", env!("CARGO_PKG_VERSION"));

    println!("{LOGOTYPE}");
    println!();
    println!("rustata {}", env!("CARGO_PKG_VERSION"));
    println!("type a command, or exit to leave");
    println!();

    let mut registry = CommandRegistry::new();
    let mut session = Session::new();
    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline(". ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(&line)?;
                match registry.dispatch(&line, &mut session) {
                    Ok(CommandOutput::Text(text)) => println!("{text}"),
                    Ok(CommandOutput::None) => {}
                    Ok(CommandOutput::Exit) => break,
                    Err(e) => println!("{}", e.to_string().bold().red()),
                }
            }
            Err(ReadlineError::Interrupted) => println!("--Break--"),
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
