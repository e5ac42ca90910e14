//! Interactive statistical shell: command grammar, per-verb validation,
//! and the built-in procedure library.
//!
//! A line of input flows through [`parser::parse`], the verb's
//! [`validator::CommandRules`], dataset slicing, and the resolved
//! [`Command`] handler. [`CommandRegistry::dispatch`] drives the whole
//! pipeline and is the only entry point the read loop needs.

pub mod commands;
pub mod format;
pub mod interpreter;
pub mod parser;
pub mod session;
pub mod validator;

pub use interpreter::{Command, CommandOutput, CommandRegistry, CommandRequest};
pub use parser::ParsedCommand;
pub use session::{Session, StoredResult};
