//! Command trait, registry, and dispatch logic.
//!
//! The dispatcher is the single pipeline every line passes through: parse,
//! resolve the verb, validate against the verb's rules, slice the dataset,
//! and invoke the handler — once per `by`-group when grouping is present,
//! once otherwise. Errors propagate to the read loop, which prints them and
//! continues.

use std::collections::HashMap;

use rustata_data::slice::{DataSubset, slice};
use rustata_types::error::{Result, RustataError};

use crate::commands;
use crate::parser;
use crate::session::Session;
use crate::validator::{self, CommandRules};

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to the read loop to terminate with status 0.
    Exit,
}

/// The parsed command's remaining fields, handed to the handler together
/// with the row subset it should run over (`None` when no dataset is
/// loaded).
pub struct CommandRequest<'a> {
    pub args: &'a [String],
    pub filter: Option<&'a str>,
    pub range: Option<(usize, usize)>,
    pub weight: Option<&'a str>,
    pub options: &'a [String],
    pub subset: Option<&'a DataSubset>,
}

/// A single executable procedure.
pub trait Command {
    /// The verb (what the user types).
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Syntax diagram line(s).
    fn usage(&self) -> &str;

    /// The verb's clause/option rule set.
    fn rules(&self) -> CommandRules;

    /// Execute with the given request and session.
    fn execute(&self, req: &CommandRequest<'_>, session: &mut Session) -> Result<CommandOutput>;
}

/// Registry of available commands with dispatch.
///
/// Verbs are bound lazily: an unresolved verb is looked up in the fixed
/// procedure library at first use and cached for subsequent calls.
/// `register` allows eager registration and extension.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty registry; verbs bind from the procedure library on
    /// first use.
    pub fn new() -> Self {
        CommandRegistry {
            commands: HashMap::new(),
        }
    }

    /// Register a command eagerly. Replaces any command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Whether a verb is already bound (registered or cached).
    pub fn is_bound(&self, verb: &str) -> bool {
        self.commands.contains_key(verb)
    }

    fn resolve(&mut self, verb: &str) -> Result<&dyn Command> {
        if !self.commands.contains_key(verb) {
            match commands::bind(verb) {
                Some(cmd) => {
                    log::debug!("bound '{verb}' from the procedure library");
                    self.commands.insert(verb.to_string(), cmd);
                }
                None => {
                    return Err(RustataError::Syntax(format!(
                        "no command named '{verb}'"
                    )));
                }
            }
        }
        Ok(self.commands[verb].as_ref())
    }

    /// Parse, validate, slice, and execute one command line.
    pub fn dispatch(&mut self, line: &str, session: &mut Session) -> Result<CommandOutput> {
        let parsed = parser::parse(line)?;
        log::debug!("parsed command: {parsed:?}");
        let cmd = self.resolve(&parsed.verb)?;
        validator::validate(&cmd.rules(), &parsed)?;

        let subsets = match &session.data {
            Some(data) => Some(slice(
                data,
                parsed.range,
                parsed.filter.as_deref(),
                parsed.by.as_deref(),
            )?),
            None => {
                if parsed.by.is_some() || parsed.filter.is_some() || parsed.range.is_some() {
                    return Err(RustataError::syntax("no variables defined"));
                }
                None
            }
        };

        let request = |subset| CommandRequest {
            args: &parsed.args,
            filter: parsed.filter.as_deref(),
            range: parsed.range,
            weight: parsed.weight.as_deref(),
            options: &parsed.options,
            subset,
        };

        if parsed.by.is_none() {
            let subset = subsets.as_ref().and_then(|s| s.first());
            return cmd.execute(&request(subset), session);
        }

        // One invocation per group, in first-encounter order, each block
        // prefixed by a blank line and its group banner.
        let mut report = String::new();
        for subset in subsets.iter().flatten() {
            let key = subset.key.as_deref().unwrap_or("");
            report.push_str(&format!("\n-> {key}\n"));
            match cmd.execute(&request(Some(subset)), session)? {
                CommandOutput::Text(text) => report.push_str(&text),
                CommandOutput::None => {}
                CommandOutput::Exit => return Ok(CommandOutput::Exit),
            }
        }
        Ok(CommandOutput::Text(report))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        CommandRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use rustata_data::dataset::{Column, Dataset, Metadata};

    // Test double that records the row count of every subset it runs over.
    struct ProbeCmd {
        seen: Rc<RefCell<Vec<(Option<String>, usize)>>>,
    }

    impl Command for ProbeCmd {
        fn name(&self) -> &str {
            "probe"
        }
        fn description(&self) -> &str {
            "Record the subsets this command is invoked on"
        }
        fn usage(&self) -> &str {
            "probe [if] [in]"
        }
        fn rules(&self) -> CommandRules {
            CommandRules {
                allow_by: true,
                allow_if: true,
                allow_in: true,
                ..CommandRules::bare("probe")
            }
        }
        fn execute(
            &self,
            req: &CommandRequest<'_>,
            _session: &mut Session,
        ) -> Result<CommandOutput> {
            let (key, len) = match req.subset {
                Some(sub) => (sub.key.clone(), sub.len()),
                None => (None, 0),
            };
            self.seen.borrow_mut().push((key, len));
            Ok(CommandOutput::Text(format!("{len} rows")))
        }
    }

    fn grouped_session() -> Session {
        let mut session = Session::new();
        let data = Dataset::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::text(
                "g",
                vec!["A".into(), "A".into(), "B".into(), "A".into(), "B".into()],
            ),
        ])
        .unwrap();
        session.load(data, Metadata::default(), "test.csv".to_string());
        session
    }

    fn probe_registry() -> (CommandRegistry, Rc<RefCell<Vec<(Option<String>, usize)>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(ProbeCmd {
            seen: Rc::clone(&seen),
        }));
        (reg, seen)
    }

    #[test]
    fn unknown_verb_reports_not_found() {
        let mut reg = CommandRegistry::new();
        let mut session = Session::new();
        let err = reg.dispatch("frobnicate x", &mut session).unwrap_err();
        assert_eq!(format!("{err}"), "no command named 'frobnicate'");
    }

    #[test]
    fn funclib_verbs_bind_lazily_and_cache() {
        let mut reg = CommandRegistry::new();
        let mut session = Session::new();
        assert!(!reg.is_bound("sysuse"));
        reg.dispatch("sysuse auto", &mut session).unwrap();
        assert!(reg.is_bound("sysuse"));
        // Second dispatch hits the cache; still exactly one entry.
        reg.dispatch("sysuse auto", &mut session).unwrap();
        assert!(reg.is_bound("sysuse"));
        assert!(!reg.is_bound("describe"));
    }

    #[test]
    fn registered_command_shadows_funclib() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(ProbeCmd {
            seen: Rc::clone(&seen),
        }));
        assert!(reg.is_bound("probe"));
    }

    #[test]
    fn without_by_command_runs_once_on_all_rows() {
        let (mut reg, seen) = probe_registry();
        let mut session = grouped_session();
        reg.dispatch("probe", &mut session).unwrap();
        assert_eq!(&*seen.borrow(), &[(None, 5)]);
    }

    #[test]
    fn by_invokes_once_per_group_in_encounter_order() {
        let (mut reg, seen) = probe_registry();
        let mut session = grouped_session();
        let out = reg.dispatch("by g: probe", &mut session).unwrap();
        assert_eq!(
            &*seen.borrow(),
            &[(Some("g = A".to_string()), 3), (Some("g = B".to_string()), 2)]
        );
        match out {
            CommandOutput::Text(text) => {
                assert!(text.contains("\n-> g = A\n3 rows"));
                assert!(text.contains("\n-> g = B\n2 rows"));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn range_and_filter_restrict_the_single_subset() {
        let (mut reg, seen) = probe_registry();
        let mut session = grouped_session();
        reg.dispatch("probe in 2/4", &mut session).unwrap();
        reg.dispatch("probe if x > 3", &mut session).unwrap();
        assert_eq!(&*seen.borrow(), &[(None, 3), (None, 2)]);
    }

    #[test]
    fn validation_runs_before_slicing() {
        let (mut reg, seen) = probe_registry();
        let mut session = grouped_session();
        // Weights are not allowed for probe; the bad range must never be
        // reached.
        let err = reg.dispatch("probe in 0/99 [fw=w]", &mut session).unwrap_err();
        assert_eq!(format!("{err}"), "weights not allowed");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn clauses_without_data_fail() {
        let (mut reg, _) = probe_registry();
        let mut session = Session::new();
        for line in ["probe in 1/3", "probe if x>0", "by g: probe"] {
            let err = reg.dispatch(line, &mut session).unwrap_err();
            assert_eq!(format!("{err}"), "no variables defined", "{line}");
        }
    }

    #[test]
    fn command_without_data_and_without_clauses_runs() {
        let (mut reg, seen) = probe_registry();
        let mut session = Session::new();
        reg.dispatch("probe", &mut session).unwrap();
        assert_eq!(&*seen.borrow(), &[(None, 0)]);
    }

    #[test]
    fn out_of_range_surfaces_the_slicer_error() {
        let (mut reg, _) = probe_registry();
        let mut session = grouped_session();
        let err = reg.dispatch("probe in 0/3", &mut session).unwrap_err();
        assert_eq!(format!("{err}"), "observation numbers out of range");
    }
}
