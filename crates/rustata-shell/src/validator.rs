//! Per-verb syntax rules.
//!
//! Each command declares a [`CommandRules`] value: which clauses it accepts
//! and which options, including "must appear alone" and mutual-exclusion
//! constraints. Rules are data rather than code so adding a verb stays
//! declarative. Validation runs before any data access, so a rejected line
//! has zero side effects.

use rustata_types::error::{Result, RustataError};

use crate::parser::ParsedCommand;

/// An entry in a verb's option allow-list.
#[derive(Debug, Clone, Copy)]
pub enum OptionMatcher {
    /// A plain option name.
    Exact(&'static str),
    /// `separator(#)` with a decimal argument.
    SeparatorArg,
}

impl OptionMatcher {
    fn matches(&self, option: &str) -> bool {
        match self {
            OptionMatcher::Exact(name) => option == *name,
            OptionMatcher::SeparatorArg => parse_separator(option).is_some(),
        }
    }
}

/// Extract the argument of a well-formed `separator(#)` option.
pub fn parse_separator(option: &str) -> Option<usize> {
    let inner = option.strip_prefix("separator(")?.strip_suffix(')')?;
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

/// The syntax rule set for one verb.
#[derive(Debug, Clone, Copy)]
pub struct CommandRules {
    pub verb: &'static str,
    pub allow_by: bool,
    pub allow_if: bool,
    pub allow_in: bool,
    pub allow_weight: bool,
    /// Options beyond this count are rejected even when individually allowed.
    pub max_options: usize,
    pub allowed_options: &'static [OptionMatcher],
    /// Options that may not combine with any other, with their message.
    pub alone: &'static [(&'static str, &'static str)],
    /// Mutually exclusive pairs, with their message.
    pub exclusive: &'static [(&'static str, &'static str, &'static str)],
}

impl CommandRules {
    /// Rules for a verb that takes no clauses and no options.
    pub const fn bare(verb: &'static str) -> Self {
        CommandRules {
            verb,
            allow_by: false,
            allow_if: false,
            allow_in: false,
            allow_weight: false,
            max_options: 0,
            allowed_options: &[],
            alone: &[],
            exclusive: &[],
        }
    }
}

/// Check a parsed command against a verb's rules.
pub fn validate(rules: &CommandRules, parsed: &ParsedCommand) -> Result<()> {
    if parsed.by.is_some() && !rules.allow_by {
        return Err(RustataError::Syntax(format!(
            "{} may not be combined with by",
            rules.verb
        )));
    }
    if parsed.filter.is_some() && !rules.allow_if {
        return Err(RustataError::syntax("if not allowed"));
    }
    if parsed.range.is_some() && !rules.allow_in {
        return Err(RustataError::syntax("in range not allowed"));
    }
    if parsed.weight.is_some() && !rules.allow_weight {
        return Err(RustataError::syntax("weights not allowed"));
    }
    for (i, option) in parsed.options.iter().enumerate() {
        if i >= rules.max_options
            || !rules.allowed_options.iter().any(|m| m.matches(option))
        {
            return Err(RustataError::Syntax(format!("option {option} not allowed")));
        }
    }
    if parsed.options.len() > 1 {
        for (name, message) in rules.alone {
            if parsed.options.iter().any(|o| o == name) {
                return Err(RustataError::syntax(*message));
            }
        }
    }
    for (a, b, message) in rules.exclusive {
        if parsed.options.iter().any(|o| o == a) && parsed.options.iter().any(|o| o == b) {
            return Err(RustataError::syntax(*message));
        }
    }
    Ok(())
}
