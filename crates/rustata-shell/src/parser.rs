//! Command-line grammar parser.
//!
//! A line combines an optional `by <varlist> :` prefix, a verb, positional
//! arguments, and optional `if`/`in`/weight/option clauses:
//!
//! ```text
//! line      := [ by-clause ] verb args* [ if-clause ] [ in-clause ] [ weight-clause ] [ option-clause ]
//! by-clause := "by" ident+ ":"
//! if-clause := "if" rest-of-line
//! in-clause := "in" INT "/" INT
//! weight-clause := "[" text "]"
//! option-clause := "," ident ( " " ident )*
//! ```
//!
//! Extraction order is fixed and significant: `by` prefix, then options,
//! weight, `in`-range, and `if` last. Each clause is deleted from the
//! working string before the next is searched, so the greedy-to-end-of-line
//! `if` capture never swallows a clause extracted before it.

use rustata_types::error::{Result, RustataError};

/// A structured command line. `range` is 1-indexed inclusive observation
/// numbers; `options` preserve their written order because some rules apply
/// to the first option only.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub by: Option<Vec<String>>,
    pub verb: String,
    pub args: Vec<String>,
    pub filter: Option<String>,
    pub range: Option<(usize, usize)>,
    pub weight: Option<String>,
    pub options: Vec<String>,
}

/// Parse a raw command line. Fails with `no command given` when no verb
/// token remains after clause removal.
pub fn parse(line: &str) -> Result<ParsedCommand> {
    let mut work = line.trim().to_string();

    let by = extract_by(&mut work)?;
    let options = extract_options(&mut work);
    let weight = extract_weight(&mut work);
    let range = extract_range(&mut work);
    let filter = extract_filter(&mut work);

    let mut tokens = work.split_whitespace().map(str::to_string);
    let verb = tokens
        .next()
        .ok_or_else(|| RustataError::syntax("no command given"))?;
    Ok(ParsedCommand {
        by,
        verb,
        args: tokens.collect(),
        filter,
        range,
        weight,
        options,
    })
}

// `by` is recognized only as a line prefix and only with a closing colon;
// anything else leaves the token in place to be read as the verb.
fn extract_by(work: &mut String) -> Result<Option<Vec<String>>> {
    let Some(rest) = work.strip_prefix("by") else {
        return Ok(None);
    };
    if !rest.starts_with(char::is_whitespace) {
        return Ok(None);
    }
    let Some(colon) = rest.find(':') else {
        return Ok(None);
    };
    let vars: Vec<String> = rest[..colon].split_whitespace().map(str::to_string).collect();
    if vars.is_empty() {
        return Err(RustataError::syntax("varlist required"));
    }
    *work = rest[colon + 1..].to_string();
    Ok(Some(vars))
}

fn extract_options(work: &mut String) -> Vec<String> {
    match work.find(',') {
        Some(pos) => {
            let options = work[pos + 1..]
                .split_whitespace()
                .map(str::to_string)
                .collect();
            work.truncate(pos);
            options
        }
        None => Vec::new(),
    }
}

// First `[` to last `]`, interior whitespace stripped.
fn extract_weight(work: &mut String) -> Option<String> {
    let open = work.find('[')?;
    let close = work.rfind(']')?;
    if open >= close {
        return None;
    }
    let spec: String = work[open + 1..close].split_whitespace().collect();
    work.replace_range(open..=close, " ");
    Some(spec)
}

// An `in` token followed by an `INT/INT` token. An `in` not followed by a
// valid range is left in place and surfaces downstream as an argument error.
fn extract_range(work: &mut String) -> Option<(usize, usize)> {
    let spans = token_spans(work);
    for window in spans.windows(2) {
        let (kw_start, kw_end) = window[0];
        let (arg_start, arg_end) = window[1];
        if &work[kw_start..kw_end] == "in"
            && let Some(range) = parse_range(&work[arg_start..arg_end])
        {
            work.replace_range(kw_start..arg_end, " ");
            return Some(range);
        }
    }
    None
}

fn parse_range(token: &str) -> Option<(usize, usize)> {
    let (start, end) = token.split_once('/')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

// Everything after the first `if` token, trimmed, taken verbatim. An `if`
// with nothing after it stays in place like any other argument.
fn extract_filter(work: &mut String) -> Option<String> {
    for (start, end) in token_spans(work) {
        if &work[start..end] == "if" {
            let expr = work[end..].trim();
            if expr.is_empty() {
                return None;
            }
            let expr = expr.to_string();
            work.truncate(start);
            return Some(expr);
        }
    }
    None
}

fn token_spans(s: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        if c.is_whitespace() {
            if let Some(st) = start.take() {
                spans.push((st, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(st) = start {
        spans.push((st, s.len()));
    }
    spans
}
