//! The built-in procedure library.
//!
//! One struct per verb. `bind` is the fixed library the registry consults
//! when a verb is first used; `register_builtins` registers every verb
//! eagerly for callers that prefer that.

use rustata_data::builtin::{builtin_names, resolve_dataset};
use rustata_data::dataset::{Dataset, Metadata};
use rustata_data::slice::{DataSubset, listwise_numeric};
use rustata_stats::ols::{self, OlsFit};
use rustata_stats::summary;
use rustata_types::error::{Result, RustataError};

use crate::format::{center, format_int_comma, format_number, format_varname, format_varname_right};
use crate::interpreter::{Command, CommandOutput, CommandRegistry, CommandRequest};
use crate::session::Session;
use crate::validator::{self, CommandRules, OptionMatcher};

/// Resolve a verb against the fixed procedure library.
pub fn bind(verb: &str) -> Option<Box<dyn Command>> {
    match verb {
        "sysuse" => Some(Box::new(SysuseCmd)),
        "describe" => Some(Box::new(DescribeCmd)),
        "exit" => Some(Box::new(ExitCmd)),
        "summarize" => Some(Box::new(SummarizeCmd)),
        "regress" => Some(Box::new(RegressCmd)),
        _ => None,
    }
}

/// Register every library verb eagerly.
pub fn register_builtins(reg: &mut CommandRegistry) {
    for verb in ["sysuse", "describe", "exit", "summarize", "regress"] {
        if let Some(cmd) = bind(verb) {
            reg.register(cmd);
        }
    }
}

fn pn(x: f64) -> String {
    format_number(x, 8)
}

// The non-missing numeric values of `var` within the subset. Resolution has
// already checked the name, so a lookup miss yields no observations.
fn clean_values(data: &Dataset, subset: &DataSubset, var: &str) -> Vec<f64> {
    data.column(var)
        .map(|col| subset.numeric_clean(col))
        .unwrap_or_default()
}

fn no_data() -> RustataError {
    RustataError::syntax("no variables defined")
}

// ---------------------------------------------------------------------------
// sysuse
// ---------------------------------------------------------------------------

struct SysuseCmd;
impl Command for SysuseCmd {
    fn name(&self) -> &str {
        "sysuse"
    }
    fn description(&self) -> &str {
        "Use shipped dataset"
    }
    fn usage(&self) -> &str {
        "sysuse [\"]filename[\"] [, clear]\nsysuse dir [, all]"
    }
    fn rules(&self) -> CommandRules {
        CommandRules {
            max_options: 1,
            allowed_options: &[OptionMatcher::Exact("clear"), OptionMatcher::Exact("all")],
            ..CommandRules::bare("sysuse")
        }
    }
    fn execute(&self, req: &CommandRequest<'_>, session: &mut Session) -> Result<CommandOutput> {
        match req.args.len() {
            0 => return Err(RustataError::syntax("invalid file specification")),
            1 => {}
            _ => {
                return Err(RustataError::Syntax(format!("invalid {}", req.args[1])));
            }
        }
        let name = req.args[0].trim_matches('"');
        if name == "dir" {
            // `clear` belongs to file mode only.
            if req.options.iter().any(|o| o == "clear") {
                return Err(RustataError::syntax("option clear not allowed"));
            }
            return Ok(CommandOutput::Text(name_columns(builtin_names())));
        }
        if req.options.iter().any(|o| o == "all") {
            return Err(RustataError::syntax("option all not allowed"));
        }
        let (data, meta, source) = resolve_dataset(name)?;
        let label = meta.file_label.clone();
        session.load(data, meta, source);
        Ok(CommandOutput::Text(format!("({label})")))
    }
}

// Four names per row, each in a 12-character column.
fn name_columns<S: AsRef<str>>(names: &[S]) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    for (i, name) in names.iter().enumerate() {
        line.push_str(&format_varname(name.as_ref(), 12));
        line.push_str("  ");
        if i % 4 == 3 {
            lines.push(std::mem::take(&mut line));
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// describe
// ---------------------------------------------------------------------------

struct DescribeCmd;
impl Command for DescribeCmd {
    fn name(&self) -> &str {
        "describe"
    }
    fn description(&self) -> &str {
        "Describe data in memory or in file"
    }
    fn usage(&self) -> &str {
        "describe [varlist] [, simple|short|fullnames|numbers]\ndescribe [varlist] using filename [, ...]"
    }
    fn rules(&self) -> CommandRules {
        CommandRules {
            max_options: 4,
            allowed_options: &[
                OptionMatcher::Exact("simple"),
                OptionMatcher::Exact("short"),
                OptionMatcher::Exact("fullnames"),
                OptionMatcher::Exact("numbers"),
            ],
            alone: &[("simple", "simple may not be combined with other options")],
            exclusive: &[(
                "numbers",
                "fullnames",
                "options numbers and fullnames may not be combined",
            )],
            ..CommandRules::bare("describe")
        }
    }
    fn execute(&self, req: &CommandRequest<'_>, session: &mut Session) -> Result<CommandOutput> {
        let opts = DescribeOpts::from(req.options);
        // `using` mode loads the named file transiently, leaving the
        // session untouched.
        if req.args.len() >= 2 && req.args[req.args.len() - 2] == "using" {
            let name = req.args[req.args.len() - 1].trim_matches('"');
            let (data, meta, source) = resolve_dataset(name)?;
            let varlist = &req.args[..req.args.len() - 2];
            return Ok(CommandOutput::Text(render_describe(
                &data, &meta, &source, varlist, &opts,
            )?));
        }
        let data = session.data.as_ref().ok_or_else(no_data)?;
        let dir = session.globals.get("dir").cloned().unwrap_or_default();
        let text = render_describe(data, &session.meta, &dir, req.args, &opts)?;
        Ok(CommandOutput::Text(text))
    }
}

struct DescribeOpts {
    simple: bool,
    short: bool,
    fullnames: bool,
    numbers: bool,
}

impl DescribeOpts {
    fn from(options: &[String]) -> Self {
        let has = |name: &str| options.iter().any(|o| o == name);
        DescribeOpts {
            simple: has("simple"),
            short: has("short"),
            fullnames: has("fullnames"),
            numbers: has("numbers"),
        }
    }
}

fn render_describe(
    data: &Dataset,
    meta: &Metadata,
    dir: &str,
    requested: &[String],
    opts: &DescribeOpts,
) -> Result<String> {
    // `simple` lists every column name and ignores the varlist.
    if opts.simple {
        return Ok(name_columns(&data.names()));
    }

    let mut out = Vec::new();
    out.push(format!("Contains data from {dir}"));
    out.push(format!(
        "{:<6}{:>14}{}{}",
        "obs:",
        format_int_comma(data.nrows()),
        " ".repeat(18),
        meta.file_label
    ));
    out.push(format!(
        "{:<6}{:>14}",
        "vars:",
        format_int_comma(data.ncols())
    ));
    let notes_tag = if meta.notes.is_empty() {
        String::new()
    } else {
        format!("{}(_dta has notes)", " ".repeat(18))
    };
    out.push(format!(
        "{:<6}{:>14}{notes_tag}",
        "size:",
        format_int_comma(data.approx_size())
    ));
    if opts.short {
        return Ok(out.join("\n"));
    }

    let varlist = data.resolve_varlist(requested)?;
    out.push("-".repeat(82));
    out.push("              storage    value".to_string());
    out.push("variable name   type     label      variable label".to_string());
    out.push("-".repeat(82));
    for (i, var) in varlist.iter().enumerate() {
        let dtype = data.column(var).map_or("", |c| c.dtype());
        let head = if opts.numbers {
            format!("{:>4}. {} ", i + 1, format_varname(var, 8))
        } else if opts.fullnames {
            if var.len() > 15 {
                format!("{var:<16}\n{}", " ".repeat(16))
            } else {
                format!("{var:<16}")
            }
        } else {
            format!("{} ", format_varname(var, 15))
        };
        out.push(format!(
            "{head}{dtype:<9}{:<11}{}",
            meta.value_label_for(var),
            meta.label_for(var)
        ));
    }
    out.push("-".repeat(82));
    Ok(out.join("\n"))
}

// ---------------------------------------------------------------------------
// exit
// ---------------------------------------------------------------------------

struct ExitCmd;
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn description(&self) -> &str {
        "Exit the shell"
    }
    fn usage(&self) -> &str {
        "exit [, clear]"
    }
    fn rules(&self) -> CommandRules {
        CommandRules {
            max_options: 1,
            allowed_options: &[OptionMatcher::Exact("clear")],
            ..CommandRules::bare("exit")
        }
    }
    fn execute(&self, req: &CommandRequest<'_>, session: &mut Session) -> Result<CommandOutput> {
        if let Some(first) = req.args.first() {
            return Err(RustataError::Syntax(format!("{first} not allowed")));
        }
        if session.dirty && req.options.is_empty() {
            return Err(RustataError::syntax("no, data in memory would be lost"));
        }
        Ok(CommandOutput::Exit)
    }
}

// ---------------------------------------------------------------------------
// summarize
// ---------------------------------------------------------------------------

const SUM_HEADER: &str = "    Variable |        Obs        Mean    Std. Dev.       Min        Max";
const SUM_RULE: &str = "-------------+---------------------------------------------------------";

struct SummarizeCmd;
impl Command for SummarizeCmd {
    fn name(&self) -> &str {
        "summarize"
    }
    fn description(&self) -> &str {
        "Summary statistics"
    }
    fn usage(&self) -> &str {
        "summarize [varlist] [if] [in] [weight] [, detail separator(#)]"
    }
    fn rules(&self) -> CommandRules {
        CommandRules {
            verb: "summarize",
            allow_by: true,
            allow_if: true,
            allow_in: true,
            allow_weight: true,
            max_options: 2,
            allowed_options: &[
                OptionMatcher::Exact("detail"),
                OptionMatcher::SeparatorArg,
            ],
            alone: &[],
            exclusive: &[],
        }
    }
    fn execute(&self, req: &CommandRequest<'_>, session: &mut Session) -> Result<CommandOutput> {
        let detail = req.options.iter().any(|o| o == "detail");
        let separator = req
            .options
            .iter()
            .find_map(|o| validator::parse_separator(o))
            .unwrap_or(5);

        let (text, last) = {
            let data = session.data.as_ref().ok_or_else(no_data)?;
            let varlist = data.resolve_varlist(req.args)?;
            let whole;
            let subset = match req.subset {
                Some(sub) => sub,
                None => {
                    whole = DataSubset::all(data);
                    &whole
                }
            };
            let text = if detail {
                render_detail(data, &session.meta, subset, &varlist)
            } else {
                render_basic(data, subset, &varlist, separator)
            };
            let last = varlist
                .last()
                .map(|var| summary::basic(&clean_values(data, subset, var)));
            (text, last)
        };
        if let Some(stats) = last {
            session.set_scalar("N", stats.obs as f64);
            session.set_scalar("mean", stats.mean);
            session.set_scalar("sd", stats.std_dev);
            session.set_scalar("min", stats.min);
            session.set_scalar("max", stats.max);
        }
        Ok(CommandOutput::Text(text))
    }
}

fn render_basic(data: &Dataset, subset: &DataSubset, varlist: &[String], separator: usize) -> String {
    let mut out = vec![SUM_HEADER.to_string(), SUM_RULE.to_string()];
    for (i, var) in varlist.iter().enumerate() {
        let stats = summary::basic(&clean_values(data, subset, var));
        let mut row = format!(
            "{} |   {}",
            format_varname_right(var, 12),
            pn(stats.obs as f64)
        );
        if stats.obs != 0 {
            row.push_str(&format!(
                "    {}    {}   {}   {}",
                pn(stats.mean),
                pn(stats.std_dev),
                pn(stats.min),
                pn(stats.max)
            ));
        }
        out.push(row);
        // `separator(0)` disables the repeating rule.
        if separator != 0 && (i + 1) % separator == 0 {
            out.push(SUM_RULE.to_string());
        }
    }
    out.join("\n")
}

fn render_detail(
    data: &Dataset,
    meta: &Metadata,
    subset: &DataSubset,
    varlist: &[String],
) -> String {
    let mut out = Vec::new();
    for var in varlist {
        let label = match meta.label_for(var) {
            "" => var.as_str(),
            label => label,
        };
        out.push(center(label, 61));
        out.push("-".repeat(61));
        let d = summary::detail(&clean_values(data, subset, var));
        if d.obs == 0 {
            out.push("no observations".to_string());
        } else {
            // With fewer than four observations the smallest list fills
            // from the 1% row down and the largest list from the 99% row
            // up, keeping the maximum on the 99% row.
            let blank = " ".repeat(8);
            let small =
                |i: usize| d.smallest.get(i).map_or_else(|| blank.clone(), |v| pn(*v));
            let pad = 4 - d.largest.len();
            let large = |i: usize| {
                if i >= pad {
                    pn(d.largest[i - pad])
                } else {
                    blank.clone()
                }
            };
            out.push("      Percentiles      Smallest".to_string());
            out.push(format!(" 1%     {}       {}", pn(d.p1), small(0)));
            out.push(format!(" 5%     {}       {}", pn(d.p5), small(1)));
            out.push(format!(
                "10%     {}       {}       Obs            {}",
                pn(d.p10),
                small(2),
                pn(d.obs as f64)
            ));
            out.push(format!(
                "25%     {}       {}       Sum of Wgt.            ",
                pn(d.p25),
                small(3)
            ));
            out.push(String::new());
            out.push(format!(
                "50%     {}                      Mean           {}",
                pn(d.p50),
                pn(d.mean)
            ));
            out.push(format!(
                "                        Largest       Std. Dev.      {}",
                pn(d.std_dev)
            ));
            out.push(format!("75%     {}       {}", pn(d.p75), large(0)));
            out.push(format!(
                "90%     {}       {}       Variance       {}",
                pn(d.p90),
                large(1),
                pn(d.variance)
            ));
            out.push(format!(
                "95%     {}       {}       Skewness       {}",
                pn(d.p95),
                large(2),
                pn(d.skewness)
            ));
            out.push(format!(
                "99%     {}       {}       Kurtosis       {}",
                pn(d.p99),
                large(3),
                pn(d.kurtosis)
            ));
        }
        out.push(String::new());
    }
    out.join("\n")
}

// ---------------------------------------------------------------------------
// regress
// ---------------------------------------------------------------------------

struct RegressCmd;
impl Command for RegressCmd {
    fn name(&self) -> &str {
        "regress"
    }
    fn description(&self) -> &str {
        "Linear regression"
    }
    fn usage(&self) -> &str {
        "regress depvar indepvars [if] [in] [weight] [, noconstant]"
    }
    fn rules(&self) -> CommandRules {
        CommandRules {
            verb: "regress",
            allow_by: true,
            allow_if: true,
            allow_in: true,
            allow_weight: true,
            max_options: 1,
            allowed_options: &[OptionMatcher::Exact("noconstant")],
            alone: &[],
            exclusive: &[],
        }
    }
    fn execute(&self, req: &CommandRequest<'_>, session: &mut Session) -> Result<CommandOutput> {
        if req.args.is_empty() {
            return Err(RustataError::syntax("no variable provided"));
        }
        if req.args.len() == 1 {
            return Err(RustataError::syntax("no independent variable provided"));
        }
        let constant = !req.options.iter().any(|o| o == "noconstant");

        let (text, fit) = {
            let data = session.data.as_ref().ok_or_else(no_data)?;
            let varlist = data.resolve_varlist(req.args)?;
            let whole;
            let subset = match req.subset {
                Some(sub) => sub,
                None => {
                    whole = DataSubset::all(data);
                    &whole
                }
            };
            let columns = listwise_numeric(data, subset, &varlist)?;
            let fit = ols::estimate(&columns[0], &columns[1..], constant)?;
            let mut names: Vec<String> = varlist[1..].to_vec();
            if constant {
                names.push("_cons".to_string());
            }
            (render_regress(&varlist[0], &names, &fit), fit)
        };

        session.set_scalar("N", fit.n as f64);
        session.set_scalar("r2", fit.r_squared);
        session.set_scalar("r2_a", fit.adj_r_squared);
        session.set_scalar("F", fit.f);
        session.set_scalar("rmse", fit.root_mse);
        session.set_vector("b", fit.beta);
        Ok(CommandOutput::Text(text))
    }
}

fn render_regress(depvar: &str, names: &[String], fit: &OlsFit) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "      Source |       SS           df       MS      Number of obs   = {}",
        format_number(fit.n as f64, 9)
    ));
    let f_label = format!("({}, {})", fit.df_model, fit.df_resid);
    let f_value = if fit.f.is_nan() {
        format!("{:>9}", ".")
    } else {
        format!("{:9.2}", fit.f)
    };
    out.push(format!(
        "-------------+----------------------------------   F{f_label:<14} = {f_value}"
    ));
    let f_prob = if fit.f_prob.is_nan() {
        ".".to_string()
    } else {
        format!("{:.4}", fit.f_prob)
    };
    out.push(format!(
        "       Model |  {} {}  {}   Prob > F        =    {f_prob}",
        format_number(fit.ssr, 10),
        format_number(fit.df_model as f64, 9),
        format_number(fit.ms_model, 10)
    ));
    out.push(format!(
        "    Residual |  {} {}  {}   R-squared       =    {:.4}",
        format_number(fit.sse, 10),
        format_number(fit.df_resid as f64, 9),
        format_number(fit.ms_resid, 10),
        fit.r_squared
    ));
    out.push(format!(
        "-------------+----------------------------------   Adj R-squared   =    {:.4}",
        fit.adj_r_squared
    ));
    out.push(format!(
        "       Total |  {} {}  {}   Root MSE        =    {}",
        format_number(fit.sst, 10),
        format_number(fit.df_total as f64, 9),
        format_number(fit.ms_total, 10),
        format_number(fit.root_mse, 6)
    ));
    out.push(String::new());
    out.push("-".repeat(78));
    out.push(format!(
        "{} |      Coef.   Std. Err.      t    P>|t|     [95% Conf. Interval]",
        format_varname(depvar, 12)
    ));
    out.push(
        "-------------+----------------------------------------------------------------"
            .to_string(),
    );
    for (i, name) in names.iter().enumerate() {
        out.push(format!(
            "{} |   {}   {}   {:6.2}   {:.3}     {}    {}",
            format_varname(name, 12),
            pn(fit.beta[i]),
            pn(fit.std_err[i]),
            fit.t[i],
            fit.p[i],
            pn(fit.ci_low[i]),
            pn(fit.ci_high[i])
        ));
    }
    out.push("-".repeat(78));
    out.join("\n")
}
