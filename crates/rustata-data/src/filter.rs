//! The `if`-clause filter: a minimal boolean expression over columns.
//!
//! Grammar: comparisons (`== != > < >= <=`) over column references, numeric
//! literals, and double-quoted string literals, combined with `&` and `|`
//! where `&` binds tighter. Text operands compare lexicographically. The
//! expression is compiled once per command against the active dataset, so
//! unknown variables and type mismatches are caught before any row work;
//! per-row evaluation is infallible and any comparison touching a missing
//! value is false.

use rustata_types::error::{Result, RustataError};

use crate::dataset::{ColumnData, Dataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    fn holds<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Le => lhs <= rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    Cmp(CmpOp),
    And,
    Or,
}

fn invalid(detail: &str) -> RustataError {
    RustataError::Syntax(format!("invalid expression: {detail}"))
}

fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(ch) => s.push(ch),
                        None => return Err(invalid("unterminated string")),
                    }
                }
                tokens.push(Token::Str(s));
            }
            '&' => {
                chars.next();
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Or);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                }
                tokens.push(Token::Cmp(CmpOp::Eq));
            }
            '!' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(invalid("expected != "));
                }
                tokens.push(Token::Cmp(CmpOp::Ne));
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Ge));
                } else {
                    tokens.push(Token::Cmp(CmpOp::Gt));
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Cmp(CmpOp::Le));
                } else {
                    tokens.push(Token::Cmp(CmpOp::Lt));
                }
            }
            _ if c.is_ascii_digit() || c == '.' || c == '-' => {
                chars.next();
                let mut num = String::from(c);
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = num
                    .parse()
                    .map_err(|_| invalid(&format!("bad number '{num}'")))?;
                tokens.push(Token::Number(value));
            }
            _ if c.is_alphabetic() || c == '_' => {
                chars.next();
                let mut ident = String::from(c);
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            _ => return Err(invalid(&format!("unexpected '{c}'"))),
        }
    }
    Ok(tokens)
}

/// A bound comparison operand. Column references are resolved to indices at
/// compile time so evaluation never fails.
#[derive(Debug, Clone)]
enum Operand {
    Number(f64),
    Literal(String),
    NumericCol(usize),
    TextCol(usize),
}

impl Operand {
    fn is_text(&self) -> bool {
        matches!(self, Operand::Literal(_) | Operand::TextCol(_))
    }

    fn number(&self, data: &Dataset, row: usize) -> f64 {
        match self {
            Operand::Number(v) => *v,
            Operand::NumericCol(idx) => match &data.columns()[*idx].data {
                ColumnData::Numeric(v) => v[row],
                ColumnData::Text(_) => f64::NAN,
            },
            _ => f64::NAN,
        }
    }

    fn text<'a>(&'a self, data: &'a Dataset, row: usize) -> &'a str {
        match self {
            Operand::Literal(s) => s,
            Operand::TextCol(idx) => match &data.columns()[*idx].data {
                ColumnData::Text(v) => &v[row],
                ColumnData::Numeric(_) => "",
            },
            _ => "",
        }
    }
}

#[derive(Debug, Clone)]
struct Comparison {
    lhs: Operand,
    op: CmpOp,
    rhs: Operand,
}

impl Comparison {
    fn holds(&self, data: &Dataset, row: usize) -> bool {
        if self.lhs.is_text() {
            self.op.holds(
                self.lhs.text(data, row),
                self.rhs.text(data, row),
            )
        } else {
            let l = self.lhs.number(data, row);
            let r = self.rhs.number(data, row);
            if l.is_nan() || r.is_nan() {
                return false;
            }
            self.op.holds(l, r)
        }
    }
}

/// A compiled filter: OR-connected groups of AND-connected comparisons.
#[derive(Debug, Clone)]
pub struct FilterExpr {
    groups: Vec<Vec<Comparison>>,
}

impl FilterExpr {
    /// Compile a filter source string against the dataset it will run over.
    pub fn compile(src: &str, data: &Dataset) -> Result<FilterExpr> {
        let tokens = tokenize(src)?;
        if tokens.is_empty() {
            return Err(invalid("empty"));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            data,
        };
        let groups = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(invalid("trailing tokens"));
        }
        Ok(FilterExpr { groups })
    }

    /// True when the row satisfies the expression.
    pub fn matches(&self, data: &Dataset, row: usize) -> bool {
        self.groups
            .iter()
            .any(|group| group.iter().all(|cmp| cmp.holds(data, row)))
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    data: &'a Dataset,
}

impl Parser<'_> {
    fn parse_or(&mut self) -> Result<Vec<Vec<Comparison>>> {
        let mut groups = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            groups.push(self.parse_and()?);
        }
        Ok(groups)
    }

    fn parse_and(&mut self) -> Result<Vec<Comparison>> {
        let mut group = vec![self.parse_comparison()?];
        while self.eat(&Token::And) {
            group.push(self.parse_comparison()?);
        }
        Ok(group)
    }

    fn parse_comparison(&mut self) -> Result<Comparison> {
        let lhs = self.parse_operand()?;
        let op = match self.next() {
            Some(Token::Cmp(op)) => op,
            _ => return Err(invalid("expected comparison operator")),
        };
        let rhs = self.parse_operand()?;
        if lhs.is_text() != rhs.is_text() {
            return Err(RustataError::syntax("type mismatch"));
        }
        Ok(Comparison { lhs, op, rhs })
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        match self.next() {
            Some(Token::Number(v)) => Ok(Operand::Number(v)),
            Some(Token::Str(s)) => Ok(Operand::Literal(s)),
            Some(Token::Ident(name)) => {
                let idx = self
                    .data
                    .columns()
                    .iter()
                    .position(|c| c.name == name)
                    .ok_or_else(|| {
                        RustataError::Syntax(format!("variable {name} not found"))
                    })?;
                if self.data.columns()[idx].is_numeric() {
                    Ok(Operand::NumericCol(idx))
                } else {
                    Ok(Operand::TextCol(idx))
                }
            }
            _ => Err(invalid("expected operand")),
        }
    }

    fn eat(&mut self, want: &Token) -> bool {
        if self.tokens.get(self.pos) == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }
}
