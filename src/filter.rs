//! Attribute filter expressions.
//!
//! Each category in the configuration may carry a `where` string that
//! selects records from its data source, e.g. `ADMIN == "Japan"` or
//! `SCALERANK <= 3 and CONTINENT == "Europe"`. The grammar is a fixed set
//! of comparison clauses folded left-to-right with `and` / `or`, evaluated
//! directly rather than through a general expression engine.
//!
//! Clause semantics: a missing attribute makes the clause false; equality
//! on mismatched types is false (so `!=` on mismatched types is true);
//! ordering comparisons require both sides numeric, otherwise the clause
//! is false.

use crate::error::{Result, WorkbenchError};
use crate::geo::model::{AttributeValue, Attributes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Text(String),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    field: String,
    op: CmpOp,
    literal: Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

/// A compiled `where` expression: a predicate over a feature's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    first: Clause,
    rest: Vec<(Connective, Clause)>,
}

impl Filter {
    /// Compiles an expression string. Fails at configuration-load time so
    /// malformed filters never reach query time.
    pub fn parse(expression: &str) -> Result<Self> {
        Parser::new(expression).parse()
    }

    /// Evaluates the predicate against an attribute mapping, folding
    /// clauses left-to-right.
    pub fn matches(&self, attributes: &Attributes) -> bool {
        let mut result = eval_clause(&self.first, attributes);
        for (connective, clause) in &self.rest {
            let value = eval_clause(clause, attributes);
            result = match connective {
                Connective::And => result && value,
                Connective::Or => result || value,
            };
        }
        result
    }
}

fn eval_clause(clause: &Clause, attributes: &Attributes) -> bool {
    let Some(value) = attributes.get(&clause.field) else {
        return false;
    };

    match clause.op {
        CmpOp::Eq => values_equal(value, &clause.literal),
        CmpOp::Ne => !values_equal(value, &clause.literal),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            let (AttributeValue::Number(a), Literal::Number(b)) = (value, &clause.literal)
            else {
                return false;
            };
            match clause.op {
                CmpOp::Lt => a < b,
                CmpOp::Le => a <= b,
                CmpOp::Gt => a > b,
                CmpOp::Ge => a >= b,
                _ => unreachable!(),
            }
        }
    }
}

fn values_equal(value: &AttributeValue, literal: &Literal) -> bool {
    match (value, literal) {
        (AttributeValue::Text(a), Literal::Text(b)) => a == b,
        (AttributeValue::Number(a), Literal::Number(b)) => a == b,
        (AttributeValue::Boolean(a), Literal::Boolean(b)) => a == b,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Op(CmpOp),
    Literal(Literal),
    And,
    Or,
}

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            tokens: Vec::new(),
            position: 0,
        }
    }

    fn error(&self, reason: &str) -> WorkbenchError {
        WorkbenchError::FilterParse {
            expression: self.expression.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse(mut self) -> Result<Filter> {
        self.tokenize()?;

        let first = self.parse_clause()?;
        let mut rest = Vec::new();
        while self.position < self.tokens.len() {
            let connective = match self.next()? {
                Token::And => Connective::And,
                Token::Or => Connective::Or,
                other => {
                    return Err(self.error(&format!("expected 'and' or 'or', found {other:?}")))
                }
            };
            rest.push((connective, self.parse_clause()?));
        }

        Ok(Filter { first, rest })
    }

    fn parse_clause(&mut self) -> Result<Clause> {
        let field = match self.next()? {
            Token::Ident(name) => name,
            other => return Err(self.error(&format!("expected field name, found {other:?}"))),
        };
        let op = match self.next()? {
            Token::Op(op) => op,
            other => return Err(self.error(&format!("expected comparison, found {other:?}"))),
        };
        let literal = match self.next()? {
            Token::Literal(literal) => literal,
            other => return Err(self.error(&format!("expected literal, found {other:?}"))),
        };
        Ok(Clause { field, op, literal })
    }

    fn next(&mut self) -> Result<Token> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of expression"))?;
        self.position += 1;
        Ok(token)
    }

    fn tokenize(&mut self) -> Result<()> {
        let chars: Vec<char> = self.expression.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
            } else if c == '"' || c == '\'' {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end == chars.len() {
                    return Err(self.error("unterminated string literal"));
                }
                let text: String = chars[start..end].iter().collect();
                self.tokens.push(Token::Literal(Literal::Text(text)));
                i = end + 1;
            } else if c.is_ascii_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.to_ascii_lowercase().as_str() {
                    "and" => self.tokens.push(Token::And),
                    "or" => self.tokens.push(Token::Or),
                    "true" => self.tokens.push(Token::Literal(Literal::Boolean(true))),
                    "false" => self.tokens.push(Token::Literal(Literal::Boolean(false))),
                    _ => self.tokens.push(Token::Ident(word)),
                }
            } else if c.is_ascii_digit() || c == '-' || c == '.' {
                let start = i;
                if c == '-' {
                    i += 1;
                }
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number: f64 = text
                    .parse()
                    .map_err(|_| self.error(&format!("invalid number '{text}'")))?;
                self.tokens.push(Token::Literal(Literal::Number(number)));
            } else {
                let two: String = chars[i..chars.len().min(i + 2)].iter().collect();
                let (op, len) = match two.as_str() {
                    "==" => (CmpOp::Eq, 2),
                    "!=" => (CmpOp::Ne, 2),
                    "<=" => (CmpOp::Le, 2),
                    ">=" => (CmpOp::Ge, 2),
                    _ if c == '<' => (CmpOp::Lt, 1),
                    _ if c == '>' => (CmpOp::Gt, 1),
                    _ => return Err(self.error(&format!("unexpected character '{c}'"))),
                };
                self.tokens.push(Token::Op(op));
                i += len;
            }
        }

        if self.tokens.is_empty() {
            return Err(self.error("empty expression"));
        }
        Ok(())
    }
}
