//! Evaluation of operator-typed ratio expressions such as `4/5` or `1+2+3`.
//!
//! Only numeric literals, `+ - * /`, parentheses and unary signs are accepted.
//! There are no names, calls or other operators to reach, so anything outside
//! that set is rejected at tokenization rather than failing while running.
//!
//! Grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := NUMBER | '(' expr ')' | '-' factor | '+' factor
//! ```
//!
//! # Example
//!
//! ```rust
//! use sainsburys_assistant::expression::{evaluate, Number};
//! assert_eq!(evaluate("2*(3+4)").unwrap(), Number::Int(14));
//! assert_eq!(evaluate("4/5").unwrap().as_f64(), 0.8);
//! ```

use std::fmt;

use crate::error::{AssistantError, Result};

/// Deepest nesting of parentheses and unary signs accepted.
const MAX_NESTING: usize = 100;

// ---------------------------------------------------------------------------
// Number — Folded constant
// ---------------------------------------------------------------------------

/// An integer stays an integer through `+ - *` and becomes a float through `/`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    fn is_finite(self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(x) => x.is_finite(),
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 + b as f64)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn sub(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 - b as f64)),
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }

    fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 * b as f64)),
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// `None` when dividing by zero.
    fn div(self, rhs: Number) -> Option<Number> {
        if rhs.is_zero() {
            return None;
        }
        Some(Number::Float(self.as_f64() / rhs.as_f64()))
    }

    fn neg(self) -> Number {
        match self {
            Number::Int(n) => n
                .checked_neg()
                .map(Number::Int)
                .unwrap_or(Number::Float(-(n as f64))),
            Number::Float(x) => Number::Float(-x),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

/// Fold `expression` to a single constant.
///
/// # Errors
///
/// * [`AssistantError::NotSimpleExpression`] if the text contains anything
///   other than numbers, `+ - * /`, parentheses and whitespace.
/// * [`AssistantError::MalformedExpression`] if those tokens do not form one
///   expression (empty input, unbalanced parentheses, dangling operators).
/// * [`AssistantError::NotSimpleExpression`] also if a division by zero
///   leaves the expression without a single constant value, e.g. `1/0`.
/// * [`AssistantError::ExpressionNotEvaluated`] if the value overflows to
///   infinity, e.g. `1e308*10`.
pub fn evaluate(expression: &str) -> Result<Number> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        source: expression,
    };
    match parser.parse()? {
        Some(value) if value.is_finite() => Ok(value),
        Some(_) => Err(AssistantError::ExpressionNotEvaluated(
            expression.to_string(),
        )),
        None => Err(AssistantError::NotSimpleExpression(
            expression.to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(Number),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let not_simple = || AssistantError::NotSimpleExpression(source.to_string());
    let malformed = || AssistantError::MalformedExpression(source.to_string());

    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            let (number, end) = scan_number(&chars, i).ok_or_else(malformed)?;
            // `2x`, `1.2.3`
            if chars
                .get(end)
                .is_some_and(|n| n.is_alphanumeric() || *n == '_' || *n == '.')
            {
                return Err(malformed());
            }
            tokens.push(Token::Number(number));
            i = end;
            continue;
        }
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            // `**` and `//` are operators this grammar does not have.
            '*' if chars.get(i + 1) == Some(&'*') => return Err(not_simple()),
            '/' if chars.get(i + 1) == Some(&'/') => return Err(not_simple()),
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ => return Err(not_simple()),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

/// Scan a decimal literal starting at `start`, returning it and the index
/// just past it.
fn scan_number(chars: &[char], start: usize) -> Option<(Number, usize)> {
    let mut end = start;
    let mut mantissa_digits = 0;
    let mut is_float = false;

    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < chars.len() && chars[end] == '.' {
        is_float = true;
        end += 1;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < chars.len() && (chars[end] == 'e' || chars[end] == 'E') {
        let mut exp_end = end + 1;
        if exp_end < chars.len() && (chars[exp_end] == '+' || chars[exp_end] == '-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end == digits_start {
            return None;
        }
        is_float = true;
        end = exp_end;
    }

    let text: String = chars[start..end].iter().collect();
    let number = if is_float {
        Number::Float(text.parse().ok()?)
    } else {
        match text.parse::<i64>() {
            Ok(n) => Number::Int(n),
            Err(_) => Number::Float(text.parse().ok()?),
        }
    };
    Some((number, end))
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Recursive-descent parser that folds as it goes.
///
/// Structural errors abort immediately. A value that cannot be folded is
/// carried as `None` so that a later structural error still takes precedence.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn malformed(&self) -> AssistantError {
        AssistantError::MalformedExpression(self.source.to_string())
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse(&mut self) -> Result<Option<Number>> {
        if self.tokens.is_empty() {
            return Err(self.malformed());
        }
        let value = self.expr()?;
        if self.pos != self.tokens.len() {
            return Err(self.malformed());
        }
        Ok(value)
    }

    fn expr(&mut self) -> Result<Option<Number>> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = match (value, rhs) {
                (Some(a), Some(b)) if op == Token::Plus => Some(a.add(b)),
                (Some(a), Some(b)) => Some(a.sub(b)),
                _ => None,
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Option<Number>> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = match (value, rhs) {
                (Some(a), Some(b)) if op == Token::Star => Some(a.mul(b)),
                (Some(a), Some(b)) => a.div(b),
                _ => None,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<Option<Number>> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Some(n)),
            Some(Token::Minus) => Ok(self.nested(Self::factor)?.map(Number::neg)),
            Some(Token::Plus) => self.nested(Self::factor),
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(self.malformed()),
                }
            }
            _ => Err(self.malformed()),
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<Option<Number>>
    where
        F: FnOnce(&mut Self) -> Result<Option<Number>>,
    {
        if self.depth >= MAX_NESTING {
            return Err(self.malformed());
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }
}
