// src/script.rs
//! Teaching-script evaluator.
//!
//! Lessons are written as JavaScript-flavoured WebGL calls. This module
//! understands the small subset they use:
//!
//! - `const|let|var name = expr` and plain `name = expr`
//! - calls on the API receiver, `gl.bindTexture(gl.TEXTURE_2D, tex)`
//! - constants `gl.NAME`, with `+ - * /` arithmetic (`gl.TEXTURE0 + 3`)
//! - numbers, strings, template literals, `true/false/null/undefined`
//! - array literals and typed-array constructors (`new Float32Array([..])`)
//!
//! Everything else is a [`ScriptError::Syntax`]. Calls go through a
//! [`ScriptHost`], so a session sees exactly what the lesson invokes.

mod lexer;

use std::collections::HashMap;

use log::{debug, trace};

use self::lexer::{syntax, tokenize, Token};
use crate::api::Value;
use crate::error::{ScriptError, SessionError};
use crate::gl::constants;
use crate::stepper::StatementExecutor;

/// Receiver name used by lessons.
pub const DEFAULT_RECEIVER: &str = "gl";

/// Largest length accepted by `new Float32Array(n)` and friends.
pub const MAX_TYPED_ARRAY_LEN: usize = 1 << 16;

/// Whatever executes API calls on behalf of a script.
pub trait ScriptHost {
    fn call(&mut self, operation: &str, args: &[Value]) -> Result<Value, SessionError>;
}

// --- Syntax tree ---

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Variable(String),
    Constant(String),
    Call { operation: String, args: Vec<Expr> },
    Array(Vec<Expr>),
    TypedArray { kind: String, arg: Option<Box<Expr>> },
    Negate(Box<Expr>),
    Binary { op: char, lhs: Box<Expr>, rhs: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
enum Stmt {
    Assign { name: String, value: Expr },
    Expr(Expr),
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    text: &'a str,
    receiver: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek() == Some(&Token::Punct(c))
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.at_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ScriptError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ScriptError> {
        match self.bump() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.error("expected an identifier")),
        }
    }

    fn error(&self, reason: &str) -> ScriptError {
        syntax(self.text, reason)
    }

    fn program(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            if self.eat_punct(';') {
                continue;
            }
            statements.push(self.statement()?);
            if self.peek().is_some() {
                self.expect_punct(';')?;
            }
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        if let Some(Token::Ident(word)) = self.peek() {
            if matches!(word.as_str(), "const" | "let" | "var") {
                self.pos += 1;
                let name = self.expect_ident()?;
                self.expect_punct('=')?;
                let value = self.expression()?;
                return Ok(Stmt::Assign { name, value });
            }
            if self.peek_at(1) == Some(&Token::Punct('=')) {
                let name = self.expect_ident()?;
                self.pos += 1;
                let value = self.expression()?;
                return Ok(Stmt::Assign { name, value });
            }
        }
        Ok(Stmt::Expr(self.expression()?))
    }

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        let mut lhs = self.product()?;
        while let Some(op) = ['+', '-'].into_iter().find(|&c| self.at_punct(c)) {
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn product(&mut self) -> Result<Expr, ScriptError> {
        let mut lhs = self.unary()?;
        while let Some(op) = ['*', '/'].into_iter().find(|&c| self.at_punct(c)) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        if self.eat_punct('-') {
            return Ok(Expr::Negate(Box::new(self.unary()?)));
        }
        if self.eat_punct('+') {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        match self.bump() {
            Some(Token::Integer(v)) => Ok(Expr::Literal(Value::Int(v))),
            Some(Token::Number(v)) => Ok(Expr::Literal(Value::Float(v))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::Punct('(')) => {
                let inner = self.expression()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            Some(Token::Punct('[')) => Ok(Expr::Array(self.list(']')?)),
            Some(Token::Ident(word)) => self.word(word),
            _ => Err(self.error("expected an expression")),
        }
    }

    fn word(&mut self, word: String) -> Result<Expr, ScriptError> {
        match word.as_str() {
            "true" => return Ok(Expr::Literal(Value::Bool(true))),
            "false" => return Ok(Expr::Literal(Value::Bool(false))),
            "null" | "undefined" => return Ok(Expr::Literal(Value::Null)),
            "new" => {
                let kind = self.expect_ident()?;
                self.expect_punct('(')?;
                let mut args = self.list(')')?;
                if args.len() > 1 {
                    return Err(self.error("typed arrays take at most one argument"));
                }
                let arg = args.pop().map(Box::new);
                return Ok(Expr::TypedArray { kind, arg });
            }
            _ => {}
        }

        if !self.eat_punct('.') {
            return Ok(Expr::Variable(word));
        }
        if word != self.receiver {
            return Err(self.error(&format!("unsupported member access on '{}'", word)));
        }
        let member = self.expect_ident()?;
        if self.eat_punct('(') {
            let args = self.list(')')?;
            Ok(Expr::Call {
                operation: member,
                args,
            })
        } else {
            Ok(Expr::Constant(member))
        }
    }

    /// Comma-separated expressions up to `close`. A trailing comma is allowed.
    fn list(&mut self, close: char) -> Result<Vec<Expr>, ScriptError> {
        let mut items = Vec::new();
        loop {
            if self.eat_punct(close) {
                return Ok(items);
            }
            items.push(self.expression()?);
            if !self.eat_punct(',') {
                self.expect_punct(close)?;
                return Ok(items);
            }
        }
    }
}

// --- Evaluation ---

/// Evaluates statements against a [`ScriptHost`], keeping variables between
/// statements.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    receiver: String,
    variables: HashMap<String, Value>,
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptExecutor {
    pub fn new() -> Self {
        Self::with_receiver(DEFAULT_RECEIVER)
    }

    pub fn with_receiver(receiver: &str) -> Self {
        Self {
            receiver: receiver.to_string(),
            variables: HashMap::new(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Runs every statement in `text`. Returns the value of the last
    /// expression, or `None` for blank and comment-only text.
    pub fn evaluate<H: ScriptHost>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<Option<Value>, SessionError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            text,
            receiver: &self.receiver,
        };
        let program = parser.program()?;

        let mut last = None;
        for statement in program {
            match statement {
                Stmt::Assign { name, value } => {
                    let value = self.eval(host, &value, text)?;
                    trace!("script: {} = {:?}", name, value);
                    self.variables.insert(name, value);
                    last = None;
                }
                Stmt::Expr(expr) => last = Some(self.eval(host, &expr, text)?),
            }
        }
        Ok(last)
    }

    fn eval<H: ScriptHost>(
        &self,
        host: &mut H,
        expr: &Expr,
        text: &str,
    ) -> Result<Value, SessionError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| ScriptError::UnknownIdentifier(name.clone()).into()),
            Expr::Constant(name) => constants::lookup(name)
                .map(Value::from)
                .ok_or_else(|| ScriptError::UnknownConstant(name.clone()).into()),
            Expr::Call { operation, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(host, arg, text))
                    .collect::<Result<Vec<_>, _>>()?;
                debug!("script: {}.{}({} args)", self.receiver, operation, args.len());
                host.call(operation, &args)
            }
            Expr::Array(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.eval(host, item, text))
                    .collect::<Result<_, _>>()?,
            )),
            Expr::TypedArray { kind, arg } => {
                let arg = match arg {
                    Some(arg) => Some(self.eval(host, arg, text)?),
                    None => None,
                };
                Ok(typed_array(kind, arg, text)?)
            }
            Expr::Negate(inner) => match self.eval(host, inner, text)? {
                Value::Int(v) => Ok(v
                    .checked_neg()
                    .map_or(Value::Float(-(v as f64)), Value::Int)),
                other => other
                    .as_f64()
                    .map(|v| Value::Float(-v))
                    .ok_or_else(|| syntax(text, "cannot negate a non-number").into()),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(host, lhs, text)?;
                let rhs = self.eval(host, rhs, text)?;
                Ok(arithmetic(*op, &lhs, &rhs, text)?)
            }
        }
    }
}

impl<H: ScriptHost> StatementExecutor<H> for ScriptExecutor {
    fn execute(&mut self, host: &mut H, statement: &str) -> Result<(), SessionError> {
        self.evaluate(host, statement).map(|_| ())
    }
}

fn arithmetic(op: char, lhs: &Value, rhs: &Value, text: &str) -> Result<Value, ScriptError> {
    if op == '+' {
        if let (Some(a), Some(b)) = (lhs.as_str(), rhs.as_str()) {
            return Ok(Value::Str(format!("{}{}", a, b)));
        }
    }
    // Integers stay exact until they overflow, then continue as floats.
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let exact = match op {
            '+' => a.checked_add(*b),
            '-' => a.checked_sub(*b),
            '*' => a.checked_mul(*b),
            _ => None,
        };
        if let Some(v) = exact {
            return Ok(Value::Int(v));
        }
    }
    let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(syntax(text, &format!("'{}' needs numbers", op)));
    };
    let result = match op {
        '+' => a + b,
        '-' => a - b,
        '*' => a * b,
        _ => a / b,
    };
    Ok(Value::Float(result))
}

fn typed_array(kind: &str, arg: Option<Value>, text: &str) -> Result<Value, ScriptError> {
    let float = match kind {
        "Float32Array" | "Float64Array" => true,
        "Int8Array" | "Uint8Array" | "Uint8ClampedArray" | "Int16Array" | "Uint16Array"
        | "Int32Array" | "Uint32Array" => false,
        other => return Err(syntax(text, &format!("unknown constructor '{}'", other))),
    };
    let convert = |value: &Value| -> Result<Value, ScriptError> {
        let v = value
            .as_f64()
            .ok_or_else(|| syntax(text, "typed arrays hold numbers"))?;
        Ok(if float {
            Value::Float(v)
        } else {
            Value::Int(v as i64)
        })
    };
    let zero = if float { Value::Float(0.0) } else { Value::Int(0) };

    match arg {
        None => Ok(Value::List(Vec::new())),
        Some(Value::List(items)) => Ok(Value::List(
            items.iter().map(convert).collect::<Result<_, _>>()?,
        )),
        Some(Value::Int(len)) if len >= 0 => match usize::try_from(len) {
            Ok(len) if len <= MAX_TYPED_ARRAY_LEN => Ok(Value::List(vec![zero; len])),
            _ => Err(syntax(
                text,
                &format!("typed array length {} exceeds {}", len, MAX_TYPED_ARRAY_LEN),
            )),
        },
        Some(_) => Err(syntax(text, "typed arrays take a length or a list")),
    }
}
