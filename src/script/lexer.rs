// src/script/lexer.rs

//! Statement lexer.
//! Converts one statement's text into `Token`s, skipping whitespace and
//! comments.

use log::trace;

use crate::error::ScriptError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Ident(String),
    Number(f64),
    /// Integer literal, kept apart from `Number` so enums stay integral.
    Integer(i64),
    /// Quoted or template string, quotes removed.
    Str(String),
    Punct(char),
}

const PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', '.', '=', '+', '-', ';', '*', '/'];

pub(super) fn tokenize(text: &str) -> Result<Vec<Token>, ScriptError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(syntax(text, "unterminated comment"));
                }
                i += 2;
            }
            '\'' | '"' | '`' => {
                let quote = c;
                let start = i + 1;
                i = start;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(syntax(text, "unterminated string"));
                }
                tokens.push(Token::Str(chars[start..i].iter().collect()));
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                if c == '0' && matches!(chars.get(i + 1), Some('x' | 'X')) {
                    i += 2;
                    while i < chars.len() && chars[i].is_ascii_hexdigit() {
                        i += 1;
                    }
                    let digits: String = chars[start + 2..i].iter().collect();
                    let value = i64::from_str_radix(&digits, 16)
                        .map_err(|_| syntax(text, "bad hex literal"))?;
                    tokens.push(Token::Integer(value));
                    continue;
                }
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    i += 1;
                    if i < chars.len() && matches!(chars[i], '+' | '-') {
                        i += 1;
                    }
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(number(&literal).ok_or_else(|| syntax(text, "bad number"))?);
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            c if PUNCTUATION.contains(&c) => {
                tokens.push(Token::Punct(c));
                i += 1;
            }
            other => {
                return Err(syntax(text, &format!("unexpected character '{}'", other)));
            }
        }
    }
    trace!("tokenize: {} tokens", tokens.len());
    Ok(tokens)
}

fn number(literal: &str) -> Option<Token> {
    if literal.contains(['.', 'e', 'E']) {
        literal.parse().ok().map(Token::Number)
    } else {
        literal.parse().ok().map(Token::Integer)
    }
}

pub(super) fn syntax(text: &str, reason: &str) -> ScriptError {
    ScriptError::Syntax {
        text: text.trim().to_string(),
        reason: reason.to_string(),
    }
}
