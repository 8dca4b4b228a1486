// src/stepper/parse.rs
//! Splits teaching-script source into statements.
//!
//! A statement ends at a `;` (or `;;`) that sits outside a backtick span and
//! is followed by a line break (`\n` or `\r\n`) or the end of the input. The
//! terminating line break stays part of the statement. Blank lines before a
//! statement are stripped and counted as spacers so the code view can keep the
//! source's layout.
//!
//! An unterminated backtick span does not discard the statements before it:
//! everything from the start of the broken statement to the end of the input
//! becomes one final statement that carries the [`ParseBoundaryError`].

use crate::error::ParseBoundaryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Exact source text, including the trailing line break when present.
    pub text: String,
    /// Blank lines that preceded the statement.
    pub spacers: usize,
    /// 1-based source line the statement starts on.
    pub line: usize,
    /// Set on the last statement when a template literal never closes.
    pub unterminated: Option<ParseBoundaryError>,
}

impl Statement {
    pub fn is_poisoned(&self) -> bool {
        self.unterminated.is_some()
    }
}

pub fn split_statements(source: &str) -> Vec<Statement> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut start_line = 1;
    let mut line = 1;
    let mut column = 1;
    // Position of the opening backtick of the span we are inside, if any.
    let mut backtick: Option<(usize, usize)> = None;

    let mut i = 0;
    while i < chars.len() {
        let (_, c) = chars[i];
        let mut end = None;
        match c {
            '`' => {
                backtick = match backtick {
                    Some(_) => None,
                    None => Some((line, column)),
                };
            }
            ';' if backtick.is_none() => {
                let rest = chars.get(i + 1..).unwrap_or(&[]);
                let semis = if matches!(rest.first(), Some(&(_, ';'))) { 1 } else { 0 };
                let tail = &rest[semis..];
                let next: Vec<char> = tail.iter().take(2).map(|&(_, c)| c).collect();
                end = match next.as_slice() {
                    [] => Some(i + 1 + semis),
                    ['\n', ..] => Some(i + 2 + semis),
                    ['\r', '\n'] => Some(i + 3 + semis),
                    _ => None,
                };
            }
            _ => {}
        }

        match end {
            Some(end) => {
                for &(_, c) in &chars[i..end] {
                    advance(c, &mut line, &mut column);
                }
                let byte_start = chars[start].0;
                let byte_end = chars.get(end).map_or(source.len(), |&(b, _)| b);
                statements.push(statement(&source[byte_start..byte_end], start_line));
                start = end;
                start_line = line;
                i = end;
            }
            None => {
                advance(c, &mut line, &mut column);
                i += 1;
            }
        }
    }

    if start < chars.len() {
        let rest = &source[chars[start].0..];
        if let Some((line, column)) = backtick {
            let mut broken = statement(rest, start_line);
            broken.unterminated = Some(ParseBoundaryError { line, column });
            statements.push(broken);
        } else if !rest.trim().is_empty() {
            statements.push(statement(rest, start_line));
        }
    }
    statements
}

fn advance(c: char, line: &mut usize, column: &mut usize) {
    if c == '\n' {
        *line += 1;
        *column = 1;
    } else {
        *column += 1;
    }
}

fn statement(raw: &str, line: usize) -> Statement {
    let text = raw.trim_start_matches(['\r', '\n']);
    let spacers = raw[..raw.len() - text.len()]
        .chars()
        .filter(|&c| c == '\n')
        .count();
    Statement {
        text: text.to_string(),
        spacers,
        line: line + spacers,
        unterminated: None,
    }
}
