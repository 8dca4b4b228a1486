// src/naming.rs
//! Display names for created objects.
//!
//! Names are guessed from the source line that performed the creation call.
//! The guess is a heuristic: it only sees `name = api.createThing(...)` on the
//! current line, so objects made inside helpers or nested expressions fall
//! back to a numbered placeholder.

use log::debug;
use regex::Regex;

/// Default pattern: an identifier assigned from a `create*` call.
pub const DEFAULT_PATTERN: &str = r"(?:^|\s)(\w+)\s*=\s*\w+\.create\w+";

/// Best-effort identifier inference from one line of source.
pub trait NameInference {
    fn infer(&self, line: &str) -> Option<String>;
}

/// [`NameInference`] driven by a regular expression whose first capture group
/// is the identifier.
#[derive(Debug, Clone)]
pub struct AssignmentPattern {
    regex: Regex,
}

impl AssignmentPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl NameInference for AssignmentPattern {
    fn infer(&self, line: &str) -> Option<String> {
        self.regex
            .captures(line.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Hands out display names, falling back to `<prefix>-<n>` when inference fails.
///
/// The counter is per generator, so each session numbers its unknowns from 1.
pub struct NameGenerator {
    inference: Box<dyn NameInference>,
    prefix: String,
    unknown: usize,
}

impl NameGenerator {
    pub fn new(inference: Box<dyn NameInference>, prefix: &str) -> Self {
        Self {
            inference,
            prefix: prefix.to_string(),
            unknown: 0,
        }
    }

    pub fn name_for(&mut self, line: &str) -> String {
        if let Some(name) = self.inference.infer(line) {
            return name;
        }
        self.unknown += 1;
        let name = format!("{}-{}", self.prefix, self.unknown);
        debug!("NameGenerator: no identifier on {:?}, using {}", line.trim(), name);
        name
    }
}
