//! Annotation tokenizer
//!
//! An annotation is `rule ("|" rule)*` where `rule := name | name ":" argument`.
//! Order is preserved: it decides where `dive` splits a chain and the order in
//! which custom rules run.

use std::fmt;

pub const REQUIRED: &str = "req";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const IN: &str = "in";
pub const REGEX: &str = "regex";
pub const DIVE: &str = "dive";

/// Rule names that cannot be registered as custom rules
pub const BUILTIN: [&str; 6] = [REQUIRED, MIN, MAX, IN, REGEX, DIVE];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN.contains(&name)
}

/// One rule of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub name: &'a str,
    pub arg: Option<&'a str>,
}

impl<'a> Token<'a> {
    fn parse(raw: &'a str) -> Self {
        match raw.split_once(':') {
            Some((name, arg)) => Token { name, arg: Some(arg) },
            None => Token { name: raw, arg: None },
        }
    }

    pub fn is_dive(&self) -> bool {
        self.name == DIVE && self.arg.is_none()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg {
            Some(arg) => write!(f, "{}:{}", self.name, arg),
            None => f.write_str(self.name),
        }
    }
}

/// Split an annotation into tokens. Only the first `:` of a rule separates
/// name and argument, so `regex:^a:b$` keeps its colon.
pub fn tokenize(annotation: &str) -> Vec<Token<'_>> {
    if annotation.is_empty() {
        return Vec::new();
    }
    annotation.split('|').map(Token::parse).collect()
}

/// Split a chain at its first `dive`: the head applies to the container, the
/// tail to each element.
pub fn split_dive<'t, 'a>(tokens: &'t [Token<'a>]) -> (&'t [Token<'a>], Option<&'t [Token<'a>]>) {
    match tokens.iter().position(Token::is_dive) {
        Some(at) => (&tokens[..at], Some(&tokens[at + 1..])),
        None => (tokens, None),
    }
}
