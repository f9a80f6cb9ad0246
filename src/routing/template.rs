//! Route template parsing.
//!
//! A template is literal text interleaved with brace-delimited variables:
//!
//! ```text
//! /users/{id}            required variable
//! /posts/{page?}         optional variable
//! /bar/{foo?=23}         optional variable with a default
//! ```
//!
//! An optional variable must be the last token of its template.

use crate::routing::error::Error;

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, separators included.
    Literal(String),
    /// A `{name}`, `{name?}` or `{name?=default}` placeholder.
    Variable {
        name: String,
        optional: bool,
        default: Option<String>,
    },
}

impl Token {
    /// The variable name, if this is a variable token.
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Token::Variable { name, .. } => Some(name),
            Token::Literal(_) => None,
        }
    }
}

/// Parse a template into its token sequence.
pub fn parse(template: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => return Err(Error::malformed(template, "nested `{`")),
                        Some(c) => body.push(c),
                        None => return Err(Error::malformed(template, "unclosed `{`")),
                    }
                }
                tokens.push(parse_variable(template, &body)?);
            }
            '}' => return Err(Error::malformed(template, "unmatched `}`")),
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    check_variables(template, &tokens)?;
    Ok(tokens)
}

fn parse_variable(template: &str, body: &str) -> Result<Token, Error> {
    let (name, optional, default) = match body.split_once('?') {
        None => (body, false, None),
        Some((name, "")) => (name, true, None),
        Some((name, rest)) => match rest.strip_prefix('=') {
            Some(default) => (name, true, Some(default.to_string())),
            None => {
                return Err(Error::malformed(
                    template,
                    format!("expected `=` after `?` in `{{{body}}}`"),
                ))
            }
        },
    };

    if !is_valid_name(name) {
        return Err(Error::malformed(
            template,
            format!("invalid variable name `{name}`"),
        ));
    }

    Ok(Token::Variable {
        name: name.to_string(),
        optional,
        default,
    })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn check_variables(template: &str, tokens: &[Token]) -> Result<(), Error> {
    let mut seen: Vec<&str> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let Token::Variable { name, optional, .. } = token else {
            continue;
        };
        if seen.contains(&name.as_str()) {
            return Err(Error::malformed(
                template,
                format!("variable `{name}` declared twice"),
            ));
        }
        seen.push(name);
        if *optional && i + 1 != tokens.len() {
            return Err(Error::malformed(
                template,
                format!("optional variable `{name}` must be the last part of the template"),
            ));
        }
    }
    Ok(())
}
