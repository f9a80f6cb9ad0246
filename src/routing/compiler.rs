//! Route compilation.
//!
//! Turns a route's path, host and scheme templates into anchored regular
//! expressions plus the ordered names of the variables they capture.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::http::HttpRequest;
use crate::routing::error::Error;
use crate::routing::matcher::{HostMatcher, Matcher, PathMatcher, SchemeMatcher};
use crate::routing::route::Route;
use crate::routing::template::{self, Token};

/// Variable bindings extracted from a request, keyed by variable name.
pub type Bindings = HashMap<String, String>;

/// Which request attribute a template constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Path,
    Host,
    Scheme,
}

impl Segment {
    /// The character a variable never spans.
    fn separator(self) -> char {
        match self {
            Segment::Path => '/',
            Segment::Host => '.',
            Segment::Scheme => ':',
        }
    }

    fn case_insensitive(self) -> bool {
        !matches!(self, Segment::Path)
    }
}

/// A template compiled to an anchored matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PatternSource", into = "PatternSource")]
pub struct CompiledPattern {
    regex: Regex,
    variables: Vec<String>,
    optional: Vec<String>,
}

/// Serialized form of a [`CompiledPattern`]; the regex is rebuilt from its source on load.
#[derive(Serialize, Deserialize)]
struct PatternSource {
    pattern: String,
    variables: Vec<String>,
    optional: Vec<String>,
}

impl TryFrom<PatternSource> for CompiledPattern {
    type Error = regex::Error;

    fn try_from(source: PatternSource) -> Result<Self, Self::Error> {
        Ok(Self {
            regex: Regex::new(&source.pattern)?,
            variables: source.variables,
            optional: source.optional,
        })
    }
}

impl From<CompiledPattern> for PatternSource {
    fn from(pattern: CompiledPattern) -> Self {
        Self {
            pattern: pattern.regex.as_str().to_string(),
            variables: pattern.variables,
            optional: pattern.optional,
        }
    }
}

impl CompiledPattern {
    /// Compile one template for the given request attribute.
    pub fn compile(template: &str, segment: Segment) -> Result<Self, Error> {
        let tokens = template::parse(template)?;
        Self::from_tokens(&tokens, segment)
    }

    fn from_tokens(tokens: &[Token], segment: Segment) -> Result<Self, Error> {
        let separator = segment.separator();
        let escaped_separator = regex::escape(&separator.to_string());
        let fragment = format!("[^{escaped_separator}]+");

        // Flags live in the pattern source so they survive the cache
        let mut pattern = String::from(if segment.case_insensitive() { "(?i)^" } else { "^" });
        let mut variables = Vec::new();
        let mut optional = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Literal(text) => {
                    let next_is_optional = matches!(
                        tokens.get(i + 1),
                        Some(Token::Variable { optional: true, .. })
                    );
                    // The separator before a trailing optional moves inside its group
                    let text = match text.strip_suffix(separator) {
                        Some(stripped) if next_is_optional => stripped,
                        _ => text.as_str(),
                    };
                    pattern.push_str(&regex::escape(text));
                }
                Token::Variable { name, optional: false, .. } => {
                    pattern.push_str(&format!("(?P<{name}>{fragment})"));
                    variables.push(name.clone());
                }
                Token::Variable { name, optional: true, .. } => {
                    let follows_separator = match i.checked_sub(1).map(|prev| &tokens[prev]) {
                        Some(Token::Literal(text)) => text.ends_with(separator),
                        _ => false,
                    };
                    if follows_separator {
                        pattern.push_str(&format!(
                            "(?:{escaped_separator}(?P<{name}>{fragment})?)?"
                        ));
                    } else {
                        pattern.push_str(&format!("(?P<{name}>{fragment})?"));
                    }
                    variables.push(name.clone());
                    optional.push(name.clone());
                }
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern)?;

        Ok(Self {
            regex,
            variables,
            optional,
        })
    }

    /// Match `input` in full and return the captured variables.
    ///
    /// Optional variables that did not participate in the match are absent.
    pub fn capture(&self, input: &str) -> Option<Bindings> {
        let captures = self.regex.captures(input)?;
        Some(
            self.variables
                .iter()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Captured variable names, left to right.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Names of the optional variables.
    pub fn optional(&self) -> &[String] {
        &self.optional
    }

    /// The regular expression source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// The matchable form of one [`Route`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledRoute {
    pub path: PathMatcher,
    pub host: Option<HostMatcher>,
    pub scheme: Option<SchemeMatcher>,
}

impl CompiledRoute {
    /// The active matchers. Path comes last so its bindings win on a name collision.
    pub fn matchers(&self) -> Vec<&dyn Matcher> {
        let mut matchers: Vec<&dyn Matcher> = Vec::with_capacity(3);
        if let Some(scheme) = &self.scheme {
            matchers.push(scheme);
        }
        if let Some(host) = &self.host {
            matchers.push(host);
        }
        matchers.push(&self.path);
        matchers
    }

    /// Run every active matcher; `None` unless all of them accept.
    pub fn matches(&self, request: &HttpRequest) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        for matcher in self.matchers() {
            bindings.extend(matcher.matches(request)?);
        }
        Some(bindings)
    }
}

/// Compile a route. The handler target is not inspected.
pub fn compile(route: &Route) -> Result<CompiledRoute, Error> {
    Ok(CompiledRoute {
        path: PathMatcher::new(CompiledPattern::compile(route.path(), Segment::Path)?),
        host: route
            .host()
            .map(|host| CompiledPattern::compile(host, Segment::Host).map(HostMatcher::new))
            .transpose()?,
        scheme: route
            .scheme()
            .map(|scheme| CompiledPattern::compile(scheme, Segment::Scheme).map(SchemeMatcher::new))
            .transpose()?,
    })
}
