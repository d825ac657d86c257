//! Compiled `${name}` path templates.
//!
//! A template such as `/users/${id}/posts/${postId}` compiles into an anchored regular
//! expression where every placeholder captures one or more characters other than `/`
//! and every literal segment matches verbatim.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

const PLACEHOLDER_START: &str = "${";
const PLACEHOLDER_END: char = '}';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid path pattern '{template}': {reason}")]
    InvalidPattern { template: String, reason: String },
}

impl PatternError {
    fn invalid_pattern<S: ToString>(template: &str, reason: S) -> Self {
        Self::InvalidPattern { template: template.to_owned(), reason: reason.to_string() }
    }
}

/// A compiled path template.
///
/// The default value has no template: it never matches and extracts nothing.
#[derive(Debug, Clone, Default)]
pub struct PathPattern {
    compiled: Option<Compiled>,
}

#[derive(Debug, Clone)]
struct Compiled {
    template: String,
    regex: Regex,
    names: Vec<String>,
}

impl PathPattern {
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let mut expression = String::with_capacity(template.len() + 16);
        let mut names = Vec::new();
        let mut rest = template;

        expression.push('^');
        while let Some(start) = rest.find(PLACEHOLDER_START) {
            expression.push_str(&regex::escape(&rest[..start]));

            let after_start = &rest[start + PLACEHOLDER_START.len()..];
            let Some(end) = after_start.find(PLACEHOLDER_END) else {
                return Err(PatternError::invalid_pattern(template, "unterminated placeholder"));
            };

            let name = &after_start[..end];
            if name.is_empty() {
                return Err(PatternError::invalid_pattern(template, "empty placeholder name"));
            }

            expression.push_str("([^/]+)");
            names.push(name.to_owned());
            rest = &after_start[end + 1..];
        }
        expression.push_str(&regex::escape(rest));
        expression.push('$');

        let regex = Regex::new(&expression).map_err(|e| PatternError::invalid_pattern(template, e))?;
        Ok(Self { compiled: Some(Compiled { template: template.to_owned(), regex, names }) })
    }

    /// The source template, `None` for the absent pattern
    pub fn template(&self) -> Option<&str> {
        self.compiled.as_ref().map(|compiled| compiled.template.as_str())
    }

    /// Placeholder names in declaration order
    pub fn names(&self) -> &[String] {
        self.compiled.as_ref().map(|compiled| compiled.names.as_slice()).unwrap_or_default()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.compiled.as_ref().is_some_and(|compiled| compiled.regex.is_match(path))
    }

    /// Binds every placeholder to the text it captured; empty when `path` does not match.
    pub fn extract(&self, path: &str) -> HashMap<String, String> {
        let Some(compiled) = &self.compiled else {
            return HashMap::new();
        };
        let Some(captures) = compiled.regex.captures(path) else {
            return HashMap::new();
        };

        compiled
            .names
            .iter()
            .zip(captures.iter().skip(1))
            .filter_map(|(name, capture)| capture.map(|m| (name.clone(), m.as_str().to_owned())))
            .collect()
    }
}
