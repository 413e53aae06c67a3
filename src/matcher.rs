//! Path pattern compilation and parameter extraction
//!
//! A pattern is literal text with two kinds of tokens:
//!
//! - `:name` - matches one or more characters other than `/` and captures them
//!   under `name`
//! - `*` - matches any remainder, separators included, without capturing
//!
//! Everything else must match verbatim, and a pattern always matches the whole
//! path, never a prefix.
//!
//! Placeholder names are recorded in the same left-to-right scan that builds
//! the matcher, so capture groups and names cannot drift apart. When a name is
//! used twice the later capture wins.

use crate::error::RouterError;
use crate::params::{decode_component, RouteParams};
use once_cell::sync::Lazy;
use regex::Regex;

/// Finds `:name` placeholders and `*` wildcards in a pattern
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_]+)|\*").expect("token expression is valid"));

/// A compiled path pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compile a pattern such as `/products/:id` or `/files/*`
    ///
    /// # Example
    ///
    /// ```
    /// use spa_navigator::PathPattern;
    ///
    /// let pattern = PathPattern::compile("/products/:id").unwrap();
    /// assert!(pattern.is_match("/products/42"));
    /// assert!(!pattern.is_match("/products/42/reviews"));
    ///
    /// let params = pattern.extract_params("/products/42").unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let mut expr = String::with_capacity(pattern.len() + 16);
        let mut param_names = Vec::new();
        let mut last = 0;

        expr.push('^');
        for caps in TOKEN.captures_iter(pattern) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            expr.push_str(&regex::escape(&pattern[last..token.start()]));
            match caps.get(1) {
                Some(name) => {
                    param_names.push(name.as_str().to_string());
                    expr.push_str("([^/]+)");
                }
                None => expr.push_str(".*"),
            }
            last = token.end();
        }
        expr.push_str(&regex::escape(&pattern[last..]));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// The pattern text as registered
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in declaration order (duplicates kept)
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Check whether the whole path conforms to this pattern
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extract parameters from a path
    ///
    /// Returns `None` when the path does not match. Captured values are
    /// percent-decoded after matching, so an encoded `/` never shifts segment
    /// boundaries.
    pub fn extract_params(&self, path: &str) -> Option<RouteParams> {
        let caps = self.regex.captures(path)?;
        let mut params = RouteParams::new();

        for (index, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(index + 1) {
                params.insert(name.clone(), decode_component(value.as_str()));
            }
        }

        Some(params)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
