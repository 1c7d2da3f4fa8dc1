//! Attribute rules
//!
//! A minimal `.gitattributes` engine, read from the repository root. Each
//! line pairs a pattern with attribute states: `pattern attr` sets,
//! `pattern -attr` unsets, `pattern attr=value` assigns a string value.
//! Lookup returns the state of the last matching rule, or Unspecified when
//! nothing matched. The diff core only ever asks about the `diff` attribute.

use crate::areas::wildcard_match;
use std::path::Path;

const ATTRIBUTES_FILE: &str = ".gitattributes";

/// Resolved state of an attribute on a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrState {
    Set,
    Unset,
    Value(String),
    Unspecified,
}

#[derive(Debug, Clone)]
struct AttrRule {
    pattern: String,
    attribute: String,
    state: AttrState,
}

impl AttrRule {
    fn parse(line: &str) -> Vec<AttrRule> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Vec::new();
        }

        let mut parts = line.split_whitespace();
        let Some(pattern) = parts.next() else {
            return Vec::new();
        };

        parts
            .map(|spec| {
                let (attribute, state) = if let Some(name) = spec.strip_prefix('-') {
                    (name, AttrState::Unset)
                } else if let Some((name, value)) = spec.split_once('=') {
                    (name, AttrState::Value(value.to_string()))
                } else {
                    (spec, AttrState::Set)
                };

                AttrRule {
                    pattern: pattern.to_string(),
                    attribute: attribute.to_string(),
                    state,
                }
            })
            .collect()
    }

    fn matches(&self, path: &str) -> bool {
        let candidate = if self.pattern.contains('/') {
            path
        } else {
            path.rsplit('/').next().unwrap_or(path)
        };

        wildcard_match(self.pattern.trim_start_matches('/').as_bytes(), candidate.as_bytes())
    }
}

/// Attribute rules for the repository
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    rules: Vec<AttrRule>,
}

impl Attributes {
    /// Load rules from the repository root, empty when no rule file exists
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let file = root.join(ATTRIBUTES_FILE);
        if !file.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&file)?;
        let rules = content.lines().flat_map(AttrRule::parse).collect();

        Ok(Attributes { rules })
    }

    /// Resolve an attribute on a repository-relative path
    pub fn get(&self, path: &str, attribute: &str) -> AttrState {
        let mut state = AttrState::Unspecified;
        for rule in &self.rules {
            if rule.attribute == attribute && rule.matches(path) {
                state = rule.state.clone();
            }
        }

        state
    }
}
