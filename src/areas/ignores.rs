//! Ignore rules
//!
//! A minimal `.gitignore` engine: rule files are collected from the
//! repository root down to the directory being enumerated, and queried per
//! path. Supported syntax: blank lines and `#` comments, `!` negation,
//! trailing `/` for directory-only patterns, `*`/`?` globbing (where `*`
//! never crosses a `/`), and anchoring for patterns that contain a slash.
//! The last matching rule wins.

use crate::areas::wildcard_match;
use std::path::Path;

const IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Clone)]
struct IgnoreRule {
    /// Glob pattern, without negation marker or trailing slash
    pattern: String,
    /// Directory the rule file lived in, "" for the repository root
    base: String,
    /// Pattern only applies to directories
    dir_only: bool,
    /// Pattern contained a slash and matches the whole relative path
    anchored: bool,
    /// `!` rule, re-includes a previously ignored path
    negated: bool,
}

impl IgnoreRule {
    fn parse(line: &str, base: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, line) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (dir_only, line) = match line.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let line = line.strip_prefix('/').unwrap_or(line);

        Some(IgnoreRule {
            pattern: line.to_string(),
            base: base.to_string(),
            dir_only,
            anchored: line.contains('/'),
            negated,
        })
    }

    fn matches(&self, path: &str) -> bool {
        let is_dir = path.ends_with('/');
        if self.dir_only && !is_dir {
            return false;
        }

        let path = path.trim_end_matches('/');
        let Some(path) = path.strip_prefix(self.base.as_str()) else {
            return false;
        };

        if self.anchored {
            wildcard_match(self.pattern.as_bytes(), path.as_bytes())
        } else {
            // unanchored patterns match any path component
            path.split('/')
                .any(|component| wildcard_match(self.pattern.as_bytes(), component.as_bytes()))
        }
    }
}

/// Ignore rules in effect for one directory
///
/// Built by stacking the rule files on the path from the repository root to
/// the directory; rules from deeper files take precedence.
#[derive(Debug, Clone, Default)]
pub struct IgnoreContext {
    rules: Vec<IgnoreRule>,
}

impl IgnoreContext {
    /// Load the rule stack for a repository-relative directory
    pub fn load_for_path(root: &Path, dir: &str) -> anyhow::Result<Self> {
        let mut context = IgnoreContext::default();
        context.load_file(root, "")?;

        let mut base = String::new();
        for component in dir.split('/').filter(|c| !c.is_empty()) {
            base.push_str(component);
            base.push('/');
            context.load_file(root, &base)?;
        }

        Ok(context)
    }

    fn load_file(&mut self, root: &Path, base: &str) -> anyhow::Result<()> {
        let file = root.join(base).join(IGNORE_FILE);
        if !file.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&file)?;
        self.rules
            .extend(content.lines().filter_map(|line| IgnoreRule::parse(line, base)));

        Ok(())
    }

    /// Whether the given repository-relative path is ignored
    ///
    /// Directory paths carry their trailing `/`.
    pub fn is_ignored(&self, path: &str) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            if rule.matches(path) {
                ignored = !rule.negated;
            }
        }

        ignored
    }
}
