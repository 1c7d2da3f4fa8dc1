//! Diff parameters
//!
//! Options are normalized exactly once, when a delta list or blob diff is
//! constructed: prefixes gain their trailing `/` if the caller omitted it,
//! and the `REVERSE` flag swaps the two prefixes at that point so nothing
//! downstream has to think about direction again.

use bitflags::bitflags;

/// Default number of context lines around a hunk
pub const DEFAULT_CONTEXT_LINES: u32 = 3;

/// Default number of unchanged lines tolerated between merged hunks
pub const DEFAULT_INTERHUNK_LINES: u32 = 3;

const DEFAULT_SRC_PREFIX: &str = "a/";
const DEFAULT_DST_PREFIX: &str = "b/";

bitflags! {
    /// Behavior flags for diff synthesis and patch generation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DiffFlags: u32 {
        /// Swap the two sides of the comparison
        const REVERSE = 0b00001;
        /// Never mark a delta binary
        const FORCE_TEXT = 0b00010;
        /// Ignore all whitespace when comparing lines
        const IGNORE_WHITESPACE = 0b00100;
        /// Ignore changes in amount of whitespace
        const IGNORE_WHITESPACE_CHANGE = 0b01000;
        /// Ignore whitespace at end of line
        const IGNORE_WHITESPACE_EOL = 0b10000;
    }
}

/// A diff prefix, either the shared default or caller-owned
///
/// The variant answers the "is this ours?" question the original answered
/// with pointer identity against process-wide default strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    Borrowed(&'static str),
    Owned(String),
}

impl Prefix {
    pub fn as_str(&self) -> &str {
        match self {
            Prefix::Borrowed(s) => s,
            Prefix::Owned(s) => s,
        }
    }

    /// Ensure the prefix ends in `/`, appending one if the caller omitted it
    fn normalized(self) -> Prefix {
        if self.as_str().ends_with('/') {
            self
        } else {
            Prefix::Owned(format!("{}/", self.as_str()))
        }
    }
}

impl From<&str> for Prefix {
    fn from(value: &str) -> Self {
        Prefix::Owned(value.to_string())
    }
}

/// Normalized diff parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    pub flags: DiffFlags,
    /// Context lines around each hunk, 0 meaning the default of 3
    pub context_lines: u32,
    /// Unchanged lines tolerated between merged hunks, 0 meaning the default
    pub interhunk_lines: u32,
    pub src_prefix: Prefix,
    pub dst_prefix: Prefix,
    /// Path filters restricting the diff (reserved)
    pub pathspec: Vec<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            flags: DiffFlags::empty(),
            context_lines: DEFAULT_CONTEXT_LINES,
            interhunk_lines: DEFAULT_INTERHUNK_LINES,
            src_prefix: Prefix::Borrowed(DEFAULT_SRC_PREFIX),
            dst_prefix: Prefix::Borrowed(DEFAULT_DST_PREFIX),
            pathspec: Vec::new(),
        }
    }
}

impl DiffOptions {
    /// Resolve caller options into the form the diff core runs on
    ///
    /// Prefixes are slash-terminated and, under `REVERSE`, swapped exactly
    /// once here.
    pub(crate) fn resolved(opts: Option<&DiffOptions>) -> DiffOptions {
        let mut resolved = opts.cloned().unwrap_or_default();

        resolved.src_prefix = resolved.src_prefix.normalized();
        resolved.dst_prefix = resolved.dst_prefix.normalized();

        if resolved.flags.contains(DiffFlags::REVERSE) {
            std::mem::swap(&mut resolved.src_prefix, &mut resolved.dst_prefix);
        }

        resolved
    }

    /// Context lines with the 0-means-default rule applied
    pub fn effective_context_lines(&self) -> u32 {
        if self.context_lines == 0 {
            DEFAULT_CONTEXT_LINES
        } else {
            self.context_lines
        }
    }

    /// Interhunk lines with the 0-means-default rule applied
    pub fn effective_interhunk_lines(&self) -> u32 {
        if self.interhunk_lines == 0 {
            DEFAULT_INTERHUNK_LINES
        } else {
            self.interhunk_lines
        }
    }
}
