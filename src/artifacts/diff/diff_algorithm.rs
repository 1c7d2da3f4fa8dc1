//! Textual diff engine
//!
//! Myers' shortest-edit-script algorithm over lines, producing the emission
//! records the patch engine consumes: raw `@@` hunk headers, origin-prefixed
//! lines, and end-of-file newline markers.
//!
//! ## Algorithm
//!
//! 1. Split both buffers into lines (terminators kept)
//! 2. Compute the shortest edit trace and backtrack it into an edit script
//! 3. Group changed lines into hunks, surrounded by `context_lines` of
//!    context; hunks separated by at most `2 * context + interhunk` unchanged
//!    lines merge into one
//! 4. Serialize each hunk as a header record plus one record per line
//!
//! Whitespace flags never alter the emitted bytes; they only relax the
//! comparison, via a normalized key computed per line.

use crate::artifacts::diff::options::{DiffFlags, DiffOptions};
use bytes::Bytes;
use derive_new::new;

/// Origin marker of an unchanged line
pub const ORIGIN_CONTEXT: u8 = b' ';
/// Origin marker of an added line
pub const ORIGIN_ADDITION: u8 = b'+';
/// Origin marker of a deleted line
pub const ORIGIN_DELETION: u8 = b'-';

/// Marker appended after a final line that has no terminating newline
const NO_EOF_NEWLINE_MARKER: &[u8] = b"\n\\ No newline at end of file\n";

/// Configuration handed to a text-diff engine
#[derive(Debug, Clone, new)]
pub struct TextDiffConfig {
    pub context_lines: u32,
    pub interhunk_lines: u32,
    pub flags: DiffFlags,
}

impl TextDiffConfig {
    pub(crate) fn from_options(opts: &DiffOptions) -> Self {
        TextDiffConfig::new(
            opts.effective_context_lines(),
            opts.effective_interhunk_lines(),
            opts.flags,
        )
    }
}

/// One emission of a text-diff engine
///
/// Mirrors the one-, two- and three-buffer records of the underlying
/// protocol: a hunk header alone, an origin marker with line content, or
/// both plus a trailing no-newline marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffRecord {
    /// A raw hunk header line, starting with `@@`
    HunkHeader(Bytes),
    /// An origin marker (` `/`+`/`-`) and the line's content
    Line { origin: u8, content: Bytes },
    /// A final line missing its newline, with the marker to emit after it
    LineAtEof {
        origin: u8,
        content: Bytes,
        marker: Bytes,
    },
}

/// A line-oriented diff algorithm
///
/// Takes two byte buffers and eagerly returns the record stream describing
/// their differences.
pub trait TextDiffEngine {
    fn diff(
        &self,
        old: &[u8],
        new: &[u8],
        config: &TextDiffConfig,
    ) -> anyhow::Result<Vec<DiffRecord>>;
}

/// The default engine: Myers over lines
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersEngine;

impl TextDiffEngine for MyersEngine {
    fn diff(
        &self,
        old: &[u8],
        new: &[u8],
        config: &TextDiffConfig,
    ) -> anyhow::Result<Vec<DiffRecord>> {
        let a = split_lines(old, config.flags);
        let b = split_lines(new, config.flags);

        if a.is_empty() && b.is_empty() {
            return Ok(Vec::new());
        }

        let edits = MyersDiff::new(a, b).edit_script();

        Ok(emit_records(&edits, config))
    }
}

/// One line of a buffer: raw bytes plus the key it compares under
#[derive(Debug, Clone, PartialEq, Eq)]
struct DiffLine {
    /// 1-based line number within its buffer
    number: usize,
    /// Content including the trailing newline, when the buffer had one
    raw: Bytes,
    /// Normalized comparison key per the whitespace flags
    key: Bytes,
}

/// One step of the edit script
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    Delete { line: DiffLine },
    Insert { line: DiffLine },
    Equal { line_a: DiffLine, line_b: DiffLine },
}

impl Edit {
    fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }

    /// Line number on the old side, None for insertions
    fn old_line(&self) -> Option<usize> {
        match self {
            Edit::Delete { line } => Some(line.number),
            Edit::Equal { line_a, .. } => Some(line_a.number),
            Edit::Insert { .. } => None,
        }
    }

    /// Line number on the new side, None for deletions
    fn new_line(&self) -> Option<usize> {
        match self {
            Edit::Insert { line } => Some(line.number),
            Edit::Equal { line_b, .. } => Some(line_b.number),
            Edit::Delete { .. } => None,
        }
    }
}

fn split_lines(buf: &[u8], flags: DiffFlags) -> Vec<DiffLine> {
    buf.split_inclusive(|&b| b == b'\n')
        .enumerate()
        .map(|(i, line)| DiffLine {
            number: i + 1,
            raw: Bytes::copy_from_slice(line),
            key: normalize_key(line, flags),
        })
        .collect()
}

/// Comparison key of a line under the whitespace flags
///
/// The key keeps newline presence so a lost final newline still registers as
/// a change, except under `IGNORE_WHITESPACE` where the newline is
/// whitespace like any other.
fn normalize_key(raw: &[u8], flags: DiffFlags) -> Bytes {
    if flags.contains(DiffFlags::IGNORE_WHITESPACE) {
        raw.iter()
            .copied()
            .filter(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
            .collect::<Vec<_>>()
            .into()
    } else if flags.contains(DiffFlags::IGNORE_WHITESPACE_CHANGE) {
        let (body, newline) = split_newline(raw);
        let mut key = Vec::with_capacity(body.len() + 1);
        let mut blank_run = false;
        for &b in body {
            if matches!(b, b' ' | b'\t' | b'\r') {
                blank_run = true;
            } else {
                if blank_run {
                    key.push(b' ');
                    blank_run = false;
                }
                key.push(b);
            }
        }
        // a trailing run never flushes, matching end-of-line trimming
        if newline {
            key.push(b'\n');
        }
        key.into()
    } else if flags.contains(DiffFlags::IGNORE_WHITESPACE_EOL) {
        let (body, newline) = split_newline(raw);
        let trimmed = body
            .iter()
            .rposition(|b| !matches!(b, b' ' | b'\t' | b'\r'))
            .map_or(&body[..0], |pos| &body[..=pos]);
        let mut key = trimmed.to_vec();
        if newline {
            key.push(b'\n');
        }
        key.into()
    } else {
        Bytes::copy_from_slice(raw)
    }
}

fn split_newline(raw: &[u8]) -> (&[u8], bool) {
    match raw.strip_suffix(b"\n") {
        Some(body) => (body, true),
        None => (raw, false),
    }
}

/// Myers shortest-edit-script computation
#[derive(Debug, Clone)]
struct MyersDiff {
    a: Vec<DiffLine>,
    b: Vec<DiffLine>,
}

impl MyersDiff {
    fn new(a: Vec<DiffLine>, b: Vec<DiffLine>) -> Self {
        MyersDiff { a, b }
    }

    fn compute_shortest_edit(&self) -> Vec<Vec<isize>> {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let offset = (n + m) as usize;

        let mut v = vec![0; 2 * offset + 1];
        let mut trace = Vec::new();

        for d in 0..=(n + m) {
            trace.push(v.clone());

            for k in (-d..=d).step_by(2) {
                let idx = (offset as isize + k) as usize;

                let mut x = if k == -d {
                    // we could have only come from k+1, thus an insertion
                    v[idx + 1]
                } else if k == d {
                    // we could have only come from k-1, thus a deletion
                    v[idx - 1] + 1
                } else {
                    // we could have come from either side, take the farther
                    let x_del = v[idx - 1] + 1;
                    let x_ins = v[idx + 1];
                    if x_del > x_ins { x_del } else { x_ins }
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize].key == self.b[y as usize].key {
                    // snake
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return trace;
                }
            }
        }

        trace
    }

    fn backtrack(&self) -> Vec<(isize, isize, isize, isize)> {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let offset = (x + y) as usize;
        let mut edit_path = Vec::new();

        let trace = self.compute_shortest_edit();

        for (d, v) in trace.iter().enumerate().rev() {
            let k = x - y;

            let prev_k = if k == -(d as isize) {
                k + 1
            } else if k == (d as isize) {
                k - 1
            } else {
                let k_del = k - 1;
                let k_ins = k + 1;
                if v[(offset as isize + k_del) as usize] + 1 > v[(offset as isize + k_ins) as usize]
                {
                    k_del
                } else {
                    k_ins
                }
            };

            let prev_x = v[(offset as isize + prev_k) as usize];
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edit_path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            if d > 0 {
                edit_path.push((prev_x, prev_y, x, y));
            }

            (x, y) = (prev_x, prev_y);
        }

        edit_path
    }

    fn edit_script(&self) -> Vec<Edit> {
        let mut edits = Vec::new();

        for (prev_x, prev_y, x, y) in self.backtrack() {
            if x == prev_x {
                // only y advanced: insertion
                if prev_y < self.b.len() as isize {
                    edits.push(Edit::Insert {
                        line: self.b[prev_y as usize].clone(),
                    });
                }
            } else if y == prev_y {
                // only x advanced: deletion
                if prev_x < self.a.len() as isize {
                    edits.push(Edit::Delete {
                        line: self.a[prev_x as usize].clone(),
                    });
                }
            } else {
                // diagonal move: both lines present and equal under the key
                if prev_x < self.a.len() as isize {
                    edits.push(Edit::Equal {
                        line_a: self.a[prev_x as usize].clone(),
                        line_b: self.b[prev_y as usize].clone(),
                    });
                }
            }
        }

        edits.reverse();
        edits
    }
}

/// Group the edit script into hunk ranges and serialize them as records
fn emit_records(edits: &[Edit], config: &TextDiffConfig) -> Vec<DiffRecord> {
    let context = config.context_lines as usize;
    let interhunk = config.interhunk_lines as usize;

    let mut records = Vec::new();
    for (from, to) in hunk_ranges(edits, context, interhunk) {
        records.push(hunk_header(edits, from, to));
        for edit in &edits[from..to] {
            records.push(line_record(edit));
        }
    }

    records
}

/// Half-open `[from, to)` ranges of the edit script covered by each hunk
fn hunk_ranges(edits: &[Edit], context: usize, interhunk: usize) -> Vec<(usize, usize)> {
    // maximal runs of changed lines
    let mut blocks: Vec<(usize, usize)> = Vec::new();
    let mut pos = 0;
    while pos < edits.len() {
        if edits[pos].is_equal() {
            pos += 1;
            continue;
        }
        let start = pos;
        while pos < edits.len() && !edits[pos].is_equal() {
            pos += 1;
        }
        blocks.push((start, pos));
    }

    // merge blocks whose context regions would touch or overlap
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for block in blocks {
        match merged.last_mut() {
            Some(last) if block.0 - last.1 <= 2 * context + interhunk => last.1 = block.1,
            _ => merged.push(block),
        }
    }

    merged
        .into_iter()
        .map(|(start, end)| {
            (
                start.saturating_sub(context),
                (end + context).min(edits.len()),
            )
        })
        .collect()
}

fn hunk_header(edits: &[Edit], from: usize, to: usize) -> DiffRecord {
    let slice = &edits[from..to];
    let old_count = slice.iter().filter(|e| e.old_line().is_some()).count();
    let new_count = slice.iter().filter(|e| e.new_line().is_some()).count();

    // a side with no lines anchors at the last line before the hunk
    let old_start = slice.iter().find_map(Edit::old_line).unwrap_or_else(|| {
        edits[..from]
            .iter()
            .rev()
            .find_map(Edit::old_line)
            .unwrap_or(0)
    });
    let new_start = slice.iter().find_map(Edit::new_line).unwrap_or_else(|| {
        edits[..from]
            .iter()
            .rev()
            .find_map(Edit::new_line)
            .unwrap_or(0)
    });

    let mut header = String::from("@@ -");
    header.push_str(&format_range(old_start, old_count));
    header.push_str(" +");
    header.push_str(&format_range(new_start, new_count));
    header.push_str(" @@\n");

    DiffRecord::HunkHeader(Bytes::from(header.into_bytes()))
}

/// Render one side of a hunk header, omitting the count when it is 1
fn format_range(start: usize, count: usize) -> String {
    if count == 1 {
        format!("{start}")
    } else {
        format!("{start},{count}")
    }
}

fn line_record(edit: &Edit) -> DiffRecord {
    let (origin, raw) = match edit {
        Edit::Delete { line } => (ORIGIN_DELETION, &line.raw),
        Edit::Insert { line } => (ORIGIN_ADDITION, &line.raw),
        // context shows the old side's bytes
        Edit::Equal { line_a, .. } => (ORIGIN_CONTEXT, &line_a.raw),
    };

    if raw.last() == Some(&b'\n') {
        DiffRecord::Line {
            origin,
            content: raw.clone(),
        }
    } else {
        // the final line of its buffer, with no terminating newline
        DiffRecord::LineAtEof {
            origin,
            content: raw.clone(),
            marker: Bytes::from_static(NO_EOF_NEWLINE_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> TextDiffConfig {
        TextDiffConfig::new(3, 3, DiffFlags::empty())
    }

    fn line(origin: u8, content: &str) -> DiffRecord {
        DiffRecord::Line {
            origin,
            content: Bytes::copy_from_slice(content.as_bytes()),
        }
    }

    fn header(text: &str) -> DiffRecord {
        DiffRecord::HunkHeader(Bytes::copy_from_slice(text.as_bytes()))
    }

    #[rstest]
    fn test_equal_buffers_emit_nothing(config: TextDiffConfig) {
        let records = MyersEngine.diff(b"a\nb\n", b"a\nb\n", &config).unwrap();

        assert_eq!(records, Vec::new());
    }

    #[rstest]
    fn test_single_line_edit(config: TextDiffConfig) {
        let records = MyersEngine
            .diff(b"a\nb\nc\n", b"a\nx\nc\n", &config)
            .unwrap();

        assert_eq!(
            records,
            vec![
                header("@@ -1,3 +1,3 @@\n"),
                line(ORIGIN_CONTEXT, "a\n"),
                line(ORIGIN_DELETION, "b\n"),
                line(ORIGIN_ADDITION, "x\n"),
                line(ORIGIN_CONTEXT, "c\n"),
            ]
        );
    }

    #[rstest]
    fn test_addition_into_empty_buffer(config: TextDiffConfig) {
        let records = MyersEngine.diff(b"", b"x\ny\n", &config).unwrap();

        assert_eq!(
            records,
            vec![
                header("@@ -0,0 +1,2 @@\n"),
                line(ORIGIN_ADDITION, "x\n"),
                line(ORIGIN_ADDITION, "y\n"),
            ]
        );
    }

    #[rstest]
    fn test_missing_final_newline_gets_marker(config: TextDiffConfig) {
        let records = MyersEngine.diff(b"a\nb", b"a\nc", &config).unwrap();

        assert_eq!(
            records,
            vec![
                header("@@ -1,2 +1,2 @@\n"),
                line(ORIGIN_CONTEXT, "a\n"),
                DiffRecord::LineAtEof {
                    origin: ORIGIN_DELETION,
                    content: Bytes::from_static(b"b"),
                    marker: Bytes::from_static(NO_EOF_NEWLINE_MARKER),
                },
                DiffRecord::LineAtEof {
                    origin: ORIGIN_ADDITION,
                    content: Bytes::from_static(b"c"),
                    marker: Bytes::from_static(NO_EOF_NEWLINE_MARKER),
                },
            ]
        );
    }

    #[rstest]
    fn test_distant_changes_split_into_hunks() {
        let config = TextDiffConfig::new(0, 0, DiffFlags::empty());
        let records = MyersEngine
            .diff(b"a\nb\nc\nd\ne\n", b"a\nB\nc\nD\ne\n", &config)
            .unwrap();

        assert_eq!(
            records,
            vec![
                header("@@ -2 +2 @@\n"),
                line(ORIGIN_DELETION, "b\n"),
                line(ORIGIN_ADDITION, "B\n"),
                header("@@ -4 +4 @@\n"),
                line(ORIGIN_DELETION, "d\n"),
                line(ORIGIN_ADDITION, "D\n"),
            ]
        );
    }

    #[rstest]
    fn test_interhunk_context_merges_hunks() {
        let config = TextDiffConfig::new(0, 1, DiffFlags::empty());
        let records = MyersEngine
            .diff(b"a\nb\nc\nd\ne\n", b"a\nB\nc\nD\ne\n", &config)
            .unwrap();

        assert_eq!(
            records,
            vec![
                header("@@ -2,3 +2,3 @@\n"),
                line(ORIGIN_DELETION, "b\n"),
                line(ORIGIN_ADDITION, "B\n"),
                line(ORIGIN_CONTEXT, "c\n"),
                line(ORIGIN_DELETION, "d\n"),
                line(ORIGIN_ADDITION, "D\n"),
            ]
        );
    }

    #[rstest]
    #[case(DiffFlags::IGNORE_WHITESPACE, b"a b\n".as_slice(), b"ab\n".as_slice(), true)]
    #[case(DiffFlags::IGNORE_WHITESPACE, b"a b\n".as_slice(), b"a c\n".as_slice(), false)]
    #[case(DiffFlags::IGNORE_WHITESPACE_CHANGE, b"a  b\n".as_slice(), b"a b\n".as_slice(), true)]
    #[case(DiffFlags::IGNORE_WHITESPACE_CHANGE, b"a b\n".as_slice(), b"ab\n".as_slice(), false)]
    #[case(DiffFlags::IGNORE_WHITESPACE_EOL, b"a b  \n".as_slice(), b"a b\n".as_slice(), true)]
    #[case(DiffFlags::IGNORE_WHITESPACE_EOL, b"a  b\n".as_slice(), b"a b\n".as_slice(), false)]
    fn test_whitespace_flags_relax_comparison(
        #[case] flags: DiffFlags,
        #[case] old: &[u8],
        #[case] new: &[u8],
        #[case] equal: bool,
    ) {
        let config = TextDiffConfig::new(3, 3, flags);
        let records = MyersEngine.diff(old, new, &config).unwrap();

        assert_eq!(records.is_empty(), equal);
    }

    #[rstest]
    fn test_emitted_bytes_are_raw_despite_whitespace_flags() {
        let config = TextDiffConfig::new(3, 3, DiffFlags::IGNORE_WHITESPACE_CHANGE);
        let records = MyersEngine
            .diff(b"a  b\ngone\n", b"a b\n", &config)
            .unwrap();

        // the context line shows the old side's untouched bytes
        assert_eq!(
            records,
            vec![
                header("@@ -1,2 +1 @@\n"),
                line(ORIGIN_CONTEXT, "a  b\n"),
                line(ORIGIN_DELETION, "gone\n"),
            ]
        );
    }
}
