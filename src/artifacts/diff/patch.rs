//! Patch engine
//!
//! Drives the text engine over a delta list. For each delta the engine loads
//! the blob content behind each side (only when a hunk or line callback is
//! present), resolves the binary policy, reports the file, and, for
//! non-binary deltas with content, relays the text engine's record stream
//! to the hunk and line callbacks.
//!
//! Blob buffers stay local to one iteration; a delta never holds content.
//!
//! ## Cancellation
//!
//! Any callback returning an error aborts the traversal with
//! [`DiffError::Aborted`]. A malformed hunk header from the engine only
//! abandons the current delta's stream; the rest of the list still runs.

use crate::areas::repository::Repository;
use crate::artifacts::diff::DiffError;
use crate::artifacts::diff::binary::resolve_binary;
use crate::artifacts::diff::delta::{Delta, DeltaStatus};
use crate::artifacts::diff::delta_list::DeltaList;
use crate::artifacts::diff::diff_algorithm::{
    DiffRecord, MyersEngine, ORIGIN_ADDITION, ORIGIN_DELETION, TextDiffConfig, TextDiffEngine,
};
use crate::artifacts::diff::options::{DiffFlags, DiffOptions};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use derive_new::new;

/// Origin of a line delivered to callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    Context,
    Addition,
    Deletion,
    /// Marker emitted after the new side's final line gained a newline
    AddEofNl,
    /// Marker emitted after the old side's final line lost its newline
    DelEofNl,
    FileHeader,
    HunkHeader,
    Binary,
}

impl LineOrigin {
    /// The character this origin prefixes patch lines with
    pub fn as_char(&self) -> char {
        match self {
            LineOrigin::Context => ' ',
            LineOrigin::Addition => '+',
            LineOrigin::Deletion => '-',
            LineOrigin::AddEofNl => '>',
            LineOrigin::DelEofNl => '<',
            LineOrigin::FileHeader => 'F',
            LineOrigin::HunkHeader => 'H',
            LineOrigin::Binary => 'B',
        }
    }

    fn from_marker(marker: u8) -> LineOrigin {
        match marker {
            ORIGIN_ADDITION => LineOrigin::Addition,
            ORIGIN_DELETION => LineOrigin::Deletion,
            _ => LineOrigin::Context,
        }
    }
}

/// Extents of one hunk, parsed back out of its header
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct DiffRange {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

/// Per-file callback: delta plus traversal progress in [0, 1)
pub type FileCb<'a> = &'a mut dyn FnMut(&Delta, f32) -> anyhow::Result<()>;
/// Per-hunk callback: delta, parsed extents, raw header bytes
pub type HunkCb<'a> = &'a mut dyn FnMut(&Delta, &DiffRange, &[u8]) -> anyhow::Result<()>;
/// Per-line callback: delta, origin, content bytes
pub type LineCb<'a> = &'a mut dyn FnMut(&Delta, LineOrigin, &[u8]) -> anyhow::Result<()>;

impl<'r> DeltaList<'r> {
    /// Traverse the list, reporting files, hunks and lines
    ///
    /// Blob content is fetched and diffed only when a hunk or line callback
    /// is present. Callback errors abort the traversal; the list itself
    /// stays valid.
    pub fn foreach(
        &mut self,
        file_cb: Option<FileCb<'_>>,
        hunk_cb: Option<HunkCb<'_>>,
        line_cb: Option<LineCb<'_>>,
    ) -> anyhow::Result<()> {
        foreach_with_engine(self, &MyersEngine, file_cb, hunk_cb, line_cb)
    }
}

pub(crate) fn foreach_with_engine(
    list: &mut DeltaList<'_>,
    engine: &dyn TextDiffEngine,
    mut file_cb: Option<FileCb<'_>>,
    mut hunk_cb: Option<HunkCb<'_>>,
    mut line_cb: Option<LineCb<'_>>,
) -> anyhow::Result<()> {
    let repo = list.repo;
    let attributes = repo.attributes()?;
    let config = TextDiffConfig::from_options(&list.opts);
    let want_content = hunk_cb.is_some() || line_cb.is_some();
    let total = list.deltas.len();

    for (index, delta) in list.deltas.iter_mut().enumerate() {
        let (old_data, new_data) = if want_content {
            (load_blob(repo, delta, Side::Old)?, load_blob(repo, delta, Side::New)?)
        } else {
            (None, None)
        };

        resolve_binary(delta, &attributes, list.opts.flags);

        if let Some(cb) = file_cb.as_mut() {
            cb(delta, index as f32 / total as f32)
                .map_err(|err| DiffError::Aborted(err.into()))?;
        }

        // binary content never goes through the line-oriented engine
        if delta.binary == Some(true) {
            continue;
        }

        // nothing to do when neither side had a blob to load
        if old_data.is_none() && new_data.is_none() {
            continue;
        }
        let old_data = old_data.unwrap_or_default();
        let new_data = new_data.unwrap_or_default();

        let records = engine.diff(&old_data, &new_data, &config)?;
        dispatch_contained(delta, &records, &mut hunk_cb, &mut line_cb)?;
    }

    Ok(())
}

enum Side {
    Old,
    New,
}

/// Load the blob content behind one side of a delta
///
/// A zero ID means the content was never hashed (or the side is absent) and
/// loads nothing rather than failing the lookup.
fn load_blob(repo: &Repository, delta: &Delta, side: Side) -> anyhow::Result<Option<Bytes>> {
    let (present, oid) = match side {
        Side::Old => (delta.has_old_blob(), &delta.old_oid),
        Side::New => (delta.has_new_blob(), &delta.new_oid),
    };

    if !present {
        return Ok(None);
    }

    Ok(Some(repo.database().blob(oid)?.content().clone()))
}

/// Dispatch one delta's records, containing malformed-header failures
fn dispatch_contained(
    delta: &Delta,
    records: &[DiffRecord],
    hunk_cb: &mut Option<HunkCb<'_>>,
    line_cb: &mut Option<LineCb<'_>>,
) -> anyhow::Result<()> {
    match dispatch_records(delta, records, hunk_cb, line_cb) {
        Err(err)
            if err
                .downcast_ref::<DiffError>()
                .is_some_and(|e| matches!(e, DiffError::Parse { .. })) =>
        {
            // the rest of this delta's stream is abandoned, the list is fine
            Ok(())
        }
        other => other,
    }
}

fn dispatch_records(
    delta: &Delta,
    records: &[DiffRecord],
    hunk_cb: &mut Option<HunkCb<'_>>,
    line_cb: &mut Option<LineCb<'_>>,
) -> anyhow::Result<()> {
    for record in records {
        match record {
            DiffRecord::HunkHeader(header) => {
                let Some(cb) = hunk_cb.as_mut() else { continue };
                if !header.starts_with(b"@") {
                    continue;
                }
                let range = parse_hunk_header(header)?;
                cb(delta, &range, header).map_err(|err| DiffError::Aborted(err.into()))?;
            }
            DiffRecord::Line { origin, content } => {
                let Some(cb) = line_cb.as_mut() else { continue };
                cb(delta, LineOrigin::from_marker(*origin), content)
                    .map_err(|err| DiffError::Aborted(err.into()))?;
            }
            DiffRecord::LineAtEof {
                origin,
                content,
                marker,
            } => {
                let Some(cb) = line_cb.as_mut() else { continue };
                let base = LineOrigin::from_marker(*origin);
                cb(delta, base, content).map_err(|err| DiffError::Aborted(err.into()))?;

                let eof_origin = if base == LineOrigin::Addition {
                    LineOrigin::AddEofNl
                } else {
                    LineOrigin::DelEofNl
                };
                cb(delta, eof_origin, marker).map_err(|err| DiffError::Aborted(err.into()))?;
            }
        }
    }

    Ok(())
}

/// Parse `@@ -old_start[,old_count] +new_start[,new_count] @@`
///
/// Missing counts default to 1, the value the canonical format omits.
pub(crate) fn parse_hunk_header(header: &[u8]) -> anyhow::Result<DiffRange> {
    let parse_error = || DiffError::Parse {
        header: String::from_utf8_lossy(header).into_owned(),
    };

    let mut scan = header;
    let old_start = read_next_int(&mut scan).ok_or_else(parse_error)?;
    let old_lines = if scan.first() == Some(&b',') {
        read_next_int(&mut scan).ok_or_else(parse_error)?
    } else {
        1
    };
    let new_start = read_next_int(&mut scan).ok_or_else(parse_error)?;
    let new_lines = if scan.first() == Some(&b',') {
        read_next_int(&mut scan).ok_or_else(parse_error)?
    } else {
        1
    };

    Ok(DiffRange::new(old_start, old_lines, new_start, new_lines))
}

/// Scan forward to the next run of digits and parse it
fn read_next_int(scan: &mut &[u8]) -> Option<u32> {
    let mut s = *scan;
    while let [first, rest @ ..] = s {
        if first.is_ascii_digit() {
            break;
        }
        s = rest;
    }

    let mut value: u32 = 0;
    let mut digits = 0;
    while let [first, rest @ ..] = s {
        if !first.is_ascii_digit() {
            break;
        }
        value = value * 10 + u32::from(*first - b'0');
        s = rest;
        digits += 1;
    }

    *scan = s;
    (digits > 0).then_some(value)
}

/// Diff two blobs directly, without a delta list
///
/// Builds a synthetic delta (both modes regular-file, no paths) and runs the
/// hunk/line stages on the blob content. `REVERSE` swaps the arguments
/// before anything else happens; there is no file callback and no binary
/// policy. The repository handle anchors the call but contributes nothing
/// until diff drivers exist.
pub fn diff_blobs(
    _repo: &Repository,
    old_blob: Option<&Blob>,
    new_blob: Option<&Blob>,
    opts: Option<&DiffOptions>,
    hunk_cb: HunkCb<'_>,
    line_cb: LineCb<'_>,
) -> anyhow::Result<()> {
    let opts = DiffOptions::resolved(opts);

    let (old_blob, new_blob) = if opts.flags.contains(DiffFlags::REVERSE) {
        (new_blob, old_blob)
    } else {
        (old_blob, new_blob)
    };

    let status = match (old_blob.is_some(), new_blob.is_some()) {
        (true, true) => DeltaStatus::Modified,
        (true, false) => DeltaStatus::Deleted,
        (false, true) => DeltaStatus::Added,
        (false, false) => return Ok(()),
    };

    // a fake delta: a blob alone cannot tell its mode or path
    let delta = Delta {
        status,
        old_mode: EntryMode::File(FileMode::Regular),
        new_mode: EntryMode::File(FileMode::Regular),
        old_oid: match old_blob {
            Some(blob) => blob.object_id()?,
            None => ObjectId::zero(),
        },
        new_oid: match new_blob {
            Some(blob) => blob.object_id()?,
            None => ObjectId::zero(),
        },
        path: String::new(),
        new_path: None,
        binary: Some(false),
        similarity: 0,
    };

    let old_data = old_blob.map(|blob| blob.content().clone()).unwrap_or_default();
    let new_data = new_blob.map(|blob| blob.content().clone()).unwrap_or_default();

    let config = TextDiffConfig::from_options(&opts);
    let records = MyersEngine.diff(&old_data, &new_data, &config)?;

    dispatch_contained(&delta, &records, &mut Some(hunk_cb), &mut Some(line_cb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::diff::delta::TreeChange;
    use crate::artifacts::diff::delta_list::DeltaList;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Engine emitting a header the parser cannot digest
    struct BogusHeaderEngine;

    impl TextDiffEngine for BogusHeaderEngine {
        fn diff(
            &self,
            _old: &[u8],
            _new: &[u8],
            _config: &TextDiffConfig,
        ) -> anyhow::Result<Vec<DiffRecord>> {
            Ok(vec![
                DiffRecord::HunkHeader(Bytes::from_static(b"@@ bogus @@\n")),
                DiffRecord::Line {
                    origin: ORIGIN_ADDITION,
                    content: Bytes::from_static(b"never delivered\n"),
                },
            ])
        }
    }

    fn modified_list<'a>(repo: &'a mut Repository, paths: &[&str]) -> anyhow::Result<DeltaList<'a>> {
        let old_oid = repo.database_mut().store_blob("old\n")?;
        let new_oid = repo.database_mut().store_blob("new\n")?;

        let mut list = DeltaList::new(repo, DiffOptions::resolved(None));
        for path in paths {
            let change = TreeChange::new(
                DeltaStatus::Modified,
                path.to_string(),
                EntryMode::File(FileMode::Regular),
                EntryMode::File(FileMode::Regular),
                old_oid.clone(),
                new_oid.clone(),
            );
            list.push_from_change(&change, path)?;
        }

        Ok(list)
    }

    #[rstest]
    fn test_malformed_header_abandons_only_that_delta_stream() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut repo = Repository::new(dir.path()).unwrap();
        let mut list = modified_list(&mut repo, &["a.txt", "b.txt"]).unwrap();

        let mut files = 0;
        let mut hunks = 0;
        let mut lines = 0;
        foreach_with_engine(
            &mut list,
            &BogusHeaderEngine,
            Some(&mut |_delta: &Delta, _progress: f32| {
                files += 1;
                Ok(())
            }),
            Some(&mut |_delta: &Delta, _range: &DiffRange, _header: &[u8]| {
                hunks += 1;
                Ok(())
            }),
            Some(&mut |_delta: &Delta, _origin: LineOrigin, _content: &[u8]| {
                lines += 1;
                Ok(())
            }),
        )
        .unwrap();

        // every delta is still visited, no hunk or line ever lands
        assert_eq!(files, 2);
        assert_eq!(hunks, 0);
        assert_eq!(lines, 0);
    }

    #[rstest]
    fn test_line_callback_error_aborts_with_aborted() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut repo = Repository::new(dir.path()).unwrap();
        let mut list = modified_list(&mut repo, &["a.txt"]).unwrap();

        let error = foreach_with_engine(
            &mut list,
            &MyersEngine,
            None,
            None,
            Some(&mut |_delta: &Delta, _origin: LineOrigin, _content: &[u8]| {
                anyhow::bail!("enough")
            }),
        )
        .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<DiffError>(),
            Some(DiffError::Aborted(_))
        ));
    }

    #[rstest]
    #[case(b"@@ -1,3 +1,4 @@\n".as_slice(), DiffRange::new(1, 3, 1, 4))]
    #[case(b"@@ -5 +5 @@\n".as_slice(), DiffRange::new(5, 1, 5, 1))]
    #[case(b"@@ -0,0 +1,2 @@\n".as_slice(), DiffRange::new(0, 0, 1, 2))]
    #[case(b"@@ -12,30 +14 @@ fn main\n".as_slice(), DiffRange::new(12, 30, 14, 1))]
    fn test_parse_hunk_header(#[case] header: &[u8], #[case] expected: DiffRange) {
        assert_eq!(parse_hunk_header(header).unwrap(), expected);
    }

    #[rstest]
    fn test_parse_hunk_header_without_numbers_fails() {
        let error = parse_hunk_header(b"@@ nonsense @@\n").unwrap_err();

        assert!(matches!(
            error.downcast_ref::<DiffError>(),
            Some(DiffError::Parse { .. })
        ));
    }

    #[rstest]
    fn test_read_next_int_walks_the_scan_forward() {
        let mut scan = b"@@ -12,3".as_slice();

        assert_eq!(read_next_int(&mut scan), Some(12));
        assert_eq!(scan, b",3");
        assert_eq!(read_next_int(&mut scan), Some(3));
        assert_eq!(read_next_int(&mut scan), None);
    }
}
