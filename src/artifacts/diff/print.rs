//! Output drivers
//!
//! Two renderers built on the patch engine's traversal: a compact
//! name-status listing and the canonical unified-patch format. Both hand
//! each formatted line to an emission callback along with its origin, and
//! stay byte-compatible with the classic output:
//!
//! ```text
//! diff --git a/hello.txt b/hello.txt
//! index ce01362..81c545e 100644
//! --- a/hello.txt
//! +++ b/hello.txt
//! @@ -1 +1 @@
//! -hello
//! +world
//! ```

use crate::artifacts::diff::delta::Delta;
use crate::artifacts::diff::delta_list::DeltaList;
use crate::artifacts::diff::patch::{DiffRange, LineOrigin};
use crate::artifacts::objects::entry_mode::EntryMode;
use std::cell::RefCell;

const NULL_PATH: &str = "/dev/null";

/// Emission callback of the output drivers
pub type PrintCb<'a> = &'a mut dyn FnMut(LineOrigin, &[u8]) -> anyhow::Result<()>;

/// Path suffix hint used by the compact driver
fn mode_suffix(mode: EntryMode) -> char {
    if mode.is_tree() {
        '/'
    } else if mode.is_executable() {
        '*'
    } else {
        ' '
    }
}

impl<'r> DeltaList<'r> {
    /// Render the list in compact name-status form, one line per delta
    pub fn print_compact(&mut self, print_cb: PrintCb<'_>) -> anyhow::Result<()> {
        let cb = RefCell::new(print_cb);

        let mut file_cb = |delta: &Delta, _progress: f32| -> anyhow::Result<()> {
            let Some(code) = delta.status().code() else {
                return Ok(());
            };

            let old_suffix = mode_suffix(delta.old_mode());
            let new_suffix = mode_suffix(delta.new_mode());

            let line = if let Some(new_path) = delta.renamed_path() {
                format!(
                    "{code}\t{}{old_suffix} -> {new_path}{new_suffix}\n",
                    delta.path()
                )
            } else if delta.old_mode() != delta.new_mode()
                && !delta.old_mode().is_absent()
                && !delta.new_mode().is_absent()
            {
                format!(
                    "{code}\t{}{new_suffix} ({} -> {})\n",
                    delta.path(),
                    delta.old_mode().as_str(),
                    delta.new_mode().as_str()
                )
            } else if old_suffix != ' ' {
                format!("{code}\t{}{old_suffix}\n", delta.path())
            } else {
                format!("{code}\t{}\n", delta.path())
            };

            (&mut *cb.borrow_mut())(LineOrigin::FileHeader, line.as_bytes())
        };

        self.foreach(Some(&mut file_cb), None, None)
    }

    /// Render the list as a unified patch
    pub fn print_patch(&mut self, print_cb: PrintCb<'_>) -> anyhow::Result<()> {
        let src_prefix = self.options().src_prefix.as_str().to_string();
        let dst_prefix = self.options().dst_prefix.as_str().to_string();
        let cb = RefCell::new(print_cb);

        let mut file_cb = |delta: &Delta, _progress: f32| -> anyhow::Result<()> {
            let old_path = delta.path();
            let new_path = delta.new_path();

            // a side with no blob prints as /dev/null, with no prefix
            let (old_label_prefix, old_label) = if delta.has_old_blob() {
                (src_prefix.as_str(), old_path)
            } else {
                ("", NULL_PATH)
            };
            let (new_label_prefix, new_label) = if delta.has_new_blob() {
                (dst_prefix.as_str(), new_path)
            } else {
                ("", NULL_PATH)
            };

            let mut header = format!("diff --git {src_prefix}{old_path} {dst_prefix}{new_path}\n");
            header.push_str(&oid_range(delta));

            if delta.binary() != Some(true) {
                header.push_str(&format!("--- {old_label_prefix}{old_label}\n"));
                header.push_str(&format!("+++ {new_label_prefix}{new_label}\n"));
            }

            (&mut *cb.borrow_mut())(LineOrigin::FileHeader, header.as_bytes())?;

            if delta.binary() == Some(true) {
                let line = format!(
                    "Binary files {old_label_prefix}{old_label} and {new_label_prefix}{new_label} differ\n"
                );
                (&mut *cb.borrow_mut())(LineOrigin::Binary, line.as_bytes())?;
            }

            Ok(())
        };

        let mut hunk_cb =
            |_delta: &Delta, _range: &DiffRange, header: &[u8]| -> anyhow::Result<()> {
                (&mut *cb.borrow_mut())(LineOrigin::HunkHeader, header)
            };

        let mut line_cb =
            |_delta: &Delta, origin: LineOrigin, content: &[u8]| -> anyhow::Result<()> {
                let mut line = Vec::with_capacity(content.len() + 1);
                match origin {
                    LineOrigin::Context | LineOrigin::Addition | LineOrigin::Deletion => {
                        line.push(origin.as_char() as u8);
                        line.extend_from_slice(content);
                    }
                    // EOF-newline markers and friends go out verbatim
                    _ => line.extend_from_slice(content),
                }

                (&mut *cb.borrow_mut())(origin, &line)
            };

        self.foreach(Some(&mut file_cb), Some(&mut hunk_cb), Some(&mut line_cb))
    }
}

/// The header lines describing modes and the short-OID range
fn oid_range(delta: &Delta) -> String {
    let old_oid = delta.old_oid().to_short_oid();
    let new_oid = delta.new_oid().to_short_oid();

    if delta.old_mode() == delta.new_mode() {
        return format!("index {old_oid}..{new_oid} {}\n", delta.old_mode().as_str());
    }

    let mut text = String::new();
    if delta.old_mode().is_absent() {
        text.push_str(&format!("new file mode {}\n", delta.new_mode().as_str()));
    } else if delta.new_mode().is_absent() {
        text.push_str(&format!("deleted file mode {}\n", delta.old_mode().as_str()));
    } else {
        text.push_str(&format!("old mode {}\n", delta.old_mode().as_str()));
        text.push_str(&format!("new mode {}\n", delta.new_mode().as_str()));
    }
    text.push_str(&format!("index {old_oid}..{new_oid}\n"));

    text
}
