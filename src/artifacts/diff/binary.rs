//! Binary-vs-text policy
//!
//! Decides, per delta, whether content should go through the line-oriented
//! text engine at all. The `diff` attribute rules: explicitly set means
//! text, explicitly unset means binary. A string value names a diff driver,
//! which is recognized but unused, and falls back to text like the
//! unspecified case.

use crate::areas::attributes::{AttrState, Attributes};
use crate::artifacts::diff::delta::Delta;
use crate::artifacts::diff::options::DiffFlags;

const DIFF_ATTRIBUTE: &str = "diff";

/// Resolve a delta's binary flag
pub(crate) fn resolve_binary(delta: &mut Delta, attributes: &Attributes, flags: DiffFlags) {
    if flags.contains(DiffFlags::FORCE_TEXT) {
        delta.binary = Some(false);
        return;
    }

    let binary = match attributes.get(delta.path(), DIFF_ATTRIBUTE) {
        AttrState::Set => false,
        AttrState::Unset => true,
        // TODO: scan the first chunk for NUL bytes when nothing is specified
        AttrState::Value(_) | AttrState::Unspecified => false,
    };

    delta.binary = Some(binary);
}
