//! Canonical entry modes
//!
//! Modes are normalized to the small set git actually stores: regular files
//! (0644/0755 by executable bit), symlinks, directories and gitlinks.
//! `Absent` doubles as the "untrackable" mode for filesystem entries that
//! cannot be represented (fifos, sockets, devices) and as the missing side
//! of a delta.

/// Permission variants of a regular file
#[derive(Debug, Clone, Copy, Eq, Default, PartialEq)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

/// Canonical mode of a tree, index or workdir entry
#[derive(Debug, Clone, Copy, Eq, Default, PartialEq)]
pub enum EntryMode {
    /// No entry on this side, or an untrackable file type
    #[default]
    Absent,
    File(FileMode),
    Symlink,
    Directory,
    Gitlink,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::Absent => "0",
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "40000",
            EntryMode::Gitlink => "160000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Absent => 0,
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o40000,
            EntryMode::Gitlink => 0o160000,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EntryMode::Absent)
    }

    pub fn is_file(&self) -> bool {
        matches!(self, EntryMode::File(_))
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, EntryMode::File(FileMode::Executable))
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryMode::Symlink)
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    pub fn is_gitlink(&self) -> bool {
        matches!(self, EntryMode::Gitlink)
    }

    /// Compare only the file-type bits, permissions masked out
    ///
    /// A 0644 and a 0755 file share a type; a symlink and a regular file do
    /// not.
    pub fn same_type(&self, other: &EntryMode) -> bool {
        match (self, other) {
            (EntryMode::File(_), EntryMode::File(_)) => true,
            (a, b) => a == b,
        }
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0 => Ok(EntryMode::Absent),
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o120000 => Ok(EntryMode::Symlink),
            0o40000 => Ok(EntryMode::Directory),
            0o160000 => Ok(EntryMode::Gitlink),
            _ => Err(anyhow::anyhow!("Invalid entry mode {:o}", mode)),
        }
    }
}

impl TryFrom<&str> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "100644" => Ok(EntryMode::File(FileMode::Regular)),
            "100755" => Ok(EntryMode::File(FileMode::Executable)),
            "120000" => Ok(EntryMode::Symlink),
            "40000" => Ok(EntryMode::Directory),
            "160000" => Ok(EntryMode::Gitlink),
            _ => Err(anyhow::anyhow!("Invalid entry mode {}", value)),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}
