// files.rs

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Folder used for files without an extension.
pub const NO_EXTENSION: &str = "_no_ext";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: PathBuf,
    pub to: PathBuf,
}

pub struct FileOrganizer {
    base: PathBuf,
}

impl FileOrganizer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Regular files directly under the base grouped by lowercase extension.
    /// Both groups and file names come back sorted.
    pub fn plan(&self) -> io::Result<BTreeMap<String, Vec<String>>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in fs::read_dir(&self.base)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .filter(|e| !e.is_empty())
                .map_or_else(|| NO_EXTENSION.to_string(), str::to_lowercase);
            groups
                .entry(ext)
                .or_default()
                .push(entry.file_name().to_string_lossy().into_owned());
        }
        for names in groups.values_mut() {
            names.sort();
        }
        Ok(groups)
    }

    /// Moves every file into `<base>/<ext>/`. With `simulate` nothing touches
    /// the disk; otherwise a failed move is logged and the rest continue.
    pub fn apply(&self, simulate: bool) -> io::Result<Vec<Move>> {
        let mut moves = Vec::new();
        for (ext, names) in self.plan()? {
            let target = self.base.join(&ext);
            if !simulate {
                fs::create_dir_all(&target)?;
            }
            for name in names {
                let mv = Move {
                    from: self.base.join(&name),
                    to: target.join(&name),
                };
                if !simulate {
                    if let Err(e) = fs::rename(&mv.from, &mv.to) {
                        log::warn!(
                            "failed to move {} -> {}: {}",
                            mv.from.display(),
                            mv.to.display(),
                            e
                        );
                    }
                }
                moves.push(mv);
            }
        }
        Ok(moves)
    }
}
