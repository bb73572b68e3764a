use std::io;
use std::path::Path;

/// One immediate child of the task directory, for operator display only.
/// The upload phase does its own walk and never trusts this listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File { size: u64 },
    Dir,
    Other,
}

/// Enumerate immediate children with byte sizes, sorted by name so repeated
/// listings render identically. Recomputed on every call; the runner may
/// still be cleaning up the directory.
pub fn list_dir(path: &Path) -> io::Result<Vec<DirEntryInfo>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        let kind = if meta.is_file() {
            EntryKind::File { size: meta.len() }
        } else if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        };
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().to_string(),
            kind,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reports_sizes_for_mixed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.txt"), b"").unwrap();
        std::fs::write(dir.path().join("log.txt"), b"twelve bytes").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let listing = list_dir(dir.path()).unwrap();
        assert_eq!(
            listing,
            vec![
                DirEntryInfo {
                    name: "empty.txt".into(),
                    kind: EntryKind::File { size: 0 },
                },
                DirEntryInfo {
                    name: "log.txt".into(),
                    kind: EntryKind::File { size: 12 },
                },
                DirEntryInfo {
                    name: "sub".into(),
                    kind: EntryKind::Dir,
                },
            ]
        );
    }

    #[test]
    fn missing_dir_is_not_found() {
        let err = list_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
