use bstr::ByteSlice;
use std::env;
use std::path::{Path, PathBuf};

pub use testfiles_macros::test_files;

#[path = "rt.rs"]
pub mod __rt;

macro_rules! impl_conversions {
    ($T:ty) => {
        impl<P: Into<PathBuf>> From<P> for $T {
            fn from(path: P) -> Self {
                Self { path: path.into() }
            }
        }

        impl AsRef<Path> for $T {
            fn as_ref(&self) -> &Path {
                &self.path
            }
        }
    };
}

/// A test input that must exist.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
}

impl_conversions!(InputFile);

impl InputFile {
    pub fn read_bytes(&self) -> Vec<u8> {
        std::fs::read(self)
            .unwrap_or_else(|e| panic!("Error reading {}: {}", self.path.display(), e))
    }

    /// Reads the file as text, replacing invalid UTF-8 with U+FFFD.
    pub fn read_string(&self) -> String {
        self.read_bytes().to_str_lossy().into_owned()
    }

    /// Path relative to the crate root, `/`-separated, as shown in
    /// diagnostics.
    pub fn display_name(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

/// A snapshot file compared against the actual output of a test.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
}

impl_conversions!(OutputFile);

impl OutputFile {
    pub fn compare_with_mode<T: Snapshot>(&self, actual: &T, mode: SnapshotMode) {
        match self.read_bytes_opt() {
            Some(expected) => {
                if actual.compare_with(&expected) {
                    return;
                }
                if mode == SnapshotMode::All {
                    self.write(actual);
                } else {
                    actual.on_diff(&expected);
                }
            }
            None => {
                if mode >= SnapshotMode::New {
                    self.write(actual);
                } else {
                    panic!(
                        "Snapshot {} not found\n\nUse UPDATE_SNAPSHOTS=true to generate the snapshot",
                        self.path.display()
                    );
                }
            }
        }
    }

    pub fn compare<T: Snapshot>(&self, actual: &T) {
        self.compare_with_mode(actual, SnapshotMode::current());
    }

    /// Like `compare`, but `None` means the snapshot must not exist.
    pub fn compare_opt_with_mode<T: Snapshot>(&self, actual: &Option<T>, mode: SnapshotMode) {
        if let Some(actual) = actual {
            return self.compare_with_mode(actual, mode);
        }
        if self.read_bytes_opt().is_none() {
            return;
        }
        if mode == SnapshotMode::All {
            std::fs::remove_file(&self.path)
                .unwrap_or_else(|e| panic!("Error removing {}: {}", self.path.display(), e));
        } else {
            panic!(
                "Snapshot {} should not exist\n\nUse UPDATE_SNAPSHOTS=true to remove the unnecessary snapshot",
                self.path.display()
            );
        }
    }

    pub fn compare_opt<T: Snapshot>(&self, actual: &Option<T>) {
        self.compare_opt_with_mode(actual, SnapshotMode::current());
    }

    fn write<T: Snapshot>(&self, actual: &T) {
        std::fs::write(self, actual.to_snapshot())
            .unwrap_or_else(|e| panic!("Error writing {}: {}", self.path.display(), e));
    }

    fn read_bytes_opt(&self) -> Option<Vec<u8>> {
        match std::fs::read(self) {
            Ok(expected) => Some(expected),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => panic!("Error reading {}: {}", self.path.display(), e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapshotMode {
    /// Never touch snapshots; a missing one is a failure.
    None,
    /// Write missing snapshots only.
    New,
    /// Rewrite every snapshot that differs.
    All,
}

impl SnapshotMode {
    pub fn current() -> SnapshotMode {
        let update_snapshots = env::var("UPDATE_SNAPSHOTS").unwrap_or_default();
        let ci = env::var("CI").unwrap_or_default();
        match &update_snapshots[..] {
            "all" | "true" | "1" => return SnapshotMode::All,
            "new" => return SnapshotMode::New,
            "none" | "false" | "0" => return SnapshotMode::None,
            _ => {}
        }
        if ci == "true" || ci == "1" {
            return SnapshotMode::None;
        }
        SnapshotMode::New
    }
}

pub trait Snapshot {
    fn to_snapshot(&self) -> Vec<u8>;
    fn compare_with(&self, snapshot: &[u8]) -> bool;
    fn on_diff(&self, snapshot: &[u8]) -> !;
}

impl Snapshot for String {
    fn to_snapshot(&self) -> Vec<u8> {
        self.as_bytes().to_owned()
    }
    fn compare_with(&self, snapshot: &[u8]) -> bool {
        self.as_bytes() == snapshot
    }
    fn on_diff(&self, snapshot: &[u8]) -> ! {
        assert_eq!(self, snapshot.as_bstr());
        unreachable!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> OutputFile {
        let dir = env::temp_dir().join(format!("testfiles-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        OutputFile::from(dir.join(name))
    }

    #[test]
    fn test_new_mode_writes_missing_snapshot() {
        let output = scratch("new.txt");
        let _ = std::fs::remove_file(&output);
        output.compare_with_mode(&String::from("hello\n"), SnapshotMode::New);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "hello\n");
        output.compare_with_mode(&String::from("hello\n"), SnapshotMode::None);
    }

    #[test]
    #[should_panic = "not found"]
    fn test_none_mode_requires_snapshot() {
        let output = scratch("missing.txt");
        let _ = std::fs::remove_file(&output);
        output.compare_with_mode(&String::from("x"), SnapshotMode::None);
    }

    #[test]
    fn test_all_mode_removes_stale_snapshot() {
        let output = scratch("stale.txt");
        std::fs::write(&output, "stale").unwrap();
        output.compare_opt_with_mode::<String>(&None, SnapshotMode::All);
        assert!(!output.path.exists());
        output.compare_opt_with_mode::<String>(&None, SnapshotMode::None);
    }
}
