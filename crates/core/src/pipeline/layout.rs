use std::path::{Path, PathBuf};

use crate::model::OperatorName;

/// Where a conversion writes its two files.
///
/// Computing the layout does not touch the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Destination directory (created on write if absent).
    pub dir: PathBuf,
    /// `<dir>/<op>.py`: the kernel module, copied verbatim.
    pub kernel_path: PathBuf,
    /// `<dir>/<op>_test.py`: the merged pytest module.
    pub test_path: PathBuf,
}

impl OutputLayout {
    pub fn new(dir: impl AsRef<Path>, op: &OperatorName) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let kernel_path = dir.join(format!("{op}.py"));
        let test_path = dir.join(format!("{op}_test.py"));
        Self { dir, kernel_path, test_path }
    }
}
