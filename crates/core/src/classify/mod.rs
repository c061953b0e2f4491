//! Input classification: decide which of the four input files is the kernel,
//! the baseline, the accuracy test and the performance test.
//!
//! Classification is an ordered list of content rules (first match wins),
//! followed by a positional fallback for two test files that carry no
//! distinguishing signal. Files are always visited in lexicographic file-name
//! order so the outcome never depends on directory listing order.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{Role, RoleMap};

/// Number of input files a conversion expects.
pub const EXPECTED_FILE_COUNT: usize = 4;

const KERNEL_MARKER: &str = "triton.jit";
const TENSOR_TYPE: &str = "torch.Tensor";
const LABEL_MARKER: &str = "@label";
const PARAMETRIZE_MARKER: &str = "@parametrize";

/// Error type for input classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Failed to read input directory {}", dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read input file {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Expected {expected} input files in {}, found {found}", dir.display())]
    FileCount { dir: PathBuf, expected: usize, found: usize },

    #[error("Could not identify {} in {}", format_roles(missing), dir.display())]
    MissingRoles { dir: PathBuf, missing: Vec<Role> },
}

fn format_roles(roles: &[Role]) -> String {
    roles.iter().map(|r| r.noun()).collect::<Vec<_>>().join(", ")
}

/// One candidate input file, loaded for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let file_name =
            path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        Self { path, file_name, content: content.into() }
    }

    fn has_test_markers(&self) -> bool {
        self.content.contains(LABEL_MARKER) || self.content.contains(PARAMETRIZE_MARKER)
    }
}

/// A named predicate that may claim a file for a role.
struct Rule {
    name: &'static str,
    decide: fn(&SourceFile) -> Option<Role>,
}

/// Content rules in priority order.
const RULES: &[Rule] = &[
    Rule { name: "kernel-marker", decide: kernel_rule },
    Rule { name: "baseline-shape", decide: baseline_rule },
    Rule { name: "test-markers", decide: test_rule },
];

fn kernel_rule(file: &SourceFile) -> Option<Role> {
    file.content.contains(KERNEL_MARKER).then_some(Role::Kernel)
}

fn baseline_rule(file: &SourceFile) -> Option<Role> {
    let looks_like_baseline = file.content.contains("def ")
        && file.content.contains(TENSOR_TYPE)
        && !file.has_test_markers();
    looks_like_baseline.then_some(Role::Baseline)
}

fn test_rule(file: &SourceFile) -> Option<Role> {
    if !file.has_test_markers() {
        return None;
    }

    let name = file.file_name.to_lowercase();
    if name.contains("accuracy") {
        return Some(Role::AccuracyTest);
    }
    if name.contains("performance") || name.contains("benchmark") {
        return Some(Role::PerformanceTest);
    }

    if file.content.contains("def test_") && !file.content.contains("benchmark") {
        Some(Role::AccuracyTest)
    } else {
        Some(Role::PerformanceTest)
    }
}

/// Load every regular file in `dir` whose extension equals `extension`, in
/// directory listing order.
pub fn scan_dir(dir: &Path, extension: &str) -> Result<Vec<SourceFile>, ClassifyError> {
    let read_dir_err = |source| ClassifyError::ReadDir { dir: dir.to_path_buf(), source };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let content = fs::read_to_string(&path)
            .map_err(|source| ClassifyError::ReadFile { path: path.clone(), source })?;
        files.push(SourceFile::new(path, content));
    }

    debug!(dir = %dir.display(), count = files.len(), "scanned input directory");
    Ok(files)
}

/// Assign a role to each of `files`.
///
/// `dir` is only used for error messages. A role claimed by two files keeps
/// its first claimant; the second stays unassigned and may be picked up by the
/// positional fallback.
pub fn classify_files(dir: &Path, files: &[SourceFile]) -> Result<RoleMap, ClassifyError> {
    if files.len() != EXPECTED_FILE_COUNT {
        return Err(ClassifyError::FileCount {
            dir: dir.to_path_buf(),
            expected: EXPECTED_FILE_COUNT,
            found: files.len(),
        });
    }

    let mut ordered: Vec<&SourceFile> = files.iter().collect();
    ordered.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let mut map = RoleMap::default();
    let mut unassigned: Vec<&SourceFile> = Vec::new();

    for file in ordered {
        let claim = RULES.iter().find_map(|rule| (rule.decide)(file).map(|role| (rule.name, role)));
        match claim {
            Some((rule, role)) if map.files.contains_key(&role) => {
                warn!(
                    file = %file.file_name,
                    role = role.as_str(),
                    rule,
                    "role already claimed by another file; leaving unassigned"
                );
                unassigned.push(file);
            }
            Some((rule, role)) => {
                debug!(file = %file.file_name, role = role.as_str(), rule, "classified input");
                map.files.insert(role, file.path.clone());
            }
            None => {
                debug!(file = %file.file_name, "no rule matched");
                unassigned.push(file);
            }
        }
    }

    let tests_unclaimed = !map.files.contains_key(&Role::AccuracyTest)
        && !map.files.contains_key(&Role::PerformanceTest);
    if tests_unclaimed && unassigned.len() == 2 {
        warn!(
            accuracy = %unassigned[0].file_name,
            performance = %unassigned[1].file_name,
            "no content signal for test files; assigning by file-name order"
        );
        map.files.insert(Role::AccuracyTest, unassigned[0].path.clone());
        map.files.insert(Role::PerformanceTest, unassigned[1].path.clone());
        map.positional_guess = true;
    }

    let missing = map.missing();
    if !missing.is_empty() {
        return Err(ClassifyError::MissingRoles { dir: dir.to_path_buf(), missing });
    }

    info!(dir = %dir.display(), positional_guess = map.positional_guess, "classified inputs");
    Ok(map)
}

/// Scan `dir` and classify the files found there.
pub fn classify_dir(dir: &Path, extension: &str) -> Result<RoleMap, ClassifyError> {
    let files = scan_dir(dir, extension)?;
    classify_files(dir, &files)
}
